//! Deterministic prompt assembly for the command-generation request.

/// Everything the prompt embeds besides the user query itself. Built once per
/// invocation from the environment snapshot, config rules, and context docs.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub system_line: String,
    pub tools_line: String,
    pub aliases: String,
    pub cwd: String,
    pub global_context: Option<String>,
    pub local_context: Option<String>,
    pub rules: Vec<String>,
}

/// Builds the full instruction string. Plain interpolation only; the prompt
/// is natural language, not a machine-parsed format. The optional correction
/// clause is appended among the critical rules.
pub fn build_prompt(ctx: &PromptContext, query: &str, correction: Option<&str>) -> String {
    let global = ctx
        .global_context
        .as_deref()
        .map(|text| format!("\nGlobal User Context:\n{text}"))
        .unwrap_or_default();
    let local = ctx
        .local_context
        .as_deref()
        .map(|text| format!("\nLocal Project Context:\n{text}"))
        .unwrap_or_default();
    let rules = ctx.rules.join("\n- ");
    let correction = correction
        .map(|clause| format!("\n- {clause}"))
        .unwrap_or_default();

    format!(
        "Convert this user request into a shell command.\n\
         Rules:\n\
         1. Output ONLY the command. No markdown. No backticks. No comments.\n\
         2. Target: macOS / fish shell.\n\
         3. System Info: {system}\n\
         4. Tools Status: {tools}\n\
         5. Valid User Aliases:\n\
         {aliases}\n\
         6. Context: {cwd}{global}{local}\n\
         7. CRITICAL RULES:\n\
         - DO NOT use tools listed in \"Missing\".\n\
         - IF a requested tool is missing, substitute it with an available alternative (e.g. use 'ls' if 'exa' is missing).\n\
         - CONSIDER using a user's alias if one matches the intent.\n\
         - {rules}{correction}\n\
         \n\
         User typed: {query}\n\
         \n\
         Note: If the user input is ALREADY a valid command, return it as is.",
        system = ctx.system_line,
        tools = ctx.tools_line,
        aliases = ctx.aliases,
        cwd = ctx.cwd,
    )
}
