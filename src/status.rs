//! ANSI status report printed when no query is given.

use crate::config::Config;
use crate::environment::EnvSnapshot;

const RESET: &str = "\x1b[0m";
const HEADER: &str = "\x1b[1;35m";
const CYAN: &str = "\x1b[1;36m";
const YELLOW: &str = "\x1b[33m";
const DIM: &str = "\x1b[38;5;238m";
const ITALIC: &str = "\x1b[3m";

/// Masks a credential for display: first and last four characters, or
/// "Not Set" when too short to have been a real key. Counted in characters
/// so a key containing multi-byte text cannot split a boundary.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "Not Set".to_string()
    }
}

/// Renders the full status report as one string.
pub fn status_report(
    config: &Config,
    snapshot: &EnvSnapshot,
    global_context: bool,
    local_context: bool,
) -> String {
    let heavy = format!("{DIM}{}{RESET}", "━".repeat(60));
    let light = format!("{DIM}{}{RESET}", "─".repeat(60));
    let mut out = String::new();

    out.push_str(&format!("\n{HEADER} 🌌 NLSH | NEURAL LINK STATUS {RESET}\n"));
    out.push_str(&heavy);
    out.push('\n');
    out.push_str(&format!(" 📡 Engine:         {CYAN}{}{RESET}\n", config.engine));
    out.push_str(&format!(
        " 🧠 Remote Model:   {YELLOW}{}{RESET}\n",
        config.gemini.model
    ));
    out.push_str(&format!(
        " 🔑 API Key:        {}\n",
        mask_key(&config.gemini.api_key)
    ));
    out.push_str(&format!(
        " 🦙 Local Model:    {YELLOW}{}{RESET}\n",
        config.ollama.model
    ));
    out.push_str(&format!(" 🔗 Local Host:     {}\n", config.ollama.host));
    out.push_str(&light);
    out.push('\n');
    out.push_str(&format!(" 💻 System:         {}\n", snapshot.system_line()));
    out.push_str(&format!(
        " 🌐 Global Context: {}\n",
        presence(global_context)
    ));
    out.push_str(&format!(" 📂 Local Context:  {}\n", presence(local_context)));
    out.push_str(&heavy);
    out.push('\n');
    out.push_str(&format!(" {ITALIC}\"Ready to interface.\"{RESET}\n"));
    out
}

fn presence(found: bool) -> &'static str {
    if found {
        "✅ Yes"
    } else {
        "❌ No"
    }
}
