//! The command-generation pipeline: prompt → backend → sanitize, with a
//! single validation retry against the missing-tools set.

use crate::backend::CommandBackend;
use crate::prompt::{build_prompt, PromptContext};
use crate::sanitize::clean_command;
use anyhow::Result;
use tracing::{info, warn};

// Two states only. The Initial → Retried transition happens at most once,
// which bounds the pipeline to two backend calls per query.
enum Attempt {
    Initial,
    Retried,
}

/// Strips exactly one leading `!` marker from the raw query text.
pub fn normalize_query(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_prefix('!').unwrap_or(trimmed);
    stripped.trim().to_string()
}

/// Runs the full pipeline for one query and returns the final command line.
///
/// If the sanitized command leads with a tool from the missing set, the
/// prompt is rebuilt with a correction clause and dispatched exactly once
/// more. The retry result is adopted whether or not it validates; a failed
/// retry dispatch keeps the pre-retry command. Only the initial dispatch
/// failing is an error.
pub async fn generate_command(
    backend: &dyn CommandBackend,
    ctx: &PromptContext,
    query: &str,
    missing: &[String],
) -> Result<String> {
    let prompt = build_prompt(ctx, query, None);
    let raw = backend.generate(&prompt).await?;
    let mut command = clean_command(&raw);
    let mut state = Attempt::Initial;

    loop {
        match state {
            Attempt::Initial => {
                let Some(tool) = missing_first_token(&command, missing) else {
                    break;
                };
                state = Attempt::Retried;
                info!("Suggested command leads with missing tool '{tool}', retrying once");

                let correction = format!(
                    "CRITICAL ERROR: The tool '{tool}' is NOT installed on this system. \
                     You MUST use a standard alternative like 'ls', 'cd', 'find', or 'grep'. \
                     Do NOT suggest '{tool}'."
                );
                let retry_prompt = build_prompt(ctx, query, Some(&correction));
                match backend.generate(&retry_prompt).await {
                    Ok(raw) => command = clean_command(&raw),
                    Err(err) => {
                        warn!("Retry dispatch failed, keeping previous suggestion: {err:#}");
                    }
                }
            }
            // Best effort: the retried result stands even if it still names
            // a missing tool.
            Attempt::Retried => break,
        }
    }

    Ok(command)
}

fn missing_first_token<'a>(command: &'a str, missing: &[String]) -> Option<&'a str> {
    let first = command.split_whitespace().next()?;
    missing.iter().any(|m| m == first).then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Backend returning scripted replies in order, recording each prompt.
    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<String, String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<String, String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        fn prompt(&self, index: usize) -> String {
            self.prompts.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl CommandBackend for ScriptedBackend {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(message)) => Err(anyhow!(message)),
                None => Err(anyhow!("no scripted reply left")),
            }
        }
    }

    fn test_context() -> PromptContext {
        PromptContext {
            system_line: "OS: Linux, Distro: Debian, Shell: /usr/bin/fish, IsRoot: false, Tools: Installed[ls, git] Missing[exa]".to_string(),
            tools_line: "Installed[ls, git] Missing[exa]".to_string(),
            aliases: String::new(),
            cwd: "/tmp".to_string(),
            global_context: None,
            local_context: None,
            rules: vec!["Prefer modern tools.".to_string()],
        }
    }

    fn missing() -> Vec<String> {
        vec!["exa".to_string(), "bat".to_string()]
    }

    #[tokio::test]
    async fn missing_tool_triggers_one_corrected_retry() {
        let backend = ScriptedBackend::new(vec![
            Ok("```fish\nexa -la\n```".to_string()),
            Ok("ls -la".to_string()),
        ]);

        let command = generate_command(&backend, &test_context(), "list files", &missing())
            .await
            .unwrap();

        assert_eq!(command, "ls -la");
        assert_eq!(backend.calls(), 2);
        let retry_prompt = backend.prompt(1);
        assert!(retry_prompt.contains("The tool 'exa' is NOT installed"));
        assert!(retry_prompt.contains("Do NOT suggest 'exa'."));
        assert!(!backend.prompt(0).contains("CRITICAL ERROR"));
    }

    #[tokio::test]
    async fn installed_tool_needs_no_retry() {
        let backend = ScriptedBackend::new(vec![Ok("ls -la".to_string())]);

        let command = generate_command(&backend, &test_context(), "list files", &missing())
            .await
            .unwrap();

        assert_eq!(command, "ls -la");
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn retry_fires_at_most_once_even_if_still_invalid() {
        let backend = ScriptedBackend::new(vec![
            Ok("exa -la".to_string()),
            Ok("bat README.md".to_string()),
        ]);

        let command = generate_command(&backend, &test_context(), "show readme", &missing())
            .await
            .unwrap();

        // 'bat' is also missing but the result is accepted as best effort.
        assert_eq!(command, "bat README.md");
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn failed_retry_keeps_the_pre_retry_command() {
        let backend = ScriptedBackend::new(vec![
            Ok("exa -la".to_string()),
            Err("connection refused".to_string()),
        ]);

        let command = generate_command(&backend, &test_context(), "list files", &missing())
            .await
            .unwrap();

        assert_eq!(command, "exa -la");
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn initial_dispatch_failure_propagates() {
        let backend = ScriptedBackend::new(vec![Err("Gemini API error (500): boom".to_string())]);

        let err = generate_command(&backend, &test_context(), "list files", &missing())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("500"));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn missing_tool_in_non_leading_position_does_not_retry() {
        let backend = ScriptedBackend::new(vec![Ok("ls -la; exa".to_string())]);

        let command = generate_command(&backend, &test_context(), "list files", &missing())
            .await
            .unwrap();

        assert_eq!(command, "ls -la; exa");
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn empty_reply_is_returned_without_retry() {
        let backend = ScriptedBackend::new(vec![Ok("```\n```".to_string())]);

        let command = generate_command(&backend, &test_context(), "list files", &missing())
            .await
            .unwrap();

        assert_eq!(command, "");
        assert_eq!(backend.calls(), 1);
    }

    #[test]
    fn normalize_query_strips_exactly_one_marker() {
        assert_eq!(normalize_query("!list files"), "list files");
        assert_eq!(normalize_query("!!do it"), "!do it");
        assert_eq!(normalize_query("list files"), "list files");
        assert_eq!(normalize_query("  ! spaced  "), "spaced");
        assert_eq!(normalize_query("!"), "");
    }
}
