//! nlsh - natural language to shell command translation.
//!
//! Turns a request typed at the prompt into a single executable command line
//! using an LLM backend. The tool only prints the command; it never runs it.
//!
//! # Architecture
//!
//! - [`config`] - Persisted JSON configuration with env overrides
//! - [`environment`] - OS/distro/shell/tool-availability probing
//! - [`context`] - Optional global and local context documents
//! - [`prompt`] - Deterministic instruction assembly
//! - [`backend`] - Gemini and Ollama adapters with credential fallback
//! - [`sanitize`] - Markdown fence stripping of raw replies
//! - [`pipeline`] - End-to-end generation with a single validation retry
//! - [`status`] - ANSI status report
//!
//! # Example
//!
//! ```ignore
//! use nlsh::{backend, config::Config, environment::EnvSnapshot, pipeline, prompt::PromptContext};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let snapshot = EnvSnapshot::probe();
//!     let backend = backend::resolve_backend(&config);
//!     let ctx = PromptContext {
//!         system_line: snapshot.system_line(),
//!         tools_line: snapshot.tools_line(),
//!         aliases: snapshot.aliases.clone(),
//!         cwd: std::env::current_dir()?.display().to_string(),
//!         global_context: None,
//!         local_context: None,
//!         rules: config.rules.clone(),
//!     };
//!     let command = pipeline::generate_command(&backend, &ctx, "list files", &snapshot.missing).await?;
//!     println!("{command}");
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod context;
pub mod environment;
pub mod pipeline;
pub mod prompt;
pub mod sanitize;
pub mod status;
