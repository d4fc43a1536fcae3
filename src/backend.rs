//! LLM backend adapters and engine resolution.
//!
//! Exactly two backends exist: the hosted Gemini API and a local Ollama
//! endpoint. Selection happens once per invocation in [`resolve_backend`],
//! which also applies the credential-missing fallback.

use crate::config::{Config, Engine, DEFAULT_OLLAMA_MODEL, OLLAMA_MODEL_PLACEHOLDER};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// A backend turns one prompt into one generated text reply.
#[async_trait]
pub trait CommandBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Hosted Gemini backend, authenticated by API key.
pub struct GeminiBackend {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(model: String, api_key: String) -> Self {
        Self::with_base_url(GEMINI_BASE_URL.to_string(), model, api_key)
    }

    pub fn with_base_url(base_url: String, model: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            model,
            api_key,
        }
    }
}

#[async_trait]
impl CommandBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": 0.2 },
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(anyhow!("Gemini API error ({}): {}", status.as_u16(), text));
        }

        let reply: Value = serde_json::from_str(&text)
            .map_err(|err| anyhow!("Gemini response was not valid JSON: {err}"))?;
        let fragment = reply
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|candidates| candidates.first())
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
            .and_then(|parts| parts.first())
            .and_then(|part| part.get("text"))
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("no response from Gemini"))?;

        Ok(fragment.to_string())
    }
}

/// Local Ollama backend, streaming disabled.
pub struct OllamaBackend {
    client: Client,
    host: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct OllamaReply {
    response: String,
}

impl OllamaBackend {
    pub fn new(host: String, model: String) -> Self {
        Self {
            client: Client::new(),
            host,
            model,
        }
    }
}

#[async_trait]
impl CommandBackend for OllamaBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.host);
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(anyhow!("Ollama API error ({}): {}", status.as_u16(), text));
        }

        let reply: OllamaReply = serde_json::from_str(&text)
            .map_err(|err| anyhow!("Ollama response decode failed: {err}"))?;
        Ok(reply.response)
    }
}

/// The closed set of production backends.
pub enum Backend {
    Gemini(GeminiBackend),
    Ollama(OllamaBackend),
}

#[async_trait]
impl CommandBackend for Backend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        match self {
            Backend::Gemini(backend) => backend.generate(prompt).await,
            Backend::Ollama(backend) => backend.generate(prompt).await,
        }
    }
}

/// Resolves the configured engine to a concrete backend.
///
/// Gemini without an API key falls back to Ollama for this invocation only,
/// substituting the default local model when the configured one is empty or
/// the placeholder. The config itself is not modified.
pub fn resolve_backend(config: &Config) -> Backend {
    match config.engine {
        Engine::Ollama => {
            info!("Dispatching to Ollama at {}", config.ollama.host);
            Backend::Ollama(OllamaBackend::new(
                config.ollama.host.clone(),
                config.ollama.model.clone(),
            ))
        }
        Engine::Gemini if config.gemini.api_key.is_empty() => {
            eprintln!("⚠️  GEMINI_API_KEY not found. Attempting local link via Ollama...");
            warn!("No Gemini API key configured, falling back to Ollama");
            let model = if config.ollama.model.is_empty()
                || config.ollama.model == OLLAMA_MODEL_PLACEHOLDER
            {
                DEFAULT_OLLAMA_MODEL.to_string()
            } else {
                config.ollama.model.clone()
            };
            Backend::Ollama(OllamaBackend::new(config.ollama.host.clone(), model))
        }
        Engine::Gemini => {
            info!("Dispatching to Gemini model {}", config.gemini.model);
            Backend::Gemini(GeminiBackend::new(
                config.gemini.model.clone(),
                config.gemini.api_key.clone(),
            ))
        }
    }
}
