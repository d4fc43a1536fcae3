use anyhow::{anyhow, Result};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Model substituted when falling back to Ollama without a usable model name.
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5-coder:7b";
/// Placeholder model name treated as "not really configured".
pub const OLLAMA_MODEL_PLACEHOLDER: &str = "llama3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Gemini,
    Ollama,
}

impl Engine {
    /// Parses an engine name, failing over to the default for unknown values.
    pub fn parse_lossy(value: &str) -> Self {
        match value {
            "ollama" => Engine::Ollama,
            _ => Engine::Gemini,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::Gemini
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::Gemini => write!(f, "gemini"),
            Engine::Ollama => write!(f, "ollama"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.0-flash".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub model: String,
    pub host: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            host: "http://localhost:11434".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: Engine,
    pub gemini: GeminiConfig,
    pub ollama: OllamaConfig,
    pub rules: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            gemini: GeminiConfig::default(),
            ollama: OllamaConfig::default(),
            rules: vec![
                "Prefer modern tools (rg over grep, fd over find, bat over cat).".to_string(),
                "Use fish shell syntax (e.g. for loops).".to_string(),
                "When running commands on files (like bat/cat/grep), ALWAYS ensure you filter for files only (e.g. fd --type f).".to_string(),
                "Assume macOS environment.".to_string(),
            ],
        }
    }
}

impl Config {
    /// Load configuration from the default location with environment overrides.
    pub fn load() -> Result<Self> {
        let dir = Self::config_dir()?;
        let mut config = Self::load_from(&dir);
        config.apply_env_overrides(
            std::env::var("GEMINI_API_KEY").ok(),
            std::env::var("NLSH_ENGINE").ok(),
        );
        Ok(config)
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = home_dir().ok_or_else(|| anyhow!("could not resolve home directory"))?;
        Ok(home.join(".config").join("nlsh"))
    }

    /// Load from a specific config directory. A missing file seeds defaults on
    /// disk; an unreadable or malformed file falls back to defaults in memory.
    pub fn load_from(dir: &Path) -> Self {
        let path = dir.join("config.json");
        let mut config = Self::default();

        match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(value) => {
                    config.merge_file_value(&value);
                    info!("Loaded config from: {}", path.display());
                }
                Err(err) => {
                    warn!("Config file is not valid JSON, using defaults: {err}");
                }
            },
            Err(_) => {
                config.seed_defaults(dir, &path);
            }
        }

        config
    }

    /// Apply environment overrides on top of the file-derived state.
    pub fn apply_env_overrides(&mut self, api_key: Option<String>, engine: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            self.gemini.api_key = key;
        }
        if let Some(engine) = engine.filter(|e| !e.is_empty()) {
            self.engine = Engine::parse_lossy(&engine);
        }
    }

    // Best-effort field-wise merge: any field that fails to parse keeps its
    // default rather than poisoning the whole config.
    fn merge_file_value(&mut self, value: &Value) {
        let Some(map) = value.as_object() else {
            return;
        };

        if let Some(engine) = map.get("engine") {
            if let Ok(engine) = serde_json::from_value::<Engine>(engine.clone()) {
                self.engine = engine;
            }
        }
        if let Some(block) = map.get("gemini").and_then(Value::as_object) {
            merge_string(&mut self.gemini.api_key, block.get("api_key"));
            merge_string(&mut self.gemini.model, block.get("model"));
        }
        if let Some(block) = map.get("ollama").and_then(Value::as_object) {
            merge_string(&mut self.ollama.model, block.get("model"));
            merge_string(&mut self.ollama.host, block.get("host"));
        }
        if let Some(rules) = map.get("rules") {
            if let Ok(rules) = serde_json::from_value::<Vec<String>>(rules.clone()) {
                self.rules = rules;
            }
        }
    }

    // First-run seeding. Write failures are logged, never fatal.
    fn seed_defaults(&self, dir: &Path, path: &Path) {
        if let Err(err) = fs::create_dir_all(dir) {
            warn!("Could not create config directory: {err}");
            return;
        }
        match serde_json::to_string_pretty(self) {
            Ok(content) => {
                if let Err(err) = fs::write(path, content) {
                    warn!("Could not seed default config: {err}");
                } else {
                    info!("Seeded default config at: {}", path.display());
                }
            }
            Err(err) => warn!("Could not serialize default config: {err}"),
        }
    }
}

fn merge_string(slot: &mut String, value: Option<&Value>) {
    if let Some(Value::String(s)) = value {
        *slot = s.clone();
    }
}
