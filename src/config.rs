//! Configuration loading.
//!
//! Settings live in a YAML file (default `config.yaml`); every field has a
//! default so a minimal or missing section still yields a working config.
//! The Anthropic API key is not part of the file; it comes in through
//! the CLI or the `ANTHROPIC_API_KEY` environment variable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::info;

/// Supported publication languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ja,
    En,
}

impl Language {
    /// Directory / URL segment for this language.
    pub fn code(self) -> &'static str {
        match self {
            Language::Ja => "ja",
            Language::En => "en",
        }
    }

    /// Both languages, in run order. Japanese runs first so its morning
    /// slot lines up with the JST cron trigger.
    pub fn all() -> [Language; 2] {
        [Language::Ja, Language::En]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClaudeConfig {
    /// Model used for app generation and AI selection.
    pub model: String,
    pub max_tokens: u32,
    pub thinking_budget: u32,
    /// When true, generation requests carry an extended-thinking budget.
    pub extended_thinking: bool,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5".to_string(),
            max_tokens: 8000,
            thinking_budget: 2000,
            extended_thinking: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionConfig {
    /// Delegate the final pick to the model; false uses the heuristic scorer.
    pub use_ai: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { use_ai: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_secs: u64,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_secs: 2,
            multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    pub user_name: String,
    pub user_email: String,
    pub remote: String,
    pub branch: String,
    /// Push after committing. Disable for dry runs.
    pub push: bool,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            user_name: "Anniversary Bot".to_string(),
            user_email: "bot@example.com".to_string(),
            remote: "origin".to_string(),
            branch: "main".to_string(),
            push: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmailConfig {
    pub enabled: bool,
    pub from: String,
    pub to: String,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            from: String::new(),
            to: String::new(),
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            smtp_user: String::new(),
            smtp_password: String::new(),
        }
    }
}

/// Application configuration, one section per concern.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub claude: ClaudeConfig,
    pub selection: SelectionConfig,
    pub retry: RetryConfig,
    pub git: GitConfig,
    pub email: EmailConfig,
}

impl Config {
    /// Load configuration from a YAML file. A missing file yields the
    /// defaults; a present-but-malformed file is an error.
    pub fn load(path: &Path) -> Result<Self, serde_yaml::Error> {
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                let config: Config = serde_yaml::from_str(&raw)?;
                info!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            Err(_) => {
                info!(path = %path.display(), "No config file found; using defaults");
                Ok(Config::default())
            }
        }
    }
}
