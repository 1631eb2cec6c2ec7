//! Configuration management for git_commit_message
//!
//! This module handles loading and parsing the optional configuration file
//! in TOML format. Every field has a default, so running without a file
//! behaves exactly like an empty file.

use std::env;
use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

/// Environment variable overriding `timeout_secs`
pub const TIMEOUT_ENV_VAR: &str = "GIT_COMMIT_MESSAGE_TIMEOUT";

/// Configuration file structure
///
/// # Example TOML
///
/// ```toml
/// program = "ollama"
/// chunk_model = "tavernari/git-commit-message:reasoning"
/// merge_model = "tavernari/git-commit-message:merge_commits"
///
/// # Used when $EDITOR is unset
/// editor = "vim"
///
/// # Delay per character of the typed-out transcript
/// typing_delay_ms = 2
///
/// # Optional deadline for a single generation run
/// timeout_secs = 300
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Executable of the generation engine
    pub program: String,
    /// Model used once per diff chunk
    pub chunk_model: String,
    /// Model merging the per-chunk messages into the final one
    pub merge_model: String,
    /// Editor used when `$EDITOR` is not set
    pub editor: String,
    /// Milliseconds to wait after each typed-out character
    pub typing_delay_ms: u64,
    /// Deadline in seconds for a single generation run, none by default
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            program: "ollama".to_string(),
            chunk_model: "tavernari/git-commit-message:reasoning".to_string(),
            merge_model: "tavernari/git-commit-message:merge_commits".to_string(),
            editor: "nano".to_string(),
            typing_delay_ms: 2,
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Delay per typed-out character
    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }

    /// Deadline for one generation run
    ///
    /// `GIT_COMMIT_MESSAGE_TIMEOUT` takes precedence over the file. An
    /// unparsable value is logged and ignored; `0` disables the deadline.
    pub fn generation_timeout(&self) -> Option<Duration> {
        let secs = match env::var(TIMEOUT_ENV_VAR) {
            Ok(v) if !v.is_empty() => match v.parse::<u64>() {
                Ok(secs) => Some(secs),
                Err(_) => {
                    warn!("Invalid {} value '{}', ignoring it", TIMEOUT_ENV_VAR, v);
                    self.timeout_secs
                }
            },
            _ => self.timeout_secs,
        };

        secs.filter(|s| *s > 0).map(Duration::from_secs)
    }

    fn validate(&self, config_path: &str) -> Result<()> {
        let required = [
            ("program", &self.program),
            ("chunk_model", &self.chunk_model),
            ("merge_model", &self.merge_model),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                anyhow::bail!(
                    "Configuration error: '{}' field cannot be empty or whitespace-only in {}",
                    field,
                    config_path
                );
            }
        }

        Ok(())
    }
}

/// Load configuration from a TOML file
///
/// # Arguments
///
/// * `config_path` - Path to the configuration file
///
/// # Returns
///
/// * `Result<Config>` - Parsed configuration, defaults filled in
///
/// # Errors
///
/// * File does not exist
/// * Invalid TOML format
/// * `program`, `chunk_model` or `merge_model` is empty or whitespace-only
///
/// # Example
///
/// ```no_run
/// use git_commit_message::config::load_config;
///
/// # fn main() -> anyhow::Result<()> {
/// let config = load_config("git-commit-message.toml")?;
/// println!("Merging with: {}", config.merge_model);
/// # Ok(())
/// # }
/// ```
pub fn load_config(config_path: &str) -> Result<Config> {
    let content = fs::read_to_string(config_path)
        .context(format!("Failed to read config file: {}", config_path))?;
    let config: Config = toml::from_str(&content).context("Failed to parse config file as TOML")?;

    config.validate(config_path)?;

    Ok(config)
}
