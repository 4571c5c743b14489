//! Configuration loading, validation, and management for subprompt.
//!
//! Loads configuration from `~/.subprompt/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// The root configuration structure.
///
/// Maps directly to `~/.subprompt/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default log level when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Tokenizer output settings
    #[serde(default)]
    pub tokenizer: TokenizerConfig,

    /// CSV run log settings
    #[serde(default)]
    pub run_log: RunLogConfig,

    /// Image metadata settings
    #[serde(default)]
    pub metadata: MetadataConfig,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Print unparsable weight fields alongside the tokenized output.
    /// They are always logged through `tracing` regardless.
    #[serde(default = "default_true")]
    pub warn_on_unparsable: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            warn_on_unparsable: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLogConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_run_log_path")]
    pub path: PathBuf,
}

fn default_run_log_path() -> PathBuf {
    PathBuf::from("logs").join("runs.csv")
}

impl Default for RunLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_run_log_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Software name written into the `Software` text chunk and EXIF tag
    #[serde(default = "default_software")]
    pub software: String,

    /// Name of the generating script, appended to the software name
    #[serde(default = "default_software")]
    pub script_name: String,

    /// Compress the `Prompt` text chunk
    #[serde(default = "default_true")]
    pub compress_prompt: bool,
}

fn default_software() -> String {
    "subprompt".into()
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            software: default_software(),
            script_name: default_software(),
            compress_prompt: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.subprompt/config.toml).
    ///
    /// Environment overrides:
    /// - `SUBPROMPT_LOG_LEVEL`
    /// - `SUBPROMPT_RUN_LOG` (run log path)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_path())
    }

    /// Load from `path`, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Apply environment overrides using the given lookup.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("SUBPROMPT_LOG_LEVEL") {
            self.log_level = level.to_lowercase();
        }

        if let Some(path) = lookup("SUBPROMPT_RUN_LOG") {
            self.run_log.path = PathBuf::from(path);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".subprompt")
    }

    /// Get the default config file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.log_level
            )));
        }

        if self.run_log.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "run_log.path must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `config init`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            tokenizer: TokenizerConfig::default(),
            run_log: RunLogConfig::default(),
            metadata: MetadataConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for subprompt_core::Error {
    fn from(e: ConfigError) -> Self {
        subprompt_core::Error::Config {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.log_level, "info");
        assert!(config.tokenizer.warn_on_unparsable);
        assert!(config.run_log.enabled);
        assert_eq!(config.run_log.path, PathBuf::from("logs").join("runs.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.log_level, config.log_level);
        assert_eq!(parsed.run_log.path, config.run_log.path);
        assert_eq!(parsed.metadata.software, config.metadata.software);
    }

    #[test]
    fn invalid_log_level_rejected() {
        let config = AppConfig {
            log_level: "loud".into(),
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn empty_run_log_path_rejected() {
        let mut config = AppConfig::default();
        config.run_log.path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().log_level, "info");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[run_log]
enabled = false

[metadata]
script_name = "txt2img"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert!(!config.run_log.enabled);
        assert_eq!(config.run_log.path, PathBuf::from("logs").join("runs.csv"));
        assert_eq!(config.metadata.script_name, "txt2img");
        assert_eq!(config.metadata.software, "subprompt");
        assert!(config.metadata.compress_prompt);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "log_level = [").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn invalid_file_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "log_level = \"chatty\"").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("SUBPROMPT_LOG_LEVEL", "DEBUG"),
            ("SUBPROMPT_RUN_LOG", "/var/log/runs.csv"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.run_log.path, PathBuf::from("/var/log/runs.csv"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("log_level"));
        assert!(toml_str.contains("runs.csv"));
        assert!(toml_str.contains("[metadata]"));
    }
}
