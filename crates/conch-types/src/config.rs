//! Console configuration.
//!
//! Loaded from an optional `conch.toml`. Every key is optional; missing keys
//! fall back to the defaults below.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ConchError, Result};

/// Runtime settings for the interactive console.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleConfig {
    /// Text printed before every read. Empty means no prompt.
    #[serde(default)]
    pub prompt: String,
    /// Erase the echoed input line before a command is dispatched.
    #[serde(default = "default_erase_input")]
    pub erase_input: bool,
    /// Prefix printed in front of interactive questions.
    #[serde(default = "default_question_prefix")]
    pub question_prefix: String,
    /// Default `env_logger` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Register the built-in `help` command.
    #[serde(default = "default_help")]
    pub help: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            erase_input: default_erase_input(),
            question_prefix: default_question_prefix(),
            log_filter: default_log_filter(),
            help: default_help(),
        }
    }
}

impl ConsoleConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("{} not found, using default console config", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.log_filter.trim().is_empty() {
            return Err(ConchError::Config("log_filter must not be empty".into()));
        }
        Ok(())
    }
}

fn default_erase_input() -> bool {
    true
}
fn default_question_prefix() -> String {
    "[QUESTION]".to_string()
}
fn default_log_filter() -> String {
    "info".to_string()
}
fn default_help() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults() {
        let config = ConsoleConfig::default();
        assert_eq!(config.prompt, "");
        assert!(config.erase_input);
        assert_eq!(config.question_prefix, "[QUESTION]");
        assert_eq!(config.log_filter, "info");
        assert!(config.help);
    }

    #[test]
    fn empty_toml_is_default() {
        let config = ConsoleConfig::from_toml("").unwrap();
        assert_eq!(config, ConsoleConfig::default());
    }

    #[test]
    fn deserialize_from_toml() {
        let toml = r#"
prompt = "> "
erase_input = false
log_filter = "debug"
"#;
        let config = ConsoleConfig::from_toml(toml).unwrap();
        assert_eq!(config.prompt, "> ");
        assert!(!config.erase_input);
        assert_eq!(config.log_filter, "debug");
        // Untouched keys keep their defaults.
        assert_eq!(config.question_prefix, "[QUESTION]");
        assert!(config.help);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = ConsoleConfig::from_toml("colour = true").unwrap_err();
        assert!(matches!(err, ConchError::TomlParse(_)));
    }

    #[test]
    fn blank_log_filter_is_rejected() {
        let err = ConsoleConfig::from_toml("log_filter = \"  \"").unwrap_err();
        assert!(matches!(err, ConchError::Config(_)));
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConsoleConfig::load(&dir.path().join("conch.toml")).unwrap();
        assert_eq!(config, ConsoleConfig::default());
    }

    #[test]
    fn load_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "prompt = \"$ \"").unwrap();
        let config = ConsoleConfig::load(file.path()).unwrap();
        assert_eq!(config.prompt, "$ ");
    }
}
