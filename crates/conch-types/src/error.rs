//! Error types for CONCH.

use std::io;

/// Errors produced by the CONCH framework.
///
/// Only startup-time conditions live here. Per-invocation failures (bad
/// arity, unconvertible tokens, unknown commands) are logged by the
/// dispatcher and never surface as a `ConchError`.
#[derive(Debug, thiserror::Error)]
pub enum ConchError {
    /// Two commands claim the same primary name.
    #[error("command `{name}` is already registered")]
    Collision { name: String },

    #[error("registration error: {0}")]
    Registration(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ConchError>;
