use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read env file {path}: {reason}")]
    EnvFile { path: String, reason: String },

    #[error("Invalid env file: empty key at line {0}")]
    EmptyKey(usize),

    #[error("Invalid env file: malformed line {0} (expected KEY=VALUE)")]
    MalformedLine(usize),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}
