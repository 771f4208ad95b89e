//! Domain error types

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected format: <number>ms, <number>s, <number>m, or <number>m<number>s (e.g., 500ms, 30s, 1m, 2m30s)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when an invalid priority is provided
#[derive(Debug, Clone, Error)]
#[error("Invalid priority: \"{input}\". Valid priorities are: high, medium, low")]
pub struct PriorityParseError {
    pub input: String,
}

/// Error when a due date cannot be parsed
#[derive(Debug, Clone, Error)]
#[error("Invalid due date: \"{input}\". Expected format: YYYY-MM-DD HH:MM or YYYY-MM-DD")]
pub struct DueDateParseError {
    pub input: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
