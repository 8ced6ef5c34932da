use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {key} must be a non-negative integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("I/O error while opening log file at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid log filter '{filter}': {message}")]
    Filter { filter: String, message: String },

    #[error("a global tracing subscriber is already installed: {message}")]
    Subscriber { message: String },
}
