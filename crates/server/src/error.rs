//! Error types for the MCP server.

use thiserror::Error;

/// Main error type for server startup and tool registration.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration errors (invalid flags, conflicting settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Manifest errors (unreadable file, unresolvable tool reference)
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Startup errors (listener failed to bind, transport failed)
    #[error("Startup error: {0}")]
    Startup(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
