//! Error types for fleetdesk

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Missing configuration value: {0}")]
    Missing(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

/// Authentication-related errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No identity source yielded a valid access token")]
    NoTokenAvailable,

    #[error("Token provider '{provider}' failed: {message}")]
    Provider { provider: String, message: String },

    #[error("Invalid username or password")]
    InvalidCredentials,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown delivery status: {0}")]
    InvalidStatus(String),

    #[error("Not enough data: {0}")]
    InsufficientData(String),

    #[error("Export error: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, Error>;
