use thiserror::Error;

/// Top-level error type for zanbot.
#[derive(Debug, Error)]
pub enum ZanError {
    /// Error from the chat transport.
    #[error("channel error: {0}")]
    Channel(String),

    /// Error from the translation backend.
    #[error("translation error: {0}")]
    Translation(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
