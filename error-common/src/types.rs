use thiserror::Error;

use crate::codes;

/// Process-level error for startup, configuration and serving
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Logging or tracing setup errors
    #[error("Logging error: {0}")]
    LoggingError(String),

    /// Network communication errors
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Server lifecycle errors
    #[error("Server error: {0}")]
    ServerError(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    StorageError(String),

    /// External service errors
    #[error("External service error: {0}")]
    ExternalError(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    /// Stable code for logs and error bodies
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::ConfigError(_) => codes::internal::CONFIGURATION,
            EngineError::StorageError(_) => codes::storage::OPERATION_FAILED,
            EngineError::ExternalError(_) => codes::external::CONVERSATION_API_FAILED,
            EngineError::LoggingError(_)
            | EngineError::NetworkError(_)
            | EngineError::ServerError(_)
            | EngineError::Other(_) => codes::internal::UNEXPECTED,
        }
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Log an error with its stable code
pub fn log_error(context: &str, error: &EngineError) {
    tracing::error!(
        context = context,
        error_code = error.code(),
        error = %error,
        "engine error occurred"
    );
}
