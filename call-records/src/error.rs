use thiserror::Error;

#[derive(Error, Debug)]
pub enum CallRecordError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Concurrent updates kept conflicting for call {0}")]
    Conflict(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Conversation API error: {0}")]
    ConversationApi(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type CallRecordResult<T> = Result<T, CallRecordError>;
