use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsuranceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Provider registry error: {0}")]
    Registry(String),

    #[error("Seed data error: {0}")]
    Seed(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type InsuranceResult<T> = Result<T, InsuranceError>;
