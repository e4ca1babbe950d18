use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Subscriber already initialised: {0}")]
    AlreadyInitialised(String),
}

pub type LoggerResult<T> = Result<T, LoggerError>;
