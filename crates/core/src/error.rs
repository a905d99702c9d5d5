// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Registry error: {0}")]
    Registry(#[from] crate::domain::RegistryError),

    #[error("Command error: {0}")]
    Command(#[from] crate::port::CommandError),

    #[error("Sink error: {0}")]
    Sink(#[from] crate::port::SinkError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
