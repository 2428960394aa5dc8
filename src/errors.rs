//! Errors for freight desk
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FreightDeskError {
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Configuration loading error")]
    ConfigError(#[from] config::ConfigError),

    #[error("Serialization error")]
    SerdeError(#[from] serde_json::Error),

    #[error("IO error")]
    IoError(#[from] std::io::Error),

    #[error("CSV error")]
    CsvError(#[from] csv::Error),

    #[error("HTTP request error")]
    HttpError(#[from] reqwest::Error),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Database migration error")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Invalid response from upstream: {0}")]
    UpstreamShape(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Invalid IMO number")]
    InvalidImo(String),

    #[error("Stored value could not be decoded: {0}")]
    DecodeError(String),
}
