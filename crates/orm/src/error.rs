//! Error types for the ORM system

use std::fmt;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Error types for ORM operations
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Database query error
    Database(String),
    /// Model or identifier validation failed
    Validation(String),
    /// Association wiring failed
    Relationship(String),
    /// Serialization/deserialization error
    Serialization(String),
    /// Schema sync error
    Migration(String),
    /// Connection pool error
    Connection(String),
    /// Schema definition error
    Schema(String),
    /// Configuration error
    Configuration(String),
    /// Class or instance method lookup failed
    MethodNotFound { model: String, method: String },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Database(msg) => write!(f, "Database error: {}", msg),
            ModelError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ModelError::Relationship(msg) => write!(f, "Relationship error: {}", msg),
            ModelError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            ModelError::Migration(msg) => write!(f, "Migration error: {}", msg),
            ModelError::Connection(msg) => write!(f, "Connection error: {}", msg),
            ModelError::Schema(msg) => write!(f, "Schema error: {}", msg),
            ModelError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            ModelError::MethodNotFound { model, method } => {
                write!(f, "Method '{}' is not defined on model '{}'", method, model)
            }
        }
    }
}

impl std::error::Error for ModelError {}

// Convert from sqlx errors
impl From<sqlx::Error> for ModelError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolClosed => ModelError::Connection("Database pool is closed".to_string()),
            sqlx::Error::PoolTimedOut => {
                ModelError::Connection("Timed out acquiring a connection".to_string())
            }
            other => ModelError::Database(other.to_string()),
        }
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}
