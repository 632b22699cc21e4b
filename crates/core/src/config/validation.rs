use serde_json::Value;
use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired { field: String, hint: String },

    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Configuration validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Parsing error at '{path}': {message}")]
    ParsingError { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// Create a missing required field error
    pub fn missing_required(field: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingRequired {
            field: field.into(),
            hint: hint.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create a validation failed error
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// Create a parsing error for a config path
    pub fn parsing(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParsingError {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Trait for validating configuration values
pub trait ConfigValidator<T: ?Sized> {
    /// Validate a configuration value
    fn validate(&self, value: &T) -> Result<(), ConfigError>;
}

/// Requires that a JSON config node is present and is an object
pub struct ObjectValidator {
    pub field: String,
}

impl ObjectValidator {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl ConfigValidator<Option<&Value>> for ObjectValidator {
    fn validate(&self, value: &Option<&Value>) -> Result<(), ConfigError> {
        match value {
            None | Some(Value::Null) => Err(ConfigError::missing_required(
                self.field.clone(),
                "This section is required",
            )),
            Some(Value::Object(_)) => Ok(()),
            Some(other) => Err(ConfigError::invalid_value(
                self.field.clone(),
                other.to_string(),
                "an object",
            )),
        }
    }
}
