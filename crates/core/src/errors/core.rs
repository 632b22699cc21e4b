use thiserror::Error;

use crate::config::ConfigError;
use crate::plugins::PluginError;

/// Core error type for the elif framework
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("Logging error: {message}")]
    Logging { message: String },
}

impl CoreError {
    /// Check if the error came from configuration handling
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_conversion() {
        let err: CoreError = ConfigError::validation_failed("bad tree").into();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("bad tree"));
    }

    #[test]
    fn test_plugin_error_conversion() {
        let err: CoreError = PluginError::initialization("cache", ConfigError::validation_failed("no backend")).into();
        assert!(!err.is_configuration());
        assert!(err.to_string().starts_with("Plugin error: "));
    }
}
