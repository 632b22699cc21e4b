//! Structured logging bootstrap for applications built on elif.rs

use std::io;
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::CoreError;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "warn")
    pub level: String,
    /// Enable JSON structured logging (vs plain text)
    pub json_format: bool,
    /// Enable pretty printing for development
    pub pretty_print: bool,
    /// Environment filter (supports filters like "elif_datastore=debug,sqlx=warn")
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            pretty_print: true,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    /// Create production logging configuration
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            json_format: true,
            pretty_print: false,
            env_filter: Some("info,sqlx=warn".to_string()),
        }
    }

    /// Create development logging configuration
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            pretty_print: true,
            env_filter: Some("debug,sqlx=info".to_string()),
        }
    }

    /// Create test logging configuration (minimal output)
    pub fn test() -> Self {
        Self {
            level: "error".to_string(),
            json_format: false,
            pretty_print: false,
            env_filter: None,
        }
    }

    /// Set environment filter
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }
}

/// Initialize structured logging. `RUST_LOG` takes precedence over the config.
pub fn init_logging(config: &LoggingConfig) -> Result<(), CoreError> {
    let env_filter = config.env_filter.as_deref().unwrap_or(&config.level);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(env_filter))
        .map_err(|e| CoreError::Logging {
            message: format!("invalid filter '{}': {}", env_filter, e),
        })?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json_format {
        registry
            .with(Layer::new().with_writer(io::stdout).json())
            .try_init()
    } else if config.pretty_print {
        registry
            .with(Layer::new().with_writer(io::stdout).pretty())
            .try_init()
    } else {
        registry.with(Layer::new().with_writer(io::stdout)).try_init()
    };

    result.map_err(|e| CoreError::Logging {
        message: e.to_string(),
    })?;

    tracing::info!(
        target: "elif::logging",
        "Structured logging initialized (level: {}, format: {})",
        config.level,
        if config.json_format { "JSON" } else { "text" }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(LoggingConfig::production().json_format);
        assert_eq!(LoggingConfig::development().level, "debug");
        assert_eq!(LoggingConfig::test().level, "error");
        let config = LoggingConfig::default().with_env_filter("warn");
        assert_eq!(config.env_filter.as_deref(), Some("warn"));
    }

    #[test]
    fn test_second_init_is_an_error_not_a_panic() {
        let config = LoggingConfig::test();
        let first = init_logging(&config);
        let second = init_logging(&config);
        // Another test may have installed a subscriber first.
        assert!(first.is_ok() || second.is_err());
        assert!(second.is_err());
    }
}
