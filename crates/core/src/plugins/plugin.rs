use async_trait::async_trait;

use crate::application::Application;
use crate::config::ConfigError;

/// Plugin error type
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Plugin '{plugin}' validation failed: {source}")]
    ValidationFailed {
        plugin: String,
        #[source]
        source: ConfigError,
    },

    #[error("Plugin '{plugin}' configuration failed: {message}")]
    ConfigurationFailed { plugin: String, message: String },

    #[error("Plugin '{plugin}' initialization failed: {source}")]
    InitializationFailed {
        plugin: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Plugin '{plugin}' unload failed: {message}")]
    UnloadFailed { plugin: String, message: String },

    #[error("Invalid lifecycle transition: cannot {operation} while {state}")]
    InvalidState { operation: String, state: String },
}

impl PluginError {
    /// Wrap any error raised while initializing a plugin
    pub fn initialization(
        plugin: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InitializationFailed {
            plugin: plugin.into(),
            source: Box::new(source),
        }
    }

    /// Name of the plugin that raised the error, if any
    pub fn plugin(&self) -> Option<&str> {
        match self {
            Self::ValidationFailed { plugin, .. }
            | Self::ConfigurationFailed { plugin, .. }
            | Self::InitializationFailed { plugin, .. }
            | Self::UnloadFailed { plugin, .. } => Some(plugin),
            Self::InvalidState { .. } => None,
        }
    }
}

/// A unit of framework functionality driven through the application lifecycle.
///
/// The host calls `validate`, `configure`, `initialize` in that order at
/// startup and `unload` at shutdown. No other entry points exist.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Plugin name for identification and logging
    fn name(&self) -> &'static str;

    /// Check the application config before anything is configured
    async fn validate(&self, app: &Application) -> Result<(), PluginError> {
        let _ = app;
        Ok(())
    }

    /// Contribute defaults and tags to the application config
    fn configure(&mut self, app: &mut Application) -> Result<(), PluginError> {
        let _ = app;
        Ok(())
    }

    /// Acquire resources and build runtime state
    async fn initialize(&mut self, app: &Application) -> Result<(), PluginError> {
        let _ = app;
        Ok(())
    }

    /// Release resources acquired during `initialize`
    async fn unload(&mut self, app: &Application) -> Result<(), PluginError> {
        let _ = app;
        Ok(())
    }

    /// Plugin version for compatibility checking
    fn version(&self) -> Option<&'static str> {
        None
    }

    /// Plugin description
    fn description(&self) -> Option<&'static str> {
        None
    }
}

/// Plugin metadata for introspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMetadata {
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
}

impl PluginMetadata {
    /// Create metadata from a plugin
    pub fn from_plugin<P: Plugin + ?Sized>(plugin: &P) -> Self {
        Self {
            name: plugin.name().to_string(),
            version: plugin.version().map(|v| v.to_string()),
            description: plugin.description().map(|d| d.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NamedPlugin;

    impl Plugin for NamedPlugin {
        fn name(&self) -> &'static str {
            "named"
        }

        fn version(&self) -> Option<&'static str> {
            Some("1.0.0")
        }
    }

    #[test]
    fn test_plugin_metadata() {
        let metadata = PluginMetadata::from_plugin(&NamedPlugin);
        assert_eq!(metadata.name, "named");
        assert_eq!(metadata.version.as_deref(), Some("1.0.0"));
        assert_eq!(metadata.description, None);
    }

    #[test]
    fn test_error_reports_plugin_name() {
        let err = PluginError::ConfigurationFailed {
            plugin: "datastore".to_string(),
            message: "bad".to_string(),
        };
        assert_eq!(err.plugin(), Some("datastore"));

        let err = PluginError::InvalidState {
            operation: "start".to_string(),
            state: "running".to_string(),
        };
        assert_eq!(err.plugin(), None);
    }
}
