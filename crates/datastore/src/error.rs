use elif_core::{ConfigError, PluginError};
use elif_orm::ModelError;
use thiserror::Error;

use crate::pack::PLUGIN_NAME;

/// Errors raised while loading the datastore
#[derive(Debug, Error)]
pub enum DatastoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Store '{store}': {message}")]
    Store { store: String, message: String },

    #[error("Migration on store '{store}' failed: {source}")]
    Migration {
        store: String,
        #[source]
        source: ModelError,
    },
}

impl From<DatastoreError> for PluginError {
    fn from(err: DatastoreError) -> Self {
        match err {
            DatastoreError::Config(source) => PluginError::ValidationFailed {
                plugin: PLUGIN_NAME.to_string(),
                source,
            },
            other => PluginError::initialization(PLUGIN_NAME, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_error_conversion() {
        let err: PluginError = DatastoreError::from(ConfigError::validation_failed("bad")).into();
        assert!(matches!(err, PluginError::ValidationFailed { .. }));

        let err: PluginError = DatastoreError::Migration {
            store: "main".to_string(),
            source: ModelError::Migration("boom".to_string()),
        }
        .into();
        assert!(matches!(err, PluginError::InitializationFailed { .. }));
        assert_eq!(err.plugin(), Some("datastore"));
        assert!(err.to_string().contains("main"));
    }
}
