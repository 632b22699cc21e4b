//! Structural checks on the `database` section

use elif_core::config::ObjectValidator;
use elif_core::{ConfigError, ConfigValidator};
use elif_orm::DatabaseBackendType;
use serde_json::Value;
use url::Url;

use crate::config::{DatabaseConfig, MigrateMode};

/// A null value is treated as an absent key
fn present<'a>(value: &'a Value, pointer: &str) -> Option<&'a Value> {
    value.pointer(pointer).filter(|v| !v.is_null())
}

/// Validates a `database` object
#[derive(Debug, Default)]
pub struct DatabaseConfigValidator;

impl ConfigValidator<Value> for DatabaseConfigValidator {
    fn validate(&self, value: &Value) -> Result<(), ConfigError> {
        if let Some(migrate) = present(value, "/models/migrate") {
            let valid = migrate
                .as_str()
                .map(|mode| mode.parse::<MigrateMode>().is_ok())
                .unwrap_or(false);
            if !valid {
                return Err(ConfigError::invalid_value(
                    "database.models.migrate",
                    migrate.to_string(),
                    format!("one of {}", MigrateMode::VARIANTS.join(", ")),
                ));
            }
        }

        if let Some(stores) = present(value, "/stores") {
            if !stores.is_object() {
                return Err(ConfigError::invalid_value(
                    "database.stores",
                    stores.to_string(),
                    "an object of named stores",
                ));
            }
        }

        let config: DatabaseConfig = serde_json::from_value(value.clone())
            .map_err(|e| ConfigError::parsing("database", e.to_string()))?;

        for (name, store) in &config.stores {
            let field = format!("database.stores.{}", name);

            match &store.uri {
                Some(uri) => {
                    Url::parse(uri).map_err(|e| {
                        ConfigError::invalid_value(
                            format!("{}.uri", field),
                            uri.clone(),
                            format!("a connection URI ({})", e),
                        )
                    })?;
                    if store.dialect.is_none() {
                        DatabaseBackendType::from_uri(uri).map_err(|e| {
                            ConfigError::invalid_value(format!("{}.uri", field), uri.clone(), e)
                        })?;
                    }
                }
                None if store.database.is_none() => {
                    return Err(ConfigError::missing_required(
                        format!("{}.uri", field),
                        "Set `uri`, or `database` with optional host/port/credentials",
                    ));
                }
                None => {}
            }

            if let Some(dialect) = &store.dialect {
                dialect.parse::<DatabaseBackendType>().map_err(|e| {
                    ConfigError::invalid_value(format!("{}.dialect", field), dialect.clone(), e)
                })?;
            }
        }

        Ok(())
    }
}

/// Validate the `database` section and return it parsed.
///
/// The section itself must be present and an object; missing keys inside it
/// take their defaults.
pub fn validate_database_config(database: Option<&Value>) -> Result<DatabaseConfig, ConfigError> {
    ObjectValidator::new("database").validate(&database)?;
    let value = database.cloned().unwrap_or(Value::Null);
    DatabaseConfigValidator.validate(&value)?;
    serde_json::from_value(value).map_err(|e| ConfigError::parsing("database", e.to_string()))
}
