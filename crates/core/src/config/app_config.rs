use crate::config::ConfigError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::env;
use std::path::Path;
use std::str::FromStr;

/// Environment enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue {
                field: "environment".to_string(),
                value: s.to_string(),
                expected: "development, testing, or production".to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env_str = match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        };
        write!(f, "{}", env_str)
    }
}

impl Environment {
    /// Check if environment is development
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    /// Check if environment is testing
    pub fn is_testing(&self) -> bool {
        matches!(self, Environment::Testing)
    }

    /// Check if environment is production
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Application configuration tree.
///
/// Plugins read their sections by dotted path (`"database.stores"`) and
/// contribute defaults with [`AppConfig::merge_defaults`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    root: Value,
}

impl AppConfig {
    /// Create an empty configuration tree
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// Wrap an existing JSON value. Non-object roots are rejected.
    pub fn from_value(root: Value) -> Result<Self, ConfigError> {
        if !root.is_object() {
            return Err(ConfigError::invalid_value(
                "<root>",
                root.to_string(),
                "a configuration object",
            ));
        }
        Ok(Self { root })
    }

    /// Parse a YAML document into a configuration tree
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_yaml::from_str(source)?;
        Self::from_value(root)
    }

    /// Load configuration from a `.json`, `.yaml` or `.yml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_value(serde_json::from_str(&content)?),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            other => Err(ConfigError::invalid_value(
                "config file",
                path.display().to_string(),
                format!("a .json, .yaml or .yml file (got {:?})", other),
            )),
        }
    }

    /// The whole tree
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Look up a node by dotted path
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(&self.root, |node, segment| node.get(segment))
    }

    /// Check whether a non-null value exists at `path`
    pub fn contains(&self, path: &str) -> bool {
        matches!(self.get(path), Some(value) if !value.is_null())
    }

    /// Deserialize the node at `path`. Returns `Ok(None)` when absent.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ConfigError> {
        match self.get(path) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| ConfigError::parsing(path, e.to_string())),
        }
    }

    /// Set the node at `path`, creating intermediate objects.
    /// Scalars standing in the way are replaced by objects.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut node = &mut self.root;
        for segment in parents {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let map = match node {
                Value::Object(map) => map,
                _ => return,
            };
            node = map.entry(segment.to_string()).or_insert(Value::Null);
        }

        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        if let Some(map) = node.as_object_mut() {
            map.insert(last.to_string(), value.into());
        }
    }

    /// Merge `defaults` into the tree. Keys already present keep their value.
    pub fn merge_defaults(&mut self, defaults: &Value) {
        merge_missing(&mut self.root, defaults);
    }

    /// Apply overrides from environment variables named `PREFIX__A__B`.
    ///
    /// Values are parsed as JSON when possible and kept as strings otherwise.
    /// Returns the number of overrides applied.
    pub fn apply_env_overrides(&mut self, prefix: &str) -> usize {
        let marker = format!("{}__", prefix);
        let mut overrides: Vec<(String, Value)> = env::vars()
            .filter_map(|(key, raw)| {
                let rest = key.strip_prefix(&marker)?;
                let path = rest
                    .split("__")
                    .map(|segment| segment.to_lowercase())
                    .collect::<Vec<_>>()
                    .join(".");
                let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
                Some((path, value))
            })
            .collect();
        overrides.sort_by(|a, b| a.0.cmp(&b.0));

        for (path, value) in &overrides {
            tracing::debug!("Applying config override for '{}'", path);
            self.set(path, value.clone());
        }
        overrides.len()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_missing(target: &mut Value, defaults: &Value) {
    let (Value::Object(target_map), Value::Object(default_map)) = (target, defaults) else {
        return;
    };

    for (key, default_value) in default_map {
        match target_map.get_mut(key) {
            None | Some(Value::Null) => {
                target_map.insert(key.clone(), default_value.clone());
            }
            Some(existing) => merge_missing(existing, default_value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;

    fn sample() -> AppConfig {
        AppConfig::from_value(json!({
            "database": {
                "stores": { "main": { "uri": "postgres://localhost/app" } },
                "models": { "migrate": "drop" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_get_by_path() {
        let config = sample();
        assert_eq!(config.get("database.models.migrate"), Some(&json!("drop")));
        assert!(config.get("database.stores.main").is_some());
        assert!(config.get("database.missing").is_none());
        assert!(config.contains("database.stores"));
    }

    #[test]
    fn test_get_as_reports_path_on_error() {
        let config = sample();
        let migrate: Option<String> = config.get_as("database.models.migrate").unwrap();
        assert_eq!(migrate.as_deref(), Some("drop"));

        let err = config.get_as::<u32>("database.models.migrate").unwrap_err();
        assert!(err.to_string().contains("database.models.migrate"));
    }

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut config = AppConfig::new();
        config.set("database.orm", "elif-orm");
        config.set("a.b.c", 3);
        assert_eq!(config.get("database.orm"), Some(&json!("elif-orm")));
        assert_eq!(config.get("a.b.c"), Some(&json!(3)));

        config.set("a.b", json!("scalar"));
        config.set("a.b.d", true);
        assert_eq!(config.get("a.b.d"), Some(&json!(true)));
    }

    #[test]
    fn test_merge_defaults_keeps_user_values() {
        let mut config = sample();
        config.merge_defaults(&json!({
            "database": {
                "stores": {},
                "models": { "migrate": "alter", "defaultStore": "main" }
            }
        }));

        assert_eq!(config.get("database.models.migrate"), Some(&json!("drop")));
        assert_eq!(
            config.get("database.models.defaultStore"),
            Some(&json!("main"))
        );
        assert!(config.get("database.stores.main").is_some());
    }

    #[test]
    fn test_from_value_rejects_scalars() {
        assert!(AppConfig::from_value(json!(42)).is_err());
    }

    #[test]
    fn test_from_yaml_and_file() {
        let yaml = "database:\n  models:\n    migrate: none\n";
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.get("database.models.migrate"), Some(&json!("none")));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.yaml");
        std::fs::write(&path, yaml).unwrap();
        assert_eq!(AppConfig::from_file(&path).unwrap(), config);

        let bad = dir.path().join("app.ini");
        std::fs::write(&bad, "x=1").unwrap();
        assert!(AppConfig::from_file(&bad).is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        env::set_var("ELIFTEST__DATABASE__MODELS__MIGRATE", "none");
        env::set_var("ELIFTEST__DATABASE__STORES__MAIN__PORT", "5433");

        let mut config = sample();
        let applied = config.apply_env_overrides("ELIFTEST");

        env::remove_var("ELIFTEST__DATABASE__MODELS__MIGRATE");
        env::remove_var("ELIFTEST__DATABASE__STORES__MAIN__PORT");

        assert_eq!(applied, 2);
        assert_eq!(config.get("database.models.migrate"), Some(&json!("none")));
        assert_eq!(config.get("database.stores.main.port"), Some(&json!(5433)));
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert!("staging".parse::<Environment>().is_err());
        assert_eq!(Environment::Testing.to_string(), "testing");
    }
}
