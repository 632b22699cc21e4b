//! Turns the `database` section and the model catalog into live connections
//! and model descriptors

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use elif_orm::{
    AssociateHook, AssociationContext, Association, ClassMethod, DatabaseBackendType,
    DatabaseConnection, InstanceMethod, MethodTable, Model, ModelDefinition, ModelInstance,
    ModelResult, ModelSchema, PostgresConnection,
};
use futures::future::join_all;
use serde_json::Value as JsonValue;

use crate::config::{DatabaseConfig, MigrateMode, StoreConfig};
use crate::error::DatastoreError;

/// Open connections keyed by store name
pub type Connections = BTreeMap<String, Arc<dyn DatabaseConnection>>;

/// Per-model settings and behavior
#[derive(Clone, Default)]
pub struct ModelConfig {
    /// Store to bind to; falls back to `database.models.defaultStore`
    pub store: Option<String>,
    pub table_name: Option<String>,
    /// Overrides `database.models.migrate` for this model
    pub migrate: Option<MigrateMode>,
    pub timestamps: Option<bool>,
    pub class_methods: MethodTable<ClassMethod>,
    pub instance_methods: MethodTable<InstanceMethod>,
    pub associate: Option<AssociateHook>,
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }

    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn migrate(mut self, migrate: MigrateMode) -> Self {
        self.migrate = Some(migrate);
        self
    }

    pub fn timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = Some(enabled);
        self
    }

    pub fn class_method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&Model, JsonValue) -> ModelResult<JsonValue> + Send + Sync + 'static,
    {
        self.class_methods.insert(name.into(), Arc::new(method));
        self
    }

    pub fn instance_method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&ModelInstance, JsonValue) -> ModelResult<JsonValue> + Send + Sync + 'static,
    {
        self.instance_methods.insert(name.into(), Arc::new(method));
        self
    }

    pub fn associate<F>(mut self, hook: F) -> Self
    where
        F: Fn(&AssociationContext<'_>) -> ModelResult<Vec<Association>> + Send + Sync + 'static,
    {
        self.associate = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("store", &self.store)
            .field("table_name", &self.table_name)
            .field("migrate", &self.migrate)
            .field("timestamps", &self.timestamps)
            .field("class_methods", &self.class_methods.keys().collect::<Vec<_>>())
            .field("instance_methods", &self.instance_methods.keys().collect::<Vec<_>>())
            .field("associate", &self.associate.is_some())
            .finish()
    }
}

/// A framework-level model: a schema plus its config block
pub trait AppModel: Send + Sync {
    fn schema(&self) -> ModelSchema;

    fn config(&self) -> ModelConfig {
        ModelConfig::default()
    }
}

/// An [`AppModel`] built from values
#[derive(Debug, Clone)]
pub struct StaticModel {
    pub schema: ModelSchema,
    pub config: ModelConfig,
}

impl AppModel for StaticModel {
    fn schema(&self) -> ModelSchema {
        self.schema.clone()
    }

    fn config(&self) -> ModelConfig {
        self.config.clone()
    }
}

/// Models known to the application, keyed by global id
#[derive(Clone, Default)]
pub struct ModelCatalog {
    models: BTreeMap<String, Arc<dyn AppModel>>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<M: AppModel + 'static>(&mut self, global_id: impl Into<String>, model: M) {
        self.models.insert(global_id.into(), Arc::new(model));
    }

    /// Register a model from a schema and config
    pub fn define(mut self, global_id: impl Into<String>, schema: ModelSchema, config: ModelConfig) -> Self {
        self.register(global_id, StaticModel { schema, config });
        self
    }

    pub fn get(&self, global_id: &str) -> Option<&Arc<dyn AppModel>> {
        self.models.get(global_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn AppModel>)> {
        self.models.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl fmt::Debug for ModelCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelCatalog")
            .field("models", &self.models.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Everything needed to bind one model to its store
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    /// Lower-cased global id
    pub identity: String,
    pub global_id: String,
    pub table_name: String,
    /// Store the model binds to; `None` never matches a connection
    pub connection: Option<String>,
    pub migrate: MigrateMode,
    pub schema: ModelSchema,
    pub config: ModelConfig,
}

impl ModelDescriptor {
    /// Compose the ORM definition: schema plus behavior tables
    pub fn to_definition(&self) -> ModelDefinition {
        let mut builder = ModelDefinition::builder(self.global_id.clone(), self.schema.clone())
            .table_name(self.table_name.clone())
            .class_methods(self.config.class_methods.clone())
            .instance_methods(self.config.instance_methods.clone())
            .associate_hook(self.config.associate.clone());
        if let Some(timestamps) = self.config.timestamps {
            builder = builder.timestamps(timestamps);
        }
        builder.build()
    }
}

/// Build one descriptor per catalog model
pub fn transform_models(config: &DatabaseConfig, catalog: &ModelCatalog) -> BTreeMap<String, ModelDescriptor> {
    catalog
        .iter()
        .map(|(global_id, model)| {
            let model_config = model.config();
            let identity = global_id.to_lowercase();
            let descriptor = ModelDescriptor {
                table_name: model_config
                    .table_name
                    .clone()
                    .unwrap_or_else(|| identity.clone()),
                connection: model_config
                    .store
                    .clone()
                    .or_else(|| config.models.default_store.clone()),
                migrate: model_config.migrate.unwrap_or(config.models.migrate),
                identity,
                global_id: global_id.to_string(),
                schema: model.schema(),
                config: model_config,
            };
            (global_id.to_string(), descriptor)
        })
        .collect()
}

/// Opens a connection for a configured store
pub trait ConnectionFactory: Send + Sync {
    fn connect(&self, name: &str, store: &StoreConfig) -> Result<Arc<dyn DatabaseConnection>, DatastoreError>;
}

/// Lazily connected PostgreSQL pools
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresConnectionFactory;

impl ConnectionFactory for PostgresConnectionFactory {
    fn connect(&self, name: &str, store: &StoreConfig) -> Result<Arc<dyn DatabaseConnection>, DatastoreError> {
        let backend = store.backend().map_err(|message| DatastoreError::Store {
            store: name.to_string(),
            message,
        })?;
        if backend != DatabaseBackendType::PostgreSQL {
            return Err(DatastoreError::Store {
                store: name.to_string(),
                message: format!("backend '{}' is not supported", backend),
            });
        }

        let url = store.connection_url(name)?;
        let connection = PostgresConnection::connect_lazy(name, &url, &store.pool)?;
        Ok(Arc::new(connection))
    }
}

/// Close every connection concurrently, pairing each store with its outcome
pub(crate) async fn close_all(connections: Connections) -> Vec<(String, ModelResult<()>)> {
    let closes = connections
        .into_iter()
        .map(|(name, connection)| async move {
            let result = connection.close().await;
            (name, result)
        });
    join_all(closes).await
}

/// Open one connection per configured store.
///
/// If a store fails to open, the ones already opened are closed before the
/// error is returned.
pub async fn transform_stores(
    config: &DatabaseConfig,
    factory: &dyn ConnectionFactory,
) -> Result<Connections, DatastoreError> {
    let mut connections = Connections::new();
    for (name, store) in &config.stores {
        let connection = match factory.connect(name, store) {
            Ok(connection) => connection,
            Err(e) => {
                if !connections.is_empty() {
                    tracing::warn!(
                        "Store '{}' failed to open; closing {} store(s) already opened",
                        name,
                        connections.len()
                    );
                    for (opened, result) in close_all(connections).await {
                        if let Err(close_err) = result {
                            tracing::warn!("Failed to close store '{}': {}", opened, close_err);
                        }
                    }
                }
                return Err(e);
            }
        };
        tracing::debug!("Store '{}' ready ({})", name, connection.backend());
        connections.insert(name.clone(), connection);
    }
    Ok(connections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelsConfig;
    use elif_orm::{FieldDefinition, FieldType};

    fn schema() -> ModelSchema {
        ModelSchema::new().field(FieldDefinition::new("name", FieldType::Text))
    }

    fn config(default_store: Option<&str>, migrate: MigrateMode) -> DatabaseConfig {
        DatabaseConfig {
            models: ModelsConfig {
                default_store: default_store.map(str::to_string),
                migrate,
            },
            ..DatabaseConfig::default()
        }
    }

    #[test]
    fn test_transform_models() {
        let catalog = ModelCatalog::new()
            .define("BlogPost", schema(), ModelConfig::new().store("blog"))
            .define(
                "User",
                schema(),
                ModelConfig::new().table_name("accounts").migrate(MigrateMode::None),
            );

        let descriptors = transform_models(&config(Some("main"), MigrateMode::Drop), &catalog);

        let post = &descriptors["BlogPost"];
        assert_eq!(post.identity, "blogpost");
        assert_eq!(post.global_id, "BlogPost");
        assert_eq!(post.table_name, "blogpost");
        assert_eq!(post.connection.as_deref(), Some("blog"));
        assert_eq!(post.migrate, MigrateMode::Drop);

        let user = &descriptors["User"];
        assert_eq!(user.table_name, "accounts");
        assert_eq!(user.connection.as_deref(), Some("main"));
        assert_eq!(user.migrate, MigrateMode::None);
    }

    #[test]
    fn test_model_without_store_has_no_connection() {
        let catalog = ModelCatalog::new().define("Orphan", schema(), ModelConfig::new());
        let descriptors = transform_models(&config(None, MigrateMode::Alter), &catalog);
        assert!(descriptors["Orphan"].connection.is_none());
    }

    #[test]
    fn test_descriptor_definition_carries_behavior() {
        let catalog = ModelCatalog::new().define(
            "User",
            schema(),
            ModelConfig::new()
                .timestamps(false)
                .class_method("tableName", |_model, _args| Ok(serde_json::json!("overridden")))
                .instance_method("shout", |_instance, args| Ok(args)),
        );
        let descriptors = transform_models(&config(Some("main"), MigrateMode::Alter), &catalog);

        let definition = descriptors["User"].to_definition();
        assert_eq!(definition.name(), "User");
        assert!(!definition.options().timestamps);
        assert!(definition.has_instance_method("shout"));
        assert!(definition.has_instance_method("toJSON"));

        let model = Model::bind(definition, "main").unwrap();
        assert_eq!(
            model.call("tableName", JsonValue::Null).unwrap(),
            serde_json::json!("overridden")
        );
    }

    #[test]
    fn test_postgres_factory_rejects_other_backends() {
        let store = StoreConfig {
            uri: Some("mysql://localhost/app".to_string()),
            ..StoreConfig::default()
        };
        assert!(matches!(
            PostgresConnectionFactory.connect("main", &store),
            Err(DatastoreError::Store { .. })
        ));
    }
}
