//! The datastore lifecycle pack

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use elif_core::{Application, Plugin, PluginError};
use elif_orm::{Model, ModelRegistry};

use crate::binding::bind_models;
use crate::config::{failsafe_config, DatabaseConfig};
use crate::error::DatastoreError;
use crate::migration::{migrate, MigrationService, SchemaMigrationService};
use crate::transformer::{
    close_all, transform_models, transform_stores, ConnectionFactory, Connections, ModelCatalog,
    PostgresConnectionFactory,
};
use crate::validator::validate_database_config;

pub const PLUGIN_NAME: &str = "datastore";

/// Tag written to `database.orm` during configure
pub const ORM_NAME: &str = "elif-orm";

/// Shared access to the registry built by [`DatastorePack::initialize`].
///
/// Cloneable, so it can be handed out before the pack moves into a
/// lifecycle manager. Empty before initialize and after unload.
#[derive(Debug, Clone, Default)]
pub struct OrmHandle {
    registry: Arc<RwLock<Option<Arc<ModelRegistry>>>>,
}

impl OrmHandle {
    pub fn registry(&self) -> Option<Arc<ModelRegistry>> {
        self.registry
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Look up a model by global id
    pub fn model(&self, global_id: &str) -> Option<Arc<Model>> {
        self.registry()?.get(global_id).cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.registry().is_some()
    }

    fn replace(&self, registry: Option<Arc<ModelRegistry>>) {
        *self
            .registry
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = registry;
    }
}

/// Outcome of closing every connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Stores closed cleanly
    pub closed: Vec<String>,
    /// Stores whose close failed, with the error
    pub failed: Vec<(String, String)>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Wires the ORM into the application lifecycle
pub struct DatastorePack {
    catalog: ModelCatalog,
    factory: Arc<dyn ConnectionFactory>,
    migration: Arc<dyn MigrationService>,
    connections: Connections,
    handle: OrmHandle,
    last_shutdown: Option<ShutdownReport>,
}

impl DatastorePack {
    /// A pack over PostgreSQL stores, migrating through schema sync
    pub fn new(catalog: ModelCatalog) -> Self {
        Self {
            catalog,
            factory: Arc::new(PostgresConnectionFactory),
            migration: Arc::new(SchemaMigrationService),
            connections: Connections::new(),
            handle: OrmHandle::default(),
            last_shutdown: None,
        }
    }

    pub fn with_connection_factory(mut self, factory: impl ConnectionFactory + 'static) -> Self {
        self.factory = Arc::new(factory);
        self
    }

    pub fn with_migration_service(mut self, service: impl MigrationService + 'static) -> Self {
        self.migration = Arc::new(service);
        self
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn handle(&self) -> OrmHandle {
        self.handle.clone()
    }

    /// The registry, once initialized
    pub fn registry(&self) -> Option<Arc<ModelRegistry>> {
        self.handle.registry()
    }

    /// Names of the open connections
    pub fn connection_names(&self) -> Vec<String> {
        self.connections.keys().cloned().collect()
    }

    /// Report from the most recent unload
    pub fn last_shutdown(&self) -> Option<&ShutdownReport> {
        self.last_shutdown.as_ref()
    }

    async fn close_connections(&mut self) -> ShutdownReport {
        let connections = std::mem::take(&mut self.connections);

        let mut report = ShutdownReport::default();
        for (name, result) in close_all(connections).await {
            match result {
                Ok(()) => report.closed.push(name),
                Err(e) => {
                    tracing::warn!("Failed to close store '{}': {}", name, e);
                    report.failed.push((name, e.to_string()));
                }
            }
        }
        report
    }
}

#[async_trait]
impl Plugin for DatastorePack {
    fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    async fn validate(&self, app: &Application) -> Result<(), PluginError> {
        let has_stores = app
            .config
            .get("database.stores")
            .and_then(|stores| stores.as_object())
            .map(|stores| !stores.is_empty())
            .unwrap_or(false);
        if !has_stores {
            tracing::warn!("No store is configured under database.stores; no model will be loaded");
        }

        validate_database_config(app.config.get("database")).map_err(|source| {
            PluginError::ValidationFailed {
                plugin: PLUGIN_NAME.to_string(),
                source,
            }
        })?;
        Ok(())
    }

    fn configure(&mut self, app: &mut Application) -> Result<(), PluginError> {
        app.config.set("database.orm", ORM_NAME);
        app.config.merge_defaults(&failsafe_config());
        Ok(())
    }

    async fn initialize(&mut self, app: &Application) -> Result<(), PluginError> {
        let config = DatabaseConfig::from_app(&app.config)?;

        if !self.connections.is_empty() {
            tracing::warn!(
                "Datastore initialized again without unload; closing {} open store(s)",
                self.connections.len()
            );
            self.handle.replace(None);
            let report = self.close_connections().await;
            self.last_shutdown = Some(report);
        }

        let connections = transform_stores(&config, self.factory.as_ref()).await?;
        let descriptors = transform_models(&config, &self.catalog);
        self.connections = connections;

        let registry = Arc::new(
            bind_models(&descriptors, &self.connections).map_err(DatastoreError::from)?,
        );
        self.handle.replace(Some(Arc::clone(&registry)));

        migrate(
            config.models.migrate,
            &self.connections,
            &registry,
            &descriptors,
            self.migration.as_ref(),
        )
        .await?;

        tracing::info!(
            "Datastore ready: {} model(s) on {} store(s)",
            registry.len(),
            self.connections.len()
        );
        Ok(())
    }

    async fn unload(&mut self, _app: &Application) -> Result<(), PluginError> {
        let report = self.close_connections().await;
        self.handle.replace(None);

        tracing::info!(
            "Datastore unloaded: {} store(s) closed, {} failed",
            report.closed.len(),
            report.failed.len()
        );
        self.last_shutdown = Some(report);
        Ok(())
    }

    fn version(&self) -> Option<&'static str> {
        Some(env!("CARGO_PKG_VERSION"))
    }

    fn description(&self) -> Option<&'static str> {
        Some("Binds models to configured stores and manages their schema and connections")
    }
}
