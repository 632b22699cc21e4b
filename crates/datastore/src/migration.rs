//! Startup migration: fan the configured mode out over every store

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use elif_orm::{DatabaseConnection, Model, ModelRegistry, ModelResult, SyncOptions};
use futures::future::try_join_all;

use crate::config::MigrateMode;
use crate::error::DatastoreError;
use crate::transformer::{Connections, ModelDescriptor};

/// Performs the schema work for one store
#[async_trait]
pub trait MigrationService: Send + Sync {
    /// Drop and recreate the tables of `models`
    async fn drop_db(&self, connection: &dyn DatabaseConnection, models: &[Arc<Model>]) -> ModelResult<()>;

    /// Create missing tables and columns for `models`
    async fn alter_db(&self, connection: &dyn DatabaseConnection, models: &[Arc<Model>]) -> ModelResult<()>;
}

/// Delegates to the connection's schema sync
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaMigrationService;

#[async_trait]
impl MigrationService for SchemaMigrationService {
    async fn drop_db(&self, connection: &dyn DatabaseConnection, models: &[Arc<Model>]) -> ModelResult<()> {
        connection.sync(models, SyncOptions::force()).await
    }

    async fn alter_db(&self, connection: &dyn DatabaseConnection, models: &[Arc<Model>]) -> ModelResult<()> {
        connection.sync(models, SyncOptions::alter()).await
    }
}

/// Run the migration mode against every connection concurrently.
///
/// `none` makes no calls. Models whose own mode is `none` are left out of
/// the model list handed to the service. The first failure fails the whole
/// step.
pub async fn migrate(
    mode: MigrateMode,
    connections: &Connections,
    registry: &ModelRegistry,
    descriptors: &BTreeMap<String, ModelDescriptor>,
    service: &dyn MigrationService,
) -> Result<(), DatastoreError> {
    if mode == MigrateMode::None {
        tracing::debug!("Migration mode is 'none'; schema left untouched");
        return Ok(());
    }

    tracing::info!(
        "Running '{}' migration on {} store(s)",
        mode,
        connections.len()
    );

    let runs = connections.iter().map(|(name, connection)| {
        let models: Vec<Arc<Model>> = registry
            .for_connection(name)
            .into_iter()
            .filter(|model| {
                descriptors
                    .get(model.name())
                    .map(|d| d.migrate != MigrateMode::None)
                    .unwrap_or(true)
            })
            .collect();

        async move {
            let result = match mode {
                MigrateMode::Drop => service.drop_db(connection.as_ref(), &models).await,
                _ => service.alter_db(connection.as_ref(), &models).await,
            };
            result.map_err(|source| DatastoreError::Migration {
                store: name.clone(),
                source,
            })
        }
    });

    try_join_all(runs).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use elif_orm::DatabaseBackendType;
    use std::sync::Mutex;

    struct NamedConnection(&'static str);

    #[async_trait]
    impl DatabaseConnection for NamedConnection {
        fn name(&self) -> &str {
            self.0
        }

        fn backend(&self) -> DatabaseBackendType {
            DatabaseBackendType::PostgreSQL
        }

        async fn sync(&self, _models: &[Arc<Model>], _options: SyncOptions) -> ModelResult<()> {
            Ok(())
        }

        async fn close(&self) -> ModelResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FailingService {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MigrationService for FailingService {
        async fn drop_db(&self, connection: &dyn DatabaseConnection, _models: &[Arc<Model>]) -> ModelResult<()> {
            self.calls.lock().unwrap().push(connection.name().to_string());
            if connection.name() == "broken" {
                return Err(elif_orm::ModelError::Migration("cannot drop".to_string()));
            }
            Ok(())
        }

        async fn alter_db(&self, _connection: &dyn DatabaseConnection, _models: &[Arc<Model>]) -> ModelResult<()> {
            Ok(())
        }
    }

    fn connections(names: &[&'static str]) -> Connections {
        names
            .iter()
            .map(|&name| (name.to_string(), Arc::new(NamedConnection(name)) as Arc<dyn DatabaseConnection>))
            .collect()
    }

    #[tokio::test]
    async fn test_failure_fails_the_step() {
        let service = FailingService::default();
        let result = migrate(
            MigrateMode::Drop,
            &connections(&["broken", "main"]),
            &ModelRegistry::default(),
            &BTreeMap::new(),
            &service,
        )
        .await;

        match result {
            Err(DatastoreError::Migration { store, .. }) => assert_eq!(store, "broken"),
            other => panic!("expected a migration error, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_none_skips_service() {
        let service = FailingService::default();
        migrate(
            MigrateMode::None,
            &connections(&["broken"]),
            &ModelRegistry::default(),
            &BTreeMap::new(),
            &service,
        )
        .await
        .unwrap();
        assert!(service.calls.lock().unwrap().is_empty());
    }
}
