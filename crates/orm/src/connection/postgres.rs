//! PostgreSQL connection backed by a sqlx pool

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::backends::DatabaseBackendType;
use crate::connection::{DatabaseConnection, PoolConfig};
use crate::error::{ModelError, ModelResult};
use crate::migrations::{sync_statements, SyncOptions};
use crate::model::Model;

pub struct PostgresConnection {
    name: String,
    pool: Pool<Postgres>,
    config: PoolConfig,
}

impl PostgresConnection {
    /// Create the pool without opening a connection yet
    pub fn connect_lazy(name: &str, database_url: &str, config: &PoolConfig) -> ModelResult<Self> {
        tracing::debug!(
            "Creating lazy pool for store '{}': max={}, min={}, timeout={}s",
            name,
            config.max_connections,
            config.min_connections,
            config.acquire_timeout
        );

        let pool = config
            .pg_pool_options()
            .connect_lazy(database_url)
            .map_err(|e| {
                ModelError::Connection(format!("Failed to create pool for store '{}': {}", name, e))
            })?;

        Ok(Self {
            name: name.to_string(),
            pool,
            config: config.clone(),
        })
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}

#[async_trait]
impl DatabaseConnection for PostgresConnection {
    fn name(&self) -> &str {
        &self.name
    }

    fn backend(&self) -> DatabaseBackendType {
        DatabaseBackendType::PostgreSQL
    }

    async fn sync(&self, models: &[Arc<Model>], options: SyncOptions) -> ModelResult<()> {
        let statements = sync_statements(models, options);
        if statements.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            ModelError::Migration(format!("Store '{}': failed to begin sync: {}", self.name, e))
        })?;

        for statement in &statements {
            tracing::debug!("Store '{}': {}", self.name, statement);
            sqlx::query(statement.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    ModelError::Migration(format!("Store '{}': {}: {}", self.name, statement, e))
                })?;
        }

        tx.commit().await.map_err(|e| {
            ModelError::Migration(format!("Store '{}': failed to commit sync: {}", self.name, e))
        })?;

        tracing::info!(
            "Store '{}' synced {} model(s) with {} statement(s)",
            self.name,
            models.len(),
            statements.len()
        );
        Ok(())
    }

    async fn close(&self) -> ModelResult<()> {
        self.pool.close().await;
        tracing::debug!("Store '{}' pool closed", self.name);
        Ok(())
    }
}
