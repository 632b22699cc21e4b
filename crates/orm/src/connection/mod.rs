//! Connection Management
//!
//! A [`DatabaseConnection`] is one named store: it binds model definitions,
//! runs schema sync and owns the pool that [`close`](DatabaseConnection::close)
//! releases.

pub mod pool;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::backends::DatabaseBackendType;
use crate::error::ModelResult;
use crate::migrations::SyncOptions;
use crate::model::{Model, ModelDefinition};

pub use pool::*;
pub use postgres::*;

/// A named, open database connection
#[async_trait]
pub trait DatabaseConnection: Send + Sync {
    /// Store name this connection was created for
    fn name(&self) -> &str;

    fn backend(&self) -> DatabaseBackendType;

    /// Bind a model definition to this connection
    fn define(&self, definition: ModelDefinition) -> ModelResult<Model> {
        Model::bind(definition, self.name())
    }

    /// Bring the database schema in line with `models`
    async fn sync(&self, models: &[Arc<Model>], options: SyncOptions) -> ModelResult<()>;

    /// Release every pooled connection
    async fn close(&self) -> ModelResult<()>;
}
