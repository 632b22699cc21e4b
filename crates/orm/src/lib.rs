//! # elif-orm: Database Layer for elif.rs
//!
//! Model definitions are composed up front (schema plus behavior tables),
//! bound to a named connection, wired to each other through associations
//! and frozen into an immutable [`ModelRegistry`]. Connections own schema
//! sync and shutdown.

pub mod backends;
pub mod connection;
pub mod error;
pub mod migrations;
pub mod model;
pub mod registry;
pub mod relationships;
pub mod schema;
pub mod security;

// Re-export core traits and types
pub use backends::DatabaseBackendType;
pub use connection::*;
pub use error::*;
pub use migrations::{sync_statements, SchemaBuilder, SyncOptions, TableBuilder};
pub use model::*;
pub use registry::*;
pub use relationships::*;
pub use schema::*;
