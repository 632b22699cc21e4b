//! # elif-datastore
//!
//! Lifecycle pack that wires the elif ORM into an application: it validates
//! the `database` config section, fills in failsafe defaults, opens one
//! connection per store, binds the application's models to their stores,
//! runs the configured startup migration and closes every connection on
//! unload.
//!
//! ```no_run
//! use elif_core::{AppConfig, Application, PluginLifecycleManager};
//! use elif_datastore::{DatastorePack, ModelCatalog, ModelConfig};
//! use elif_orm::{FieldDefinition, FieldType, ModelSchema};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = ModelCatalog::new().define(
//!     "User",
//!     ModelSchema::new().field(FieldDefinition::new("email", FieldType::Text)),
//!     ModelConfig::new().store("main"),
//! );
//! let pack = DatastorePack::new(catalog);
//! let orm = pack.handle();
//!
//! let config = AppConfig::from_yaml_str(
//!     "database:\n  stores:\n    main:\n      uri: postgres://localhost/app\n",
//! )?;
//! let mut app = Application::new("blog", config);
//!
//! let mut lifecycle = PluginLifecycleManager::new();
//! lifecycle.register(pack);
//! lifecycle.start(&mut app).await?;
//!
//! let user = orm.model("User");
//! # let _ = user;
//! lifecycle.stop(&app).await?;
//! # Ok(())
//! # }
//! ```

pub mod binding;
pub mod config;
pub mod error;
pub mod migration;
pub mod pack;
pub mod transformer;
pub mod validator;

pub use binding::bind_models;
pub use config::{failsafe_config, DatabaseConfig, MigrateMode, ModelsConfig, StoreConfig};
pub use error::DatastoreError;
pub use migration::{migrate, MigrationService, SchemaMigrationService};
pub use pack::{DatastorePack, OrmHandle, ShutdownReport, ORM_NAME, PLUGIN_NAME};
pub use transformer::{
    transform_models, transform_stores, AppModel, ConnectionFactory, Connections, ModelCatalog,
    ModelConfig, ModelDescriptor, PostgresConnectionFactory, StaticModel,
};
pub use validator::{validate_database_config, DatabaseConfigValidator};
