pub mod application;
pub mod config;
pub mod errors;
pub mod foundation;
pub mod logging;
pub mod plugins;

// Re-export key types for convenience
pub use application::Application;
pub use config::{AppConfig, ConfigError, ConfigValidator, Environment};
pub use errors::CoreError;
pub use foundation::LifecycleState;
pub use logging::{init_logging, LoggingConfig};
pub use plugins::{Plugin, PluginError, PluginLifecycleManager, PluginMetadata};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Framework information
pub const FRAMEWORK_NAME: &str = "elif.rs";

/// Get framework version
pub fn version() -> &'static str {
    VERSION
}

/// Get framework name
pub fn name() -> &'static str {
    FRAMEWORK_NAME
}
