use crate::config::{AppConfig, Environment};

/// The host application handed to every plugin lifecycle hook
#[derive(Debug, Clone)]
pub struct Application {
    pub name: String,
    pub environment: Environment,
    pub config: AppConfig,
}

impl Application {
    /// Create an application in the development environment
    pub fn new(name: impl Into<String>, config: AppConfig) -> Self {
        Self {
            name: name.into(),
            environment: Environment::Development,
            config,
        }
    }

    /// Set the runtime environment
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }
}
