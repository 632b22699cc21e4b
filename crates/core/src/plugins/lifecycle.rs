use std::time::{Duration, Instant};

use crate::application::Application;
use crate::foundation::LifecycleState;
use crate::plugins::{Plugin, PluginError, PluginMetadata};

/// Drives registered plugins through validate, configure, initialize and unload
pub struct PluginLifecycleManager {
    plugins: Vec<Box<dyn Plugin>>,
    state: LifecycleState,
    lifecycle_stats: PluginLifecycleStats,
}

impl PluginLifecycleManager {
    /// Create a new plugin lifecycle manager
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            state: LifecycleState::Created,
            lifecycle_stats: PluginLifecycleStats::new(),
        }
    }

    /// Register a plugin. Plugins run in registration order.
    pub fn register<P: Plugin + 'static>(&mut self, plugin: P) {
        self.plugins.push(Box::new(plugin));
    }

    /// Execute the startup phases for every plugin
    pub async fn start(&mut self, app: &mut Application) -> Result<(), PluginError> {
        if !self.state.can_start() {
            return Err(PluginError::InvalidState {
                operation: "start".to_string(),
                state: self.state.to_string(),
            });
        }

        let start_time = Instant::now();
        tracing::info!("Starting plugin lifecycle with {} plugins", self.plugins.len());

        let result = self.run_startup(app).await;
        if let Err(e) = &result {
            tracing::error!("Plugin lifecycle failed: {}", e);
            self.state = LifecycleState::Failed;
            return result;
        }

        self.lifecycle_stats.total_time = start_time.elapsed();
        self.lifecycle_stats.plugin_count = self.plugins.len();
        self.state = LifecycleState::Running;

        tracing::info!(
            "Plugin lifecycle completed successfully in {:?} with {} plugins",
            self.lifecycle_stats.total_time,
            self.lifecycle_stats.plugin_count
        );
        Ok(())
    }

    async fn run_startup(&mut self, app: &mut Application) -> Result<(), PluginError> {
        let validate_start = Instant::now();
        for plugin in &self.plugins {
            tracing::debug!("Validating plugin '{}'", plugin.name());
            plugin.validate(app).await?;
        }
        self.lifecycle_stats.validate_time = validate_start.elapsed();
        self.state = LifecycleState::Validated;

        let configure_start = Instant::now();
        for plugin in &mut self.plugins {
            tracing::debug!("Configuring plugin '{}'", plugin.name());
            plugin.configure(app)?;
        }
        self.lifecycle_stats.configure_time = configure_start.elapsed();
        self.state = LifecycleState::Configured;

        let initialize_start = Instant::now();
        for plugin in &mut self.plugins {
            tracing::debug!("Initializing plugin '{}'", plugin.name());
            plugin.initialize(app).await?;
        }
        self.lifecycle_stats.initialize_time = initialize_start.elapsed();
        Ok(())
    }

    /// Unload every plugin in reverse registration order.
    ///
    /// Every plugin is unloaded even if an earlier one fails; the first
    /// failure is returned.
    pub async fn stop(&mut self, app: &Application) -> Result<(), PluginError> {
        self.state = LifecycleState::Stopping;
        let unload_start = Instant::now();
        let mut first_error = None;

        for plugin in self.plugins.iter_mut().rev() {
            tracing::debug!("Unloading plugin '{}'", plugin.name());
            if let Err(e) = plugin.unload(app).await {
                tracing::warn!("Plugin '{}' failed to unload: {}", plugin.name(), e);
                first_error.get_or_insert(e);
            }
        }

        self.lifecycle_stats.unload_time = unload_start.elapsed();
        self.state = LifecycleState::Stopped;

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Get lifecycle statistics
    pub fn lifecycle_stats(&self) -> &PluginLifecycleStats {
        &self.lifecycle_stats
    }

    /// Metadata for every registered plugin, in registration order
    pub fn plugin_metadata(&self) -> Vec<PluginMetadata> {
        self.plugins
            .iter()
            .map(|p| PluginMetadata::from_plugin(p.as_ref()))
            .collect()
    }
}

impl Default for PluginLifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics for plugin lifecycle execution
#[derive(Debug, Clone, Default)]
pub struct PluginLifecycleStats {
    pub plugin_count: usize,
    pub total_time: Duration,
    pub validate_time: Duration,
    pub configure_time: Duration,
    pub initialize_time: Duration,
    pub unload_time: Duration,
}

impl PluginLifecycleStats {
    /// Create new lifecycle stats
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, ConfigError};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct RecordingPlugin {
        name: &'static str,
        events: Arc<Mutex<Vec<String>>>,
        fail_validation: bool,
    }

    impl RecordingPlugin {
        fn new(name: &'static str, events: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name,
                events,
                fail_validation: false,
            }
        }

        fn record(&self, phase: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{}:{}", phase, self.name));
        }
    }

    #[async_trait]
    impl Plugin for RecordingPlugin {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn validate(&self, _app: &Application) -> Result<(), PluginError> {
            self.record("validate");
            if self.fail_validation {
                return Err(PluginError::ValidationFailed {
                    plugin: self.name.to_string(),
                    source: ConfigError::validation_failed("rejected"),
                });
            }
            Ok(())
        }

        fn configure(&mut self, app: &mut Application) -> Result<(), PluginError> {
            self.record("configure");
            app.config.set(&format!("plugins.{}", self.name), true);
            Ok(())
        }

        async fn initialize(&mut self, _app: &Application) -> Result<(), PluginError> {
            self.record("initialize");
            Ok(())
        }

        async fn unload(&mut self, _app: &Application) -> Result<(), PluginError> {
            self.record("unload");
            Ok(())
        }
    }

    fn app() -> Application {
        Application::new("test", AppConfig::new())
    }

    #[tokio::test]
    async fn test_phases_run_in_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut manager = PluginLifecycleManager::new();
        manager.register(RecordingPlugin::new("a", events.clone()));
        manager.register(RecordingPlugin::new("b", events.clone()));

        let mut app = app();
        manager.start(&mut app).await.unwrap();
        assert!(manager.state().is_running());
        assert_eq!(manager.lifecycle_stats().plugin_count, 2);
        assert!(app.config.contains("plugins.a"));

        manager.stop(&app).await.unwrap();
        assert_eq!(manager.state(), LifecycleState::Stopped);

        let events = events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "validate:a",
                "validate:b",
                "configure:a",
                "configure:b",
                "initialize:a",
                "initialize:b",
                "unload:b",
                "unload:a",
            ]
        );
    }

    #[tokio::test]
    async fn test_validation_failure_stops_startup() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut failing = RecordingPlugin::new("bad", events.clone());
        failing.fail_validation = true;

        let mut manager = PluginLifecycleManager::new();
        manager.register(failing);

        let mut app = app();
        let err = manager.start(&mut app).await.unwrap_err();
        assert_eq!(err.plugin(), Some("bad"));
        assert_eq!(manager.state(), LifecycleState::Failed);
        assert_eq!(*events.lock().unwrap(), vec!["validate:bad"]);

        let err = manager.start(&mut app).await.unwrap_err();
        assert!(matches!(err, PluginError::InvalidState { .. }));
    }
}
