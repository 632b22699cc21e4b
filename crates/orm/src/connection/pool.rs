//! Connection pool configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;

/// Connection pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// Seconds
    pub acquire_timeout: u64,
    /// Seconds
    pub idle_timeout: Option<u64>,
    /// Seconds
    pub max_lifetime: Option<u64>,
    pub test_before_acquire: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: 30,
            idle_timeout: Some(600),
            max_lifetime: Some(1800),
            test_before_acquire: true,
        }
    }
}

impl PoolConfig {
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_min_connections(mut self, min_connections: u32) -> Self {
        self.min_connections = min_connections;
        self
    }

    pub fn with_acquire_timeout(mut self, timeout_seconds: u64) -> Self {
        self.acquire_timeout = timeout_seconds;
        self
    }

    /// sqlx pool options for this configuration
    pub fn pg_pool_options(&self) -> PgPoolOptions {
        let mut options = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout))
            .test_before_acquire(self.test_before_acquire);

        if let Some(idle_timeout) = self.idle_timeout {
            options = options.idle_timeout(Duration::from_secs(idle_timeout));
        }

        if let Some(max_lifetime) = self.max_lifetime {
            options = options.max_lifetime(Duration::from_secs(max_lifetime));
        }
        options
    }
}
