//! Configuration for routing table generation
//!
//! Loaded from an optional TOML file.
//!
//! ## Environment Variables
//!
//! - `REALTIME_ROUTING_TABLE_COUNT` - Number of routing tables per pool
//! - `REALTIME_ROUTING_SEED` - Fixed seed for reproducible pools

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{RoutingError, RoutingResult};

/// Number of routing tables generated per computation when not configured
pub const DEFAULT_ROUTING_TABLE_COUNT: usize = 500;

/// Environment variable names
pub const ENV_TABLE_COUNT: &str = "REALTIME_ROUTING_TABLE_COUNT";
pub const ENV_SEED: &str = "REALTIME_ROUTING_SEED";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Size of the routing table pool
    #[serde(default = "default_routing_table_count")]
    pub routing_table_count: usize,
    /// Generate tables on the rayon thread pool
    #[serde(default)]
    pub parallel: bool,
    /// Seed for the pool generator; entropy-seeded when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_routing_table_count() -> usize {
    DEFAULT_ROUTING_TABLE_COUNT
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            routing_table_count: DEFAULT_ROUTING_TABLE_COUNT,
            parallel: false,
            seed: None,
        }
    }
}

impl RoutingConfig {
    pub fn with_table_count(routing_table_count: usize) -> Self {
        Self {
            routing_table_count,
            ..Self::default()
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> RoutingResult<Self> {
        let config: RoutingConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from a TOML file and apply environment overrides
    pub fn load(path: &Path) -> RoutingResult<Self> {
        if !path.exists() {
            return Err(RoutingError::InvalidConfig(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides()?;

        tracing::debug!("Loaded routing config from {}", path.display());
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    pub fn apply_env_overrides(&mut self) -> RoutingResult<()> {
        if let Ok(count) = std::env::var(ENV_TABLE_COUNT) {
            if !count.is_empty() {
                self.routing_table_count = count.trim().parse().map_err(|_| {
                    RoutingError::InvalidConfig(format!("{} is not a count: {}", ENV_TABLE_COUNT, count))
                })?;
            }
        }

        if let Ok(seed) = std::env::var(ENV_SEED) {
            if !seed.is_empty() {
                self.seed = Some(seed.trim().parse().map_err(|_| {
                    RoutingError::InvalidConfig(format!("{} is not a u64: {}", ENV_SEED, seed))
                })?);
            }
        }

        Ok(())
    }
}
