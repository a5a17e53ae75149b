use serde::{Deserialize, Serialize};

use super::state::ServerId;

/// Instance configuration as published by the cluster manager
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstanceConfig {
    pub instance_id: ServerId,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub shutdown_in_progress: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

impl InstanceConfig {
    pub fn new(instance_id: impl Into<ServerId>) -> Self {
        Self {
            instance_id: instance_id.into(),
            enabled: true,
            shutdown_in_progress: false,
            tags: Vec::new(),
        }
    }

    pub fn disabled(instance_id: impl Into<ServerId>) -> Self {
        Self {
            enabled: false,
            ..Self::new(instance_id)
        }
    }

    pub fn shutting_down(instance_id: impl Into<ServerId>) -> Self {
        Self {
            shutdown_in_progress: true,
            ..Self::new(instance_id)
        }
    }

    /// Parse a JSON array of instance configs
    pub fn list_from_json_str(content: &str) -> crate::error::RoutingResult<Vec<Self>> {
        Ok(serde_json::from_str(content)?)
    }
}
