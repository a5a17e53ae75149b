//! Instance pruning for routing
//!
//! Servers that are disabled or shutting down keep reporting segment
//! states in the external view for a while; they must not receive queries.

use std::collections::{HashMap, HashSet};
use std::fmt;

use super::node::InstanceConfig;

/// Health predicate consulted when computing eligible replicas
pub trait ServerFilter: Send + Sync {
    /// Returns true when the server must not be routed to
    fn is_inactive(&self, server: &str) -> bool;
}

/// Accepts every server
#[derive(Debug, Clone, Copy, Default)]
pub struct AllServersActive;

impl ServerFilter for AllServersActive {
    fn is_inactive(&self, _server: &str) -> bool {
        false
    }
}

/// Prunes an explicit set of servers
#[derive(Debug, Clone, Default)]
pub struct ExcludedServers(pub HashSet<String>);

impl ServerFilter for ExcludedServers {
    fn is_inactive(&self, server: &str) -> bool {
        self.0.contains(server)
    }
}

/// Prunes instances based on their published configuration
#[derive(Clone, Default)]
pub struct InstancePruner {
    /// instance id -> active
    instances: HashMap<String, bool>,
}

impl InstancePruner {
    pub fn new(instance_configs: &[InstanceConfig]) -> Self {
        let instances = instance_configs
            .iter()
            .map(|config| {
                let active = config.enabled && !config.shutdown_in_progress;
                (config.instance_id.clone(), active)
            })
            .collect();

        Self { instances }
    }

    /// Servers known to be pruned
    pub fn inactive_servers(&self) -> Vec<String> {
        let mut servers: Vec<String> = self
            .instances
            .iter()
            .filter(|(_, active)| !**active)
            .map(|(id, _)| id.clone())
            .collect();
        servers.sort();
        servers
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl ServerFilter for InstancePruner {
    fn is_inactive(&self, server: &str) -> bool {
        // The external view is authoritative for membership; unknown servers stay routable
        self.instances
            .get(server)
            .map(|active| !active)
            .unwrap_or(false)
    }
}

impl fmt::Debug for InstancePruner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstancePruner")
            .field("instances", &self.instances.len())
            .field("inactive", &self.inactive_servers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_instance_is_active() {
        let pruner = InstancePruner::new(&[InstanceConfig::new("server_1")]);
        assert!(!pruner.is_inactive("server_1"));
    }

    #[test]
    fn test_disabled_and_shutting_down_are_pruned() {
        let pruner = InstancePruner::new(&[
            InstanceConfig::disabled("server_1"),
            InstanceConfig::shutting_down("server_2"),
            InstanceConfig::new("server_3"),
        ]);

        assert!(pruner.is_inactive("server_1"));
        assert!(pruner.is_inactive("server_2"));
        assert!(!pruner.is_inactive("server_3"));
        assert_eq!(pruner.inactive_servers(), vec!["server_1", "server_2"]);
    }

    #[test]
    fn test_unknown_instance_is_not_pruned() {
        let pruner = InstancePruner::new(&[]);
        assert!(pruner.is_empty());
        assert!(!pruner.is_inactive("server_9"));
    }

    #[test]
    fn test_excluded_servers_filter() {
        let filter = ExcludedServers(["server_down".to_string()].into_iter().collect());
        assert!(filter.is_inactive("server_down"));
        assert!(!filter.is_inactive("server_up"));
        assert!(!AllServersActive.is_inactive("server_down"));
    }
}
