use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::cluster::{SegmentId, ServerId};
use crate::error::{RoutingError, RoutingResult};

/// Server -> segments it must answer for, for one query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoutingTable {
    servers: BTreeMap<ServerId, BTreeSet<SegmentId>>,
    #[serde(skip)]
    owners: BTreeMap<SegmentId, ServerId>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a segment to a server. A segment may only be assigned once.
    pub fn assign(&mut self, server: &str, segment: &str) -> RoutingResult<()> {
        if let Some(owner) = self.owners.get(segment) {
            return Err(RoutingError::InvariantViolation(format!(
                "segment {} assigned to both {} and {}",
                segment, owner, server
            )));
        }

        self.owners.insert(segment.to_string(), server.to_string());
        self.servers
            .entry(server.to_string())
            .or_default()
            .insert(segment.to_string());
        Ok(())
    }

    pub fn segments_for(&self, server: &str) -> Option<&BTreeSet<SegmentId>> {
        self.servers.get(server)
    }

    /// Number of segments currently assigned to the server
    pub fn segment_count(&self, server: &str) -> usize {
        self.servers.get(server).map(BTreeSet::len).unwrap_or(0)
    }

    pub fn server_for(&self, segment: &str) -> Option<&str> {
        self.owners.get(segment).map(String::as_str)
    }

    pub fn servers(&self) -> impl Iterator<Item = (&str, &BTreeSet<SegmentId>)> {
        self.servers.iter().map(|(server, segments)| (server.as_str(), segments))
    }

    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    pub fn assigned_segment_count(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Owned map form handed to the query router
    pub fn into_server_map(self) -> BTreeMap<ServerId, BTreeSet<SegmentId>> {
        self.servers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_and_lookup() {
        let mut table = RoutingTable::new();
        table.assign("s1", "seg_a").unwrap();
        table.assign("s1", "seg_b").unwrap();
        table.assign("s2", "seg_c").unwrap();

        assert_eq!(table.server_count(), 2);
        assert_eq!(table.assigned_segment_count(), 3);
        assert_eq!(table.segment_count("s1"), 2);
        assert_eq!(table.segment_count("s3"), 0);
        assert_eq!(table.server_for("seg_c"), Some("s2"));
    }

    #[test]
    fn test_double_assignment_rejected() {
        let mut table = RoutingTable::new();
        table.assign("s1", "seg_a").unwrap();

        let err = table.assign("s2", "seg_a").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(table.server_for("seg_a"), Some("s1"));
        assert!(table.segments_for("s2").is_none());
    }

    #[test]
    fn test_serializes_server_map_only() {
        let mut table = RoutingTable::new();
        table.assign("s1", "seg_a").unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json, serde_json::json!({"servers": {"s1": ["seg_a"]}}));
    }
}
