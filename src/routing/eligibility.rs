//! Eligible replicas per segment
//!
//! Computed once per snapshot and shared read-only by every table build.

use std::collections::{BTreeMap, BTreeSet};

use crate::cluster::{ExternalViewSnapshot, SegmentState, ServerFilter, ServerId};

use super::catalog::SegmentCatalog;
use super::consistency::PartitionConsistencyTable;
use super::segment::SegmentDescriptor;

/// Servers allowed to answer for one segment
pub type EligibleReplicaSet = BTreeSet<ServerId>;

/// Position of a segment inside a [`ReplicaEligibilityIndex`]
pub type SegmentIndex = usize;

#[derive(Debug, Clone, Default)]
pub struct ReplicaEligibilityIndex {
    segments: Vec<SegmentDescriptor>,
    replicas: Vec<EligibleReplicaSet>,
    by_name: BTreeMap<String, SegmentIndex>,
    segments_by_server: BTreeMap<ServerId, Vec<SegmentIndex>>,
}

impl ReplicaEligibilityIndex {
    pub fn build(
        catalog: &SegmentCatalog,
        snapshot: &ExternalViewSnapshot,
        consistency: &PartitionConsistencyTable,
        filter: &dyn ServerFilter,
    ) -> Self {
        let mut index = Self::default();

        for segment in catalog.segments() {
            let is_designee = consistency.is_designee(segment);
            let mut eligible = EligibleReplicaSet::new();

            for (server, state) in snapshot.state_map(segment.segment_name()) {
                // Skip pruned replicas (shutting down or otherwise disabled)
                if filter.is_inactive(server) {
                    continue;
                }

                let allowed = match state {
                    SegmentState::Online => true,
                    SegmentState::Consuming => is_designee,
                    _ => false,
                };

                if allowed {
                    eligible.insert(server.to_string());
                }
            }

            index.push(segment.clone(), eligible);
        }

        index
    }

    fn push(&mut self, segment: SegmentDescriptor, eligible: EligibleReplicaSet) {
        let idx = self.segments.len();
        for server in &eligible {
            self.segments_by_server.entry(server.clone()).or_default().push(idx);
        }
        self.by_name.insert(segment.segment_name().to_string(), idx);
        self.segments.push(segment);
        self.replicas.push(eligible);
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment(&self, idx: SegmentIndex) -> &SegmentDescriptor {
        &self.segments[idx]
    }

    pub fn replicas(&self, idx: SegmentIndex) -> &EligibleReplicaSet {
        &self.replicas[idx]
    }

    /// Eligible replicas for a segment by name; `None` when not catalogued
    pub fn eligible_servers(&self, segment_name: &str) -> Option<&EligibleReplicaSet> {
        self.by_name.get(segment_name).map(|idx| &self.replicas[*idx])
    }

    /// Segments the server is eligible to serve
    pub fn segments_for_server(&self, server: &str) -> &[SegmentIndex] {
        self.segments_by_server
            .get(server)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every server eligible for at least one segment
    pub fn servers(&self) -> impl Iterator<Item = &str> {
        self.segments_by_server.keys().map(String::as_str)
    }

    pub fn routable_segments(&self) -> impl Iterator<Item = SegmentIndex> + '_ {
        (0..self.segments.len()).filter(|idx| !self.replicas[*idx].is_empty())
    }

    /// Segments with no eligible replica in this snapshot
    pub fn unroutable_segments(&self) -> impl Iterator<Item = &SegmentDescriptor> {
        self.segments
            .iter()
            .zip(&self.replicas)
            .filter(|(_, replicas)| replicas.is_empty())
            .map(|(segment, _)| segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{AllServersActive, ExcludedServers, ExternalViewBuilder};
    use crate::routing::consistency::PartitionConsistencyResolver;

    fn build(snapshot: &ExternalViewSnapshot, filter: &dyn ServerFilter) -> ReplicaEligibilityIndex {
        let catalog = SegmentCatalog::from_snapshot(snapshot);
        let consistency = PartitionConsistencyResolver::resolve(&catalog, snapshot).unwrap();
        ReplicaEligibilityIndex::build(&catalog, snapshot, &consistency, filter)
    }

    fn names(set: &EligibleReplicaSet) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_online_replicas_are_eligible() {
        let snapshot = ExternalViewBuilder::new()
            .replica("t__0__0__c", "s1", SegmentState::Online)
            .replica("t__0__0__c", "s2", SegmentState::Online)
            .replica("t__0__0__c", "s3", SegmentState::Error)
            .build();

        let index = build(&snapshot, &AllServersActive);
        assert_eq!(names(index.eligible_servers("t__0__0__c").unwrap()), vec!["s1", "s2"]);
    }

    #[test]
    fn test_consuming_only_eligible_on_designee() {
        let snapshot = ExternalViewBuilder::new()
            .replica("t__0__1__c", "s1", SegmentState::Consuming)
            .replica("t__0__1__c", "s2", SegmentState::Consuming)
            .replica("t__0__2__c", "s1", SegmentState::Consuming)
            .replica("t__0__2__c", "s2", SegmentState::Online)
            .build();

        let index = build(&snapshot, &AllServersActive);
        assert_eq!(names(index.eligible_servers("t__0__1__c").unwrap()), vec!["s1", "s2"]);
        // Segment 2 is mid-commit: only the ONLINE copy may serve it
        assert_eq!(names(index.eligible_servers("t__0__2__c").unwrap()), vec!["s2"]);
    }

    #[test]
    fn test_pruned_servers_excluded() {
        let snapshot = ExternalViewBuilder::new()
            .replica("t__0__0__c", "s1", SegmentState::Online)
            .replica("t__0__0__c", "s2", SegmentState::Online)
            .build();

        let filter = ExcludedServers(["s1".to_string()].into_iter().collect());
        let index = build(&snapshot, &filter);
        assert_eq!(names(index.eligible_servers("t__0__0__c").unwrap()), vec!["s2"]);
        assert!(index.segments_for_server("s1").is_empty());
    }

    #[test]
    fn test_all_error_segment_is_unroutable() {
        let snapshot = ExternalViewBuilder::new()
            .replica("t__0__0__c", "s1", SegmentState::Error)
            .replica("t__0__0__c", "s2", SegmentState::Error)
            .replica("t__1__0__c", "s1", SegmentState::Online)
            .build();

        let index = build(&snapshot, &AllServersActive);
        assert_eq!(index.len(), 2);
        assert!(index.eligible_servers("t__0__0__c").unwrap().is_empty());

        let unroutable: Vec<&str> = index.unroutable_segments().map(|s| s.segment_name()).collect();
        assert_eq!(unroutable, vec!["t__0__0__c"]);
        assert_eq!(index.routable_segments().count(), 1);
    }

    #[test]
    fn test_segments_by_server() {
        let snapshot = ExternalViewBuilder::new()
            .replica("t__0__0__c", "s1", SegmentState::Online)
            .replica("t__1__0__c", "s1", SegmentState::Online)
            .replica("t__1__0__c", "s2", SegmentState::Online)
            .build();

        let index = build(&snapshot, &AllServersActive);
        assert_eq!(index.segments_for_server("s1").len(), 2);
        assert_eq!(index.segments_for_server("s2").len(), 1);
        assert_eq!(index.servers().collect::<Vec<_>>(), vec!["s1", "s2"]);
    }
}
