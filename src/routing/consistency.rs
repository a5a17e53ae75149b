//! Consuming-segment consistency
//!
//! Replicas of a consuming segment may hold different offsets of the
//! stream. Only one consuming segment per partition may be queried, and
//! only when every replica that is not in ERROR has it in CONSUMING state.

use std::collections::BTreeMap;

use crate::cluster::{ExternalViewSnapshot, SegmentState};
use crate::error::{RoutingError, RoutingResult};

use super::catalog::SegmentCatalog;
use super::segment::{PartitionId, SegmentDescriptor};

/// How the non-error replicas of a segment are distributed across states
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplicaSummary {
    pub online: usize,
    pub consuming: usize,
    pub error: usize,
    pub other: usize,
}

impl ReplicaSummary {
    pub fn of(snapshot: &ExternalViewSnapshot, segment_name: &str) -> Self {
        let mut summary = Self::default();
        for (_, state) in snapshot.state_map(segment_name) {
            match state {
                SegmentState::Online => summary.online += 1,
                SegmentState::Consuming => summary.consuming += 1,
                SegmentState::Error => summary.error += 1,
                _ => summary.other += 1,
            }
        }
        summary
    }

    /// Every replica outside ERROR is CONSUMING, and there is at least one
    pub fn is_fully_consuming(&self) -> bool {
        self.consuming > 0 && self.online == 0 && self.other == 0
    }
}

/// Partition -> the single segment that may be queried while consuming
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionConsistencyTable {
    designees: BTreeMap<PartitionId, SegmentDescriptor>,
}

impl PartitionConsistencyTable {
    pub fn designee(&self, partition_id: PartitionId) -> Option<&SegmentDescriptor> {
        self.designees.get(&partition_id)
    }

    /// Whether this segment is its partition's consuming designee
    pub fn is_designee(&self, segment: &SegmentDescriptor) -> bool {
        self.designees
            .get(&segment.partition_id())
            .map(|designee| designee.segment_name() == segment.segment_name())
            .unwrap_or(false)
    }

    pub fn designees(&self) -> impl Iterator<Item = (PartitionId, &SegmentDescriptor)> {
        self.designees.iter().map(|(id, seg)| (*id, seg))
    }

    pub fn len(&self) -> usize {
        self.designees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.designees.is_empty()
    }

    fn insert(&mut self, segment: SegmentDescriptor) -> RoutingResult<()> {
        let partition_id = segment.partition_id();
        if let Some(existing) = self.designees.insert(partition_id, segment) {
            return Err(RoutingError::InvariantViolation(format!(
                "partition {} resolved to more than one consuming segment (previously {})",
                partition_id, existing
            )));
        }
        Ok(())
    }
}

pub struct PartitionConsistencyResolver;

impl PartitionConsistencyResolver {
    /// Pick, for each partition, the most recent fully consuming segment.
    pub fn resolve(
        catalog: &SegmentCatalog,
        snapshot: &ExternalViewSnapshot,
    ) -> RoutingResult<PartitionConsistencyTable> {
        let mut table = PartitionConsistencyTable::default();

        for (partition_id, segments) in catalog.partitions() {
            let designee = segments
                .iter()
                .rev()
                .find(|segment| ReplicaSummary::of(snapshot, segment.segment_name()).is_fully_consuming());

            match designee {
                Some(segment) => {
                    tracing::trace!("Partition {} consuming designee is {}", partition_id, segment);
                    table.insert(segment.clone())?;
                }
                None => {
                    tracing::trace!("Partition {} has no queryable consuming segment", partition_id);
                }
            }
        }

        Ok(table)
    }
}
