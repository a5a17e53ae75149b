//! Segment catalog: stream-ingested segments grouped by partition

use std::collections::BTreeMap;

use crate::cluster::ExternalViewSnapshot;

use super::segment::{PartitionId, SegmentDescriptor};

/// Segments of one table, grouped by partition and ordered by sequence number
#[derive(Debug, Clone, Default)]
pub struct SegmentCatalog {
    partitions: BTreeMap<PartitionId, Vec<SegmentDescriptor>>,
    skipped: usize,
}

impl SegmentCatalog {
    /// Build the catalog from every segment named in the snapshot.
    ///
    /// Names outside the stream-ingested family are skipped, never fatal.
    pub fn from_snapshot(snapshot: &ExternalViewSnapshot) -> Self {
        let mut partitions: BTreeMap<PartitionId, Vec<SegmentDescriptor>> = BTreeMap::new();
        let mut skipped = 0;

        for segment_name in snapshot.segment_ids() {
            match SegmentDescriptor::parse(segment_name) {
                Some(descriptor) => {
                    partitions
                        .entry(descriptor.partition_id())
                        .or_default()
                        .push(descriptor);
                }
                None => {
                    tracing::debug!("Skipping non stream-ingested segment {}", segment_name);
                    skipped += 1;
                }
            }
        }

        for segments in partitions.values_mut() {
            segments.sort();
        }

        Self { partitions, skipped }
    }

    /// Partitions with their segments, oldest first
    pub fn partitions(&self) -> impl Iterator<Item = (PartitionId, &[SegmentDescriptor])> {
        self.partitions.iter().map(|(id, segments)| (*id, segments.as_slice()))
    }

    pub fn partition(&self, partition_id: PartitionId) -> Option<&[SegmentDescriptor]> {
        self.partitions.get(&partition_id).map(Vec::as_slice)
    }

    /// Every catalogued segment, ordered by (partition, sequence)
    pub fn segments(&self) -> impl Iterator<Item = &SegmentDescriptor> {
        self.partitions.values().flatten()
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    pub fn segment_count(&self) -> usize {
        self.partitions.values().map(Vec::len).sum()
    }

    /// Number of snapshot entries that were not stream-ingested segments
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}
