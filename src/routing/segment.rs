//! Stream-ingested segment names
//!
//! Segments filled by the low level consumer are named
//! `{table}__{partition}__{sequence}__{creation_time}`.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const SEPARATOR: &str = "__";

pub type PartitionId = u32;

/// Parsed identity of a stream-ingested segment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentDescriptor {
    table_name: String,
    partition_id: PartitionId,
    sequence_number: u64,
    creation_time: String,
    segment_name: String,
}

impl SegmentDescriptor {
    /// Parse a segment name, returning `None` for foreign or malformed names
    pub fn parse(segment_name: &str) -> Option<Self> {
        let parts: Vec<&str> = segment_name.split(SEPARATOR).collect();
        if parts.len() != 4 || parts.iter().any(|p| p.is_empty()) {
            return None;
        }

        let partition_id = parts[1].parse::<PartitionId>().ok()?;
        let sequence_number = parts[2].parse::<u64>().ok()?;

        Some(Self {
            table_name: parts[0].to_string(),
            partition_id,
            sequence_number,
            creation_time: parts[3].to_string(),
            segment_name: segment_name.to_string(),
        })
    }

    /// Whether a name belongs to the stream-ingested segment family
    pub fn is_low_level_consumer_segment(segment_name: &str) -> bool {
        Self::parse(segment_name).is_some()
    }

    pub fn new(table_name: &str, partition_id: PartitionId, sequence_number: u64, creation_time: &str) -> Self {
        let segment_name = [
            table_name.to_string(),
            partition_id.to_string(),
            sequence_number.to_string(),
            creation_time.to_string(),
        ]
        .join(SEPARATOR);

        Self {
            table_name: table_name.to_string(),
            partition_id,
            sequence_number,
            creation_time: creation_time.to_string(),
            segment_name,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn partition_id(&self) -> PartitionId {
        self.partition_id
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn creation_time(&self) -> &str {
        &self.creation_time
    }

    pub fn segment_name(&self) -> &str {
        &self.segment_name
    }
}

impl Ord for SegmentDescriptor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partition_id
            .cmp(&other.partition_id)
            .then(self.sequence_number.cmp(&other.sequence_number))
            .then_with(|| self.segment_name.cmp(&other.segment_name))
    }
}

impl PartialOrd for SegmentDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SegmentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segment_name)
    }
}
