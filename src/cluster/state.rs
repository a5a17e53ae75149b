use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{RoutingError, RoutingResult};

pub type SegmentId = String;
pub type ServerId = String;

/// Replica state reported by a server for a segment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SegmentState {
    Online,
    Consuming,
    Error,
    Offline,
    Dropped,
    Other(String),
}

impl SegmentState {
    /// Parse an external view state string, case-insensitively
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "ONLINE" => SegmentState::Online,
            "CONSUMING" => SegmentState::Consuming,
            "ERROR" => SegmentState::Error,
            "OFFLINE" => SegmentState::Offline,
            "DROPPED" => SegmentState::Dropped,
            _ => SegmentState::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SegmentState::Online => "ONLINE",
            SegmentState::Consuming => "CONSUMING",
            SegmentState::Error => "ERROR",
            SegmentState::Offline => "OFFLINE",
            SegmentState::Dropped => "DROPPED",
            SegmentState::Other(raw) => raw,
        }
    }
}

impl fmt::Display for SegmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SegmentState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SegmentState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(SegmentState::parse(&raw))
    }
}

/// Per-segment, per-server replica states for one table.
///
/// Immutable once built. Ordered maps keep iteration stable so that a
/// fixed random seed yields a fixed routing table pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalViewSnapshot {
    segments: BTreeMap<SegmentId, BTreeMap<ServerId, SegmentState>>,
}

impl ExternalViewSnapshot {
    pub fn new(segments: BTreeMap<SegmentId, BTreeMap<ServerId, SegmentState>>) -> Self {
        Self { segments }
    }

    /// Parse a JSON object of `segment -> { server -> state }`
    pub fn from_json_str(content: &str) -> RoutingResult<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        if !value.is_object() {
            return Err(RoutingError::InvalidSnapshot(
                "external view must be a JSON object keyed by segment".to_string(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// All segment identifiers in the snapshot, in sorted order
    pub fn segment_ids(&self) -> impl Iterator<Item = &str> {
        self.segments.keys().map(String::as_str)
    }

    /// Replica states for a segment; empty when the segment is unknown
    pub fn state_map(&self, segment: &str) -> impl Iterator<Item = (&str, &SegmentState)> {
        self.segments
            .get(segment)
            .into_iter()
            .flat_map(|servers| servers.iter().map(|(server, state)| (server.as_str(), state)))
    }

    pub fn state(&self, segment: &str, server: &str) -> Option<&SegmentState> {
        self.segments.get(segment).and_then(|servers| servers.get(server))
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Incremental construction of a snapshot, mostly for tests and tooling
#[derive(Debug, Default)]
pub struct ExternalViewBuilder {
    segments: BTreeMap<SegmentId, BTreeMap<ServerId, SegmentState>>,
}

impl ExternalViewBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replica(mut self, segment: &str, server: &str, state: SegmentState) -> Self {
        self.segments
            .entry(segment.to_string())
            .or_default()
            .insert(server.to_string(), state);
        self
    }

    /// Register a segment with no replicas at all
    pub fn segment(mut self, segment: &str) -> Self {
        self.segments.entry(segment.to_string()).or_default();
        self
    }

    pub fn build(self) -> ExternalViewSnapshot {
        ExternalViewSnapshot::new(self.segments)
    }
}
