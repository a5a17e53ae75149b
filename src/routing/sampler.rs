//! Server subset sampling
//!
//! Each routing table only uses a random subset of servers that together
//! cover every routable segment, which keeps query fan-out low. The cover
//! is greedy and randomized, not minimal.

use std::collections::BTreeSet;

use rand::Rng;

use crate::cluster::ServerId;

use super::eligibility::{ReplicaEligibilityIndex, SegmentIndex};

pub struct ServerSubsetSampler;

impl ServerSubsetSampler {
    /// Sample servers until every segment with an eligible replica is covered.
    ///
    /// Segments without eligible replicas count as covered from the start.
    pub fn sample<R: Rng + ?Sized>(index: &ReplicaEligibilityIndex, rng: &mut R) -> BTreeSet<ServerId> {
        let mut uncovered = UncoveredSegments::new(index);
        let mut sampled = BTreeSet::new();

        while let Some(segment) = uncovered.pick(rng) {
            let replicas = index.replicas(segment);
            let choice = rng.gen_range(0..replicas.len());
            let Some(server) = replicas.iter().nth(choice) else {
                break;
            };

            for covered in index.segments_for_server(server) {
                uncovered.remove(*covered);
            }
            sampled.insert(server.clone());
        }

        sampled
    }
}

/// Uncovered segments with O(1) uniform pick and removal
struct UncoveredSegments {
    segments: Vec<SegmentIndex>,
    positions: Vec<Option<usize>>,
}

impl UncoveredSegments {
    fn new(index: &ReplicaEligibilityIndex) -> Self {
        let mut positions = vec![None; index.len()];
        let segments: Vec<SegmentIndex> = index.routable_segments().collect();
        for (pos, segment) in segments.iter().enumerate() {
            positions[*segment] = Some(pos);
        }
        Self { segments, positions }
    }

    fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<SegmentIndex> {
        if self.segments.is_empty() {
            return None;
        }
        Some(self.segments[rng.gen_range(0..self.segments.len())])
    }

    fn remove(&mut self, segment: SegmentIndex) {
        let Some(pos) = self.positions[segment].take() else {
            return;
        };
        self.segments.swap_remove(pos);
        if let Some(moved) = self.segments.get(pos) {
            self.positions[*moved] = Some(pos);
        }
    }
}
