//! Load-weighted segment assignment
//!
//! Replicas with fewer segments assigned are favored. Given replicas with
//! 1, 2 and 3 segments, the weights are the maximum count minus each
//! replica's count: 2, 1 and 0. Compared with weighting by
//! `sum - count` or `max - count + 1`, this gives the smallest standard
//! deviation of segments per replica.

use std::collections::BTreeSet;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::cluster::ServerId;
use crate::error::RoutingResult;

use super::eligibility::{ReplicaEligibilityIndex, SegmentIndex};
use super::table::RoutingTable;

pub struct WeightedAssignmentScheduler;

impl WeightedAssignmentScheduler {
    /// Build one routing table over the sampled servers.
    ///
    /// Segments with the fewest sampled replicas are placed first. A segment
    /// with no sampled replica is left out of the table.
    pub fn assign<R: Rng + ?Sized>(
        index: &ReplicaEligibilityIndex,
        sampled: &BTreeSet<ServerId>,
        rng: &mut R,
    ) -> RoutingResult<RoutingTable> {
        let mut restricted: Vec<(SegmentIndex, Vec<&str>)> = (0..index.len())
            .map(|idx| {
                let replicas = index
                    .replicas(idx)
                    .iter()
                    .filter(|server| sampled.contains(*server))
                    .map(String::as_str)
                    .collect();
                (idx, replicas)
            })
            .collect();

        // Stable: ties keep catalog order
        restricted.sort_by_key(|(_, replicas)| replicas.len());

        let mut table = RoutingTable::new();
        for (idx, replicas) in &restricted {
            if let Some(server) = pick_weighted_replica(replicas, &table, rng) {
                table.assign(server, index.segment(*idx).segment_name())?;
            }
        }

        Ok(table)
    }
}

/// Weight of each candidate: the highest load among candidates minus its own.
///
/// Falls back to uniform weights when every candidate carries the same load.
pub fn replica_weights(loads: &[usize]) -> Vec<usize> {
    let max = loads.iter().copied().max().unwrap_or(0);
    let weights: Vec<usize> = loads.iter().map(|load| max - load).collect();

    if weights.iter().all(|w| *w == 0) {
        vec![1; loads.len()]
    } else {
        weights
    }
}

/// Pick a replica, favoring those with fewer segments in the table so far
pub fn pick_weighted_replica<'a, R: Rng + ?Sized>(
    candidates: &[&'a str],
    table: &RoutingTable,
    rng: &mut R,
) -> Option<&'a str> {
    match candidates.len() {
        0 => return None,
        1 => return Some(candidates[0]),
        _ => {}
    }

    let loads: Vec<usize> = candidates.iter().map(|server| table.segment_count(server)).collect();
    let weights = replica_weights(&loads);

    match WeightedIndex::new(&weights) {
        Ok(dist) => Some(candidates[dist.sample(rng)]),
        Err(e) => {
            tracing::warn!("Invalid replica weights {:?}: {}", weights, e);
            Some(candidates[rng.gen_range(0..candidates.len())])
        }
    }
}
