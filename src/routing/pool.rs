//! Routing table pool generation
//!
//! Tables are generated independently. Each one gets its own `StdRng`,
//! seeded from the caller's generator before any table is built, so a
//! pool is identical whether it is generated serially or on rayon.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::RoutingResult;

use super::eligibility::ReplicaEligibilityIndex;
use super::sampler::ServerSubsetSampler;
use super::scheduler::WeightedAssignmentScheduler;
use super::table::RoutingTable;

/// Fixed-size, ordered set of alternative routing tables
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RoutingTablePool {
    tables: Vec<RoutingTable>,
}

impl RoutingTablePool {
    /// Generate `count` tables from a prepared eligibility index
    pub fn generate<R: Rng + ?Sized>(
        index: &ReplicaEligibilityIndex,
        count: usize,
        parallel: bool,
        rng: &mut R,
    ) -> RoutingResult<Self> {
        let seeds: Vec<u64> = (0..count).map(|_| rng.gen()).collect();

        let tables = if parallel {
            seeds
                .par_iter()
                .map(|seed| build_table(index, *seed))
                .collect::<RoutingResult<Vec<_>>>()?
        } else {
            seeds
                .iter()
                .map(|seed| build_table(index, *seed))
                .collect::<RoutingResult<Vec<_>>>()?
        };

        Ok(Self { tables })
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&RoutingTable> {
        self.tables.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RoutingTable> {
        self.tables.iter()
    }

    pub fn into_tables(self) -> Vec<RoutingTable> {
        self.tables
    }
}

impl<'a> IntoIterator for &'a RoutingTablePool {
    type Item = &'a RoutingTable;
    type IntoIter = std::slice::Iter<'a, RoutingTable>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

fn build_table(index: &ReplicaEligibilityIndex, seed: u64) -> RoutingResult<RoutingTable> {
    let mut rng = StdRng::seed_from_u64(seed);
    let sampled = ServerSubsetSampler::sample(index, &mut rng);
    WeightedAssignmentScheduler::assign(index, &sampled, &mut rng)
}
