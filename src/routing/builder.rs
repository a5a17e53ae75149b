//! Routing table builder for stream-ingested (low level consumer) tables
//!
//! We need to query every partition, but only one consuming segment per
//! partition may be queried: replicas can consume overlapping offsets
//! until the segment is committed, which would produce duplicate records.
//! Load is spread by weighted random replica selection, and fan-out is
//! capped by routing each table through a random covering subset of
//! servers.
//!
//! Steps:
//! 1. Group segments by partition, ordered by sequence number
//! 2. Pick at most one consuming segment per partition
//! 3. Compute the eligible replicas of every segment
//! 4. For each table, sample a covering server subset and assign segments
//!    by weighted random choice

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cluster::{ExternalViewSnapshot, InstanceConfig, InstancePruner, ServerFilter};
use crate::error::RoutingResult;

use super::catalog::SegmentCatalog;
use super::config::RoutingConfig;
use super::consistency::{PartitionConsistencyResolver, PartitionConsistencyTable};
use super::eligibility::ReplicaEligibilityIndex;
use super::pool::RoutingTablePool;

/// Computes the routing table pool of a table from cluster state
pub trait RoutingTableBuilder: Send + Sync {
    fn init(&mut self, config: &RoutingConfig);

    fn compute_routing_tables(
        &self,
        table_name: &str,
        snapshot: &ExternalViewSnapshot,
        instances: &[InstanceConfig],
    ) -> RoutingResult<RoutingTablePool>;
}

/// Per-snapshot routing state shared read-only by every table build
#[derive(Debug, Clone)]
pub struct PreparedSnapshot {
    pub catalog: SegmentCatalog,
    pub consistency: PartitionConsistencyTable,
    pub index: ReplicaEligibilityIndex,
}

impl PreparedSnapshot {
    pub fn prepare(snapshot: &ExternalViewSnapshot, filter: &dyn ServerFilter) -> RoutingResult<Self> {
        let catalog = SegmentCatalog::from_snapshot(snapshot);
        let consistency = PartitionConsistencyResolver::resolve(&catalog, snapshot)?;
        let index = ReplicaEligibilityIndex::build(&catalog, snapshot, &consistency, filter);

        Ok(Self {
            catalog,
            consistency,
            index,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct LowLevelConsumerRoutingTableBuilder {
    config: RoutingConfig,
}

impl LowLevelConsumerRoutingTableBuilder {
    pub fn new(config: RoutingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Compute the pool with an explicit generator and health filter
    pub fn compute_with_rng<R: Rng + ?Sized>(
        &self,
        table_name: &str,
        snapshot: &ExternalViewSnapshot,
        filter: &dyn ServerFilter,
        rng: &mut R,
    ) -> RoutingResult<(PreparedSnapshot, RoutingTablePool)> {
        let prepared = PreparedSnapshot::prepare(snapshot, filter)?;

        let unroutable: Vec<&str> = prepared
            .index
            .unroutable_segments()
            .map(|segment| segment.segment_name())
            .collect();
        if !unroutable.is_empty() {
            tracing::warn!(
                "Table {}: {} segment(s) have no eligible replica and will not be routed: {:?}",
                table_name,
                unroutable.len(),
                unroutable
            );
        }

        let pool = RoutingTablePool::generate(
            &prepared.index,
            self.config.routing_table_count,
            self.config.parallel,
            rng,
        )?;

        tracing::info!(
            "Table {}: computed {} routing tables over {} segments in {} partitions ({} consuming)",
            table_name,
            pool.len(),
            prepared.catalog.segment_count(),
            prepared.catalog.partition_count(),
            prepared.consistency.len()
        );

        Ok((prepared, pool))
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl RoutingTableBuilder for LowLevelConsumerRoutingTableBuilder {
    fn init(&mut self, config: &RoutingConfig) {
        self.config = config.clone();
    }

    fn compute_routing_tables(
        &self,
        table_name: &str,
        snapshot: &ExternalViewSnapshot,
        instances: &[InstanceConfig],
    ) -> RoutingResult<RoutingTablePool> {
        let pruner = InstancePruner::new(instances);
        let mut rng = self.rng();
        let (_, pool) = self.compute_with_rng(table_name, snapshot, &pruner, &mut rng)?;
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{ExternalViewBuilder, SegmentState};

    fn snapshot() -> ExternalViewSnapshot {
        ExternalViewBuilder::new()
            .replica("t__0__0__c", "s1", SegmentState::Online)
            .replica("t__0__0__c", "s2", SegmentState::Online)
            .replica("t__0__1__c", "s1", SegmentState::Consuming)
            .replica("t__0__1__c", "s2", SegmentState::Consuming)
            .build()
    }

    #[test]
    fn test_init_replaces_config() {
        let mut builder = LowLevelConsumerRoutingTableBuilder::default();
        assert_eq!(builder.config().routing_table_count, 500);

        builder.init(&RoutingConfig::with_table_count(3));
        assert_eq!(builder.config().routing_table_count, 3);
    }

    #[test]
    fn test_seeded_builder_is_reproducible() {
        let config = RoutingConfig {
            routing_table_count: 10,
            parallel: false,
            seed: Some(5),
        };
        let builder = LowLevelConsumerRoutingTableBuilder::new(config);

        let first = builder.compute_routing_tables("t", &snapshot(), &[]).unwrap();
        let second = builder.compute_routing_tables("t", &snapshot(), &[]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pruned_instances_not_routed() {
        let builder = LowLevelConsumerRoutingTableBuilder::new(RoutingConfig::with_table_count(20));
        let instances = vec![InstanceConfig::disabled("s1"), InstanceConfig::new("s2")];

        let pool = builder.compute_routing_tables("t", &snapshot(), &instances).unwrap();
        for table in &pool {
            assert!(table.segments_for("s1").is_none());
            assert_eq!(table.segment_count("s2"), 2);
        }
    }

    #[test]
    fn test_prepared_snapshot() {
        let prepared = PreparedSnapshot::prepare(&snapshot(), &crate::cluster::AllServersActive).unwrap();
        assert_eq!(prepared.catalog.segment_count(), 2);
        assert_eq!(prepared.consistency.designee(0).unwrap().sequence_number(), 1);
        assert_eq!(prepared.index.routable_segments().count(), 2);
    }
}
