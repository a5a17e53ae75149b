//! Routing table construction for stream-ingested tables
//!
//! Cluster state flows through catalog, consistency and eligibility once
//! per snapshot, then through sampling and weighted assignment once per
//! generated table.

pub mod builder;
pub mod catalog;
pub mod config;
pub mod consistency;
pub mod eligibility;
pub mod pool;
pub mod sampler;
pub mod scheduler;
pub mod segment;
pub mod stats;
pub mod table;

pub use builder::{LowLevelConsumerRoutingTableBuilder, PreparedSnapshot, RoutingTableBuilder};
pub use catalog::SegmentCatalog;
pub use config::{RoutingConfig, DEFAULT_ROUTING_TABLE_COUNT};
pub use consistency::{PartitionConsistencyResolver, PartitionConsistencyTable};
pub use eligibility::{EligibleReplicaSet, ReplicaEligibilityIndex};
pub use pool::RoutingTablePool;
pub use sampler::ServerSubsetSampler;
pub use scheduler::WeightedAssignmentScheduler;
pub use segment::{PartitionId, SegmentDescriptor};
pub use stats::PoolStats;
pub use table::RoutingTable;
