pub mod cluster;
pub mod error;
pub mod routing;

pub use cluster::{ExternalViewSnapshot, InstanceConfig, InstancePruner, SegmentState, ServerFilter};
pub use error::{RoutingError, RoutingResult};
pub use routing::{
    LowLevelConsumerRoutingTableBuilder, PoolStats, RoutingConfig, RoutingTable, RoutingTableBuilder,
    RoutingTablePool,
};
