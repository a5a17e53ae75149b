pub mod health;
pub mod node;
pub mod state;

pub use health::{AllServersActive, ExcludedServers, InstancePruner, ServerFilter};
pub use node::InstanceConfig;
pub use state::{ExternalViewBuilder, ExternalViewSnapshot, SegmentId, SegmentState, ServerId};
