use serde::Serialize;

use super::builder::PreparedSnapshot;
use super::pool::RoutingTablePool;
use super::table::RoutingTable;

/// Summary of a computed routing table pool
#[derive(Debug, Clone, Serialize)]
pub struct PoolStats {
    pub table_name: String,
    pub table_count: usize,
    pub partition_count: usize,
    pub segment_count: usize,
    pub skipped_segment_count: usize,
    pub consuming_segments: Vec<String>,
    pub unroutable_segments: Vec<String>,
    pub mean_servers_per_table: f64,
    pub max_servers_per_table: usize,
    /// Mean over tables of the std deviation of segments per server
    pub mean_load_std_dev: f64,
}

impl PoolStats {
    pub fn compute(table_name: &str, prepared: &PreparedSnapshot, pool: &RoutingTablePool) -> Self {
        let server_counts: Vec<usize> = pool.iter().map(RoutingTable::server_count).collect();
        let std_devs: Vec<f64> = pool.iter().map(load_std_dev).collect();

        Self {
            table_name: table_name.to_string(),
            table_count: pool.len(),
            partition_count: prepared.catalog.partition_count(),
            segment_count: prepared.catalog.segment_count(),
            skipped_segment_count: prepared.catalog.skipped_count(),
            consuming_segments: prepared
                .consistency
                .designees()
                .map(|(_, segment)| segment.segment_name().to_string())
                .collect(),
            unroutable_segments: prepared
                .index
                .unroutable_segments()
                .map(|segment| segment.segment_name().to_string())
                .collect(),
            mean_servers_per_table: mean(server_counts.iter().map(|c| *c as f64)),
            max_servers_per_table: server_counts.iter().copied().max().unwrap_or(0),
            mean_load_std_dev: mean(std_devs.into_iter()),
        }
    }
}

/// Population standard deviation of segments per server within one table
pub fn load_std_dev(table: &RoutingTable) -> f64 {
    let loads: Vec<f64> = table.servers().map(|(_, segments)| segments.len() as f64).collect();
    if loads.is_empty() {
        return 0.0;
    }
    let avg = mean(loads.iter().copied());
    let variance = loads.iter().map(|l| (l - avg).powi(2)).sum::<f64>() / loads.len() as f64;
    variance.sqrt()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
