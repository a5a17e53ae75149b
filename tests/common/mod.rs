//! Common test utilities for routing tests
//!
//! Provides shared helpers for:
//! - Building external view snapshots
//! - Checking per-table routing invariants

#![allow(dead_code)]

use std::collections::HashSet;

use realtime_routing::cluster::{ExternalViewBuilder, ExternalViewSnapshot, SegmentState};
use realtime_routing::routing::{PreparedSnapshot, RoutingTable};

pub fn segment(partition: u32, sequence: u64) -> String {
    format!("events__{}__{}__20240101T0000Z", partition, sequence)
}

/// `partitions` partitions of `sealed` ONLINE segments plus one fully
/// CONSUMING segment each, replicated on `replicas` of `servers` servers.
pub fn realtime_snapshot(partitions: u32, sealed: u64, servers: usize, replicas: usize) -> ExternalViewSnapshot {
    let mut builder = ExternalViewBuilder::new();
    for p in 0..partitions {
        for seq in 0..=sealed {
            let state = if seq == sealed {
                SegmentState::Consuming
            } else {
                SegmentState::Online
            };
            for r in 0..replicas {
                let server = format!("server_{}", (p as usize + seq as usize + r) % servers);
                builder = builder.replica(&segment(p, seq), &server, state.clone());
            }
        }
    }
    builder.build()
}

/// Assert the invariants every generated table must satisfy
pub fn assert_table_invariants(table: &RoutingTable, prepared: &PreparedSnapshot, snapshot: &ExternalViewSnapshot) {
    let mut seen = HashSet::new();
    for (server, segments) in table.servers() {
        for name in segments {
            assert!(seen.insert(name.clone()), "segment {} routed twice", name);

            let eligible = prepared.index.eligible_servers(name).expect("routed segment is catalogued");
            assert!(eligible.contains(server), "{} is not eligible for {}", server, name);

            if snapshot.state(name, server) == Some(&SegmentState::Consuming) {
                let descriptor = prepared
                    .catalog
                    .segments()
                    .find(|s| s.segment_name() == name)
                    .expect("catalogued");
                assert!(
                    prepared.consistency.is_designee(descriptor),
                    "{} routed in CONSUMING state but is not the designee",
                    name
                );
            }
        }
    }
}
