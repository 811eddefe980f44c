//! Structural invariant checks over a simulated cluster.
//!
//! Run after draining scheduled elections; every check must hold after any
//! sequence of mutators:
//! - core names are unique across the cluster
//! - every record is stored under the node it names
//! - at most one leader per (collection, shard)
//! - a leader is active and on a live node
//! - a live node's `cores` telemetry equals its replica count
//! - replicas on dead nodes are down and never leaders

use crate::harness::SimCluster;
use std::collections::{BTreeMap, BTreeSet};
use wakame_cluster::NodeId;
use wakame_cluster::NodeStateProvider;
use wakame_cluster::ReplicaState;

/// Collect every invariant violation; empty means the model is consistent.
pub fn check_invariants(cluster: &SimCluster) -> Vec<String> {
    let provider = cluster.provider();
    let live = provider.live_nodes();
    let mut nodes: BTreeSet<NodeId> = live.clone();
    nodes.extend(cluster.node_values().all_node_values().into_keys());

    let mut violations = Vec::new();
    let mut seen_cores: BTreeMap<String, NodeId> = BTreeMap::new();
    let mut leaders: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();

    for node in &nodes {
        let records = provider.replica_infos_for_node(node);

        if live.contains(node) {
            let cores = cluster.cores(node);
            if cores != records.len() as i64 {
                violations.push(format!(
                    "node {node}: cores telemetry {cores} != {} hosted replicas",
                    records.len()
                ));
            }
        }

        for record in &records {
            if record.node() != node {
                violations.push(format!(
                    "replica {} stored under node {node} but names node {}",
                    record.name(),
                    record.node()
                ));
            }
            if let Some(other) = seen_cores.insert(record.core().to_string(), node.clone()) {
                violations.push(format!(
                    "core {} duplicated on nodes {other} and {node}",
                    record.core()
                ));
            }
            if record.is_leader() {
                leaders
                    .entry((
                        record.collection().to_string(),
                        record.shard().to_string(),
                    ))
                    .or_default()
                    .push(record.name().to_string());
                if !live.contains(node) {
                    violations.push(format!(
                        "leader {} lives on dead node {node}",
                        record.name()
                    ));
                }
                if record.state() != ReplicaState::Active {
                    violations.push(format!(
                        "leader {} is {} rather than active",
                        record.name(),
                        record.state()
                    ));
                }
            }
            if !live.contains(node) {
                if record.state() != ReplicaState::Down {
                    violations.push(format!(
                        "replica {} on dead node {node} is {} rather than down",
                        record.name(),
                        record.state()
                    ));
                }
            }
        }
    }

    for ((collection, shard), names) in leaders {
        if names.len() > 1 {
            violations.push(format!(
                "{collection}/{shard} has {} leaders: {names:?}",
                names.len()
            ));
        }
    }

    violations
}

/// Panic with every violation found, if any.
pub fn assert_invariants(cluster: &SimCluster) {
    let violations = check_invariants(cluster);
    assert!(
        violations.is_empty(),
        "cluster invariants violated:\n{}",
        violations.join("\n")
    );
}
