//! Property-based generators for mutator sequences.
//!
//! Strategies produce [`SimOp`] sequences whose targets are indices; `apply`
//! resolves them against the cluster's current state modulo the available
//! choices, so any sequence is applicable to any cluster. Precondition
//! failures (killing a dead node, duplicate collection names, …) are
//! expected under random sequences and ignored; an invariant violation is a
//! bug and panics.
//!
//! # Example
//!
//! ```ignore
//! use wakame_testkit::{apply, assert_invariants, op_sequence, SimCluster};
//! use proptest::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn invariants_hold(ops in op_sequence(30)) {
//!         let cluster = SimCluster::new(4);
//!         for op in &ops {
//!             apply(&cluster, op);
//!         }
//!         cluster.drain_tasks();
//!         assert_invariants(&cluster);
//!     }
//! }
//! ```

use crate::harness::SimCluster;
use proptest::prelude::*;
use wakame_cluster::{assign, ClusterError, MoveReplicaRequest, NodeId, ReplicaRecord, ReplicaType};

/// One randomly generated mutator invocation. Numeric fields are free
/// indices resolved modulo the current state by [`apply`].
#[derive(Debug, Clone)]
pub enum SimOp {
    AddNode(usize),
    KillNode(usize),
    CreateCollection { collection: usize, shards: u32, replication: u32 },
    DeleteCollection(usize),
    AddReplica { node: usize, collection: usize },
    RemoveReplica { node: usize },
    MoveReplica { collection: usize, target: usize },
    SetClusterProperty { key: usize, remove: bool },
}

/// Names of the fixed collection namespace used by generated ops.
fn collection_name(index: usize) -> String {
    format!("c{}", index % 4)
}

/// Strategy for one op, weighted towards replica and collection churn.
pub fn op() -> impl Strategy<Value = SimOp> {
    prop_oneof![
        1 => (0..8usize).prop_map(SimOp::AddNode),
        2 => (0..8usize).prop_map(SimOp::KillNode),
        3 => ((0..4usize), (1..3u32), (1..4u32))
            .prop_map(|(collection, shards, replication)| SimOp::CreateCollection {
                collection,
                shards,
                replication,
            }),
        1 => (0..4usize).prop_map(SimOp::DeleteCollection),
        3 => ((0..8usize), (0..4usize))
            .prop_map(|(node, collection)| SimOp::AddReplica { node, collection }),
        2 => (0..8usize).prop_map(|node| SimOp::RemoveReplica { node }),
        2 => ((0..4usize), (0..8usize))
            .prop_map(|(collection, target)| SimOp::MoveReplica { collection, target }),
        1 => ((0..4usize), any::<bool>())
            .prop_map(|(key, remove)| SimOp::SetClusterProperty { key, remove }),
    ]
}

/// Strategy for a sequence of up to `max_len` ops.
pub fn op_sequence(max_len: usize) -> impl Strategy<Value = Vec<SimOp>> {
    prop::collection::vec(op(), 1..=max_len)
}

/// Treat precondition errors as no-ops, panic on invariant violations.
fn note<T>(result: Result<T, ClusterError>) {
    match result {
        Ok(_) => {}
        Err(e @ ClusterError::InvariantViolation { .. }) => {
            panic!("invariant violation during generated op: {e}")
        }
        Err(_) => {}
    }
}

/// Pick a live node by free index, if any are live.
fn live_node(cluster: &SimCluster, index: usize) -> Option<NodeId> {
    let live: Vec<NodeId> = cluster.provider().live_nodes().into_iter().collect();
    if live.is_empty() {
        None
    } else {
        Some(live[index % live.len()].clone())
    }
}

/// Pick an existing collection by free index, if any exist.
fn existing_collection(cluster: &SimCluster, index: usize) -> Option<String> {
    let collections = cluster.provider().list_collections();
    if collections.is_empty() {
        None
    } else {
        Some(collections[index % collections.len()].clone())
    }
}

/// Resolve and run one generated op against the cluster.
pub fn apply(cluster: &SimCluster, op: &SimOp) {
    let provider = cluster.provider();
    match op {
        SimOp::AddNode(index) => {
            note(provider.add_node(&cluster.node_name(*index)));
        }
        SimOp::KillNode(index) => {
            if let Some(node) = live_node(cluster, *index) {
                note(provider.remove_node(&node));
            }
        }
        SimOp::CreateCollection {
            collection,
            shards,
            replication,
        } => {
            note(cluster.create_collection(&collection_name(*collection), *shards, *replication));
        }
        SimOp::DeleteCollection(index) => {
            if let Some(collection) = existing_collection(cluster, *index) {
                note(provider.delete_collection(&collection, None));
            }
        }
        SimOp::AddReplica { node, collection } => {
            let Some(node) = live_node(cluster, *node) else {
                return;
            };
            let collection = collection_name(*collection);
            let manager = cluster.state_manager();
            let core = match assign::build_core_name(
                manager.as_ref(),
                &collection,
                "shard1",
                ReplicaType::Nrt,
            ) {
                Ok(core) => core,
                Err(e) => return note::<()>(Err(e)),
            };
            let name = match assign::assign_core_node_name(manager.as_ref(), &collection) {
                Ok(name) => name,
                Err(e) => return note::<()>(Err(e)),
            };
            let record =
                ReplicaRecord::new(name, core, collection, "shard1", ReplicaType::Nrt, node.clone());
            note(provider.add_replica(&node, record, true));
        }
        SimOp::RemoveReplica { node } => {
            let Some(node) = live_node(cluster, *node) else {
                return;
            };
            let records = provider.replica_infos_for_node(&node);
            if let Some(record) = records.first() {
                note(provider.remove_replica(&node, record.name()));
            }
        }
        SimOp::MoveReplica { collection, target } => {
            let Some(collection) = existing_collection(cluster, *collection) else {
                return;
            };
            let Some(target) = live_node(cluster, *target) else {
                return;
            };
            let Some(state) = provider.collection_state(&collection) else {
                return;
            };
            let Some(replica) = state
                .slices()
                .values()
                .flat_map(|s| s.replicas().values())
                .next()
            else {
                return;
            };
            note(provider.move_replica(&MoveReplicaRequest {
                collection,
                replica: replica.name().to_string(),
                target_node: target,
                async_id: None,
            }));
        }
        SimOp::SetClusterProperty { key, remove } => {
            let name = format!("prop{key}");
            let value = if *remove {
                None
            } else {
                Some(serde_json::Value::from(*key as u64))
            };
            note(provider.set_cluster_property(&name, value));
        }
    }
}
