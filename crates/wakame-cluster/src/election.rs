//! Per-slice leader election.
//!
//! A slice keeps its leader as long as that replica is still active on a
//! live node (a node that left and came back can host down replicas, so
//! node liveness alone is not enough to keep a leader). Otherwise
//! every backing record's leader flag is cleared, replicas on dead nodes are
//! marked down, and a uniformly random active replica (seeded shuffle, so
//! replays are reproducible) becomes the new leader. A slice with no active
//! replicas is left leaderless.

use crate::error::{ClusterError, Result};
use crate::provider::CoreState;
use crate::state::ClusterState;
use crate::types::{NodeId, ReplicaState};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use tracing::{info, warn};

pub(crate) fn elect_leaders(
    state: &mut CoreState,
    snapshot: &ClusterState,
    collections: &BTreeSet<String>,
    rng: &mut StdRng,
) -> Result<()> {
    for (collection, coll_state) in snapshot.collections() {
        if !collections.contains(collection) {
            continue;
        }
        for (shard, slice) in coll_state.slices() {
            if let Some(leader) = slice.leader() {
                if leader.is_active(&state.live_nodes) {
                    continue;
                }
            }
            if slice.replicas().is_empty() {
                continue;
            }
            info!("running leader election for {collection} / {shard}");

            // Candidate records addressed by (node, position in node list);
            // positions stay valid because nothing is removed here.
            let mut candidates: Vec<(NodeId, usize)> = Vec::new();
            for replica in slice.replicas().values() {
                let node = replica.node_name().ok_or_else(|| {
                    ClusterError::InvariantViolation {
                        reason: format!("replica {} has no node_name", replica.name()),
                    }
                })?;
                let records = state.node_replicas.get_mut(&node).ok_or_else(|| {
                    ClusterError::InvariantViolation {
                        reason: format!("no replica list for node {node}"),
                    }
                })?;
                let position = records
                    .iter()
                    .position(|r| r.name() == replica.name())
                    .ok_or_else(|| ClusterError::InvariantViolation {
                        reason: format!(
                            "no backing record for replica {} on node {node}",
                            replica.name()
                        ),
                    })?;
                records[position].clear_leader();
                if replica.is_active(&state.live_nodes) {
                    candidates.push((node, position));
                } else if !state.live_nodes.contains(&node) {
                    records[position].set_state(ReplicaState::Down);
                }
            }

            if candidates.is_empty() {
                warn!("no active replicas for {collection} / {shard}, slice left leaderless");
                continue;
            }
            candidates.shuffle(rng);
            let (node, position) = &candidates[0];
            let records = state.node_replicas.get_mut(node).ok_or_else(|| {
                ClusterError::InvariantViolation {
                    reason: format!("no replica list for node {node}"),
                }
            })?;
            records[*position].set_leader();
            info!(
                "elected new leader for {collection} / {shard}: {} on {node}",
                records[*position].name()
            );
        }
    }
    Ok(())
}
