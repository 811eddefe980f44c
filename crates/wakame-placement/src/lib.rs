//! Replica placement engines for wakame simulated clusters.
//!
//! Two deterministic engines:
//! - [`RoundRobinPlacement`]: walk the live nodes in order, wrapping as
//!   needed. Even spread, no affinity.
//! - [`HashSpreadPlacement`]: anchor each shard on a node chosen by
//!   xxhash64 (seed 0) + Jump Consistent Hash, then place the shard's
//!   replicas on consecutive nodes. Shard → node assignment moves minimally
//!   when the node count changes.

use std::hash::Hasher;
use twox_hash::XxHash64;
use wakame_cluster::placement::{shard_names, CreateCollectionRequest, ReplicaPosition};
use wakame_cluster::{ClusterError, ClusterState, NodeId, PlacementEngine, Result};

/// Compute xxhash64 of a key with seed 0. Deterministic across runs.
pub fn xxhash64(key: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(key);
    hasher.finish()
}

/// Jump Consistent Hash: map a 64-bit hash to a bucket in
/// `[0, num_buckets)`.
///
/// When `num_buckets` changes, only ~1/num_buckets of keys move.
/// Reference: https://arxiv.org/abs/1406.2294
pub fn jump_consistent_hash(mut key: u64, num_buckets: u32) -> u32 {
    let mut b: i64 = -1;
    let mut j: i64 = 0;

    while j < num_buckets as i64 {
        b = j;
        key = key.wrapping_mul(2862933555777941757).wrapping_add(1);
        j = ((b + 1) as f64 * (f64::from(1u32 << 31) / ((key >> 33) + 1) as f64)) as i64;
    }

    b as u32
}

fn validate(request: &CreateCollectionRequest, live_nodes: &[NodeId]) -> Result<()> {
    if live_nodes.is_empty() {
        return Err(ClusterError::Placement {
            reason: "no live nodes to place replicas on".to_string(),
        });
    }
    if request.num_shards == 0 {
        return Err(ClusterError::Placement {
            reason: format!("collection {} requests zero shards", request.name),
        });
    }
    if request.replicas_per_shard() == 0 {
        return Err(ClusterError::Placement {
            reason: format!("collection {} requests zero replicas per shard", request.name),
        });
    }
    Ok(())
}

/// Walk the live nodes in order, one replica at a time.
///
/// A shard's replicas land on distinct nodes whenever the shard has no more
/// replicas than there are live nodes.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoundRobinPlacement;

impl PlacementEngine for RoundRobinPlacement {
    fn build_replica_positions(
        &self,
        _state: &ClusterState,
        request: &CreateCollectionRequest,
        live_nodes: &[NodeId],
    ) -> Result<Vec<ReplicaPosition>> {
        validate(request, live_nodes)?;
        let mut positions = Vec::new();
        let mut next = 0usize;
        for shard in shard_names(request.num_shards) {
            for (replica_type, count) in request.type_counts() {
                for _ in 0..count {
                    positions.push(ReplicaPosition {
                        shard: shard.clone(),
                        node: live_nodes[next % live_nodes.len()].clone(),
                        replica_type,
                    });
                    next += 1;
                }
            }
        }
        Ok(positions)
    }
}

/// Anchor each shard on a hashed node, replicas on consecutive nodes.
///
/// The anchor is `jump_consistent_hash(xxhash64("<collection>/<shard>"))`
/// over the live-node count, so the same collection lands on the same nodes
/// given the same cluster size.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashSpreadPlacement;

impl PlacementEngine for HashSpreadPlacement {
    fn build_replica_positions(
        &self,
        _state: &ClusterState,
        request: &CreateCollectionRequest,
        live_nodes: &[NodeId],
    ) -> Result<Vec<ReplicaPosition>> {
        validate(request, live_nodes)?;
        let mut positions = Vec::new();
        for shard in shard_names(request.num_shards) {
            let key = format!("{}/{}", request.name, shard);
            let anchor = jump_consistent_hash(xxhash64(key.as_bytes()), live_nodes.len() as u32);
            let mut offset = 0usize;
            for (replica_type, count) in request.type_counts() {
                for _ in 0..count {
                    let index = (anchor as usize + offset) % live_nodes.len();
                    positions.push(ReplicaPosition {
                        shard: shard.clone(),
                        node: live_nodes[index].clone(),
                        replica_type,
                    });
                    offset += 1;
                }
            }
        }
        Ok(positions)
    }
}
