//! Placement engine interface.
//!
//! The provider delegates the "where do new replicas go" decision to a
//! [`PlacementEngine`]; concrete engines live in the `wakame-placement`
//! crate. Engines must be deterministic for a given snapshot and request.

use crate::error::Result;
use crate::state::ClusterState;
use crate::types::{NodeId, ReplicaType};

/// One replica to be created: which shard, on which node, of which type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaPosition {
    pub shard: String,
    pub node: NodeId,
    pub replica_type: ReplicaType,
}

/// Parameters of a collection-create operation.
#[derive(Debug, Clone)]
pub struct CreateCollectionRequest {
    pub name: String,
    pub num_shards: u32,
    pub nrt_replicas: u32,
    pub tlog_replicas: u32,
    pub pull_replicas: u32,

    /// Echoed into the results as a request id when present.
    pub async_id: Option<String>,
}

impl CreateCollectionRequest {
    /// A request for `num_shards` shards with `replication_factor` NRT
    /// replicas each.
    pub fn new(name: impl Into<String>, num_shards: u32, replication_factor: u32) -> Self {
        Self {
            name: name.into(),
            num_shards,
            nrt_replicas: replication_factor,
            tlog_replicas: 0,
            pull_replicas: 0,
            async_id: None,
        }
    }

    pub fn with_tlog_replicas(mut self, count: u32) -> Self {
        self.tlog_replicas = count;
        self
    }

    pub fn with_pull_replicas(mut self, count: u32) -> Self {
        self.pull_replicas = count;
        self
    }

    pub fn with_async_id(mut self, id: impl Into<String>) -> Self {
        self.async_id = Some(id.into());
        self
    }

    /// Replicas per shard across all types.
    pub fn replicas_per_shard(&self) -> u32 {
        self.nrt_replicas + self.tlog_replicas + self.pull_replicas
    }

    /// Per-shard (type, count) pairs in assignment order.
    pub fn type_counts(&self) -> [(ReplicaType, u32); 3] {
        [
            (ReplicaType::Nrt, self.nrt_replicas),
            (ReplicaType::Tlog, self.tlog_replicas),
            (ReplicaType::Pull, self.pull_replicas),
        ]
    }
}

/// Computes replica positions for a new collection.
pub trait PlacementEngine: Send + Sync {
    /// Produce one position per replica of the new collection.
    ///
    /// `live_nodes` is the sorted live-node set at the time of the call;
    /// engines choose targets only from it.
    fn build_replica_positions(
        &self,
        state: &ClusterState,
        request: &CreateCollectionRequest,
        live_nodes: &[NodeId],
    ) -> Result<Vec<ReplicaPosition>>;
}

/// Generated shard names: `shard1` .. `shardN`.
pub fn shard_names(num_shards: u32) -> Vec<String> {
    (1..=num_shards).map(|i| format!("shard{i}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shard_names() {
        assert_eq!(shard_names(3), vec!["shard1", "shard2", "shard3"]);
        assert!(shard_names(0).is_empty());
    }

    #[test]
    fn test_replicas_per_shard() {
        let request = CreateCollectionRequest::new("c", 2, 2)
            .with_tlog_replicas(1)
            .with_pull_replicas(1);
        assert_eq!(request.replicas_per_shard(), 4);
    }
}
