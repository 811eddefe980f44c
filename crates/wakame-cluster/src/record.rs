//! The authoritative mutable replica entity owned by the state provider.
//!
//! External components never see `ReplicaRecord` directly; they observe the
//! derived [`Replica`](crate::state::Replica) views in snapshots.

use crate::types::{props, NodeId, PropMap, ReplicaState, ReplicaType};
use serde_json::Value;

/// One replica of one shard, placed on one node.
///
/// Identity fields (`name`, `core`, `collection`, `shard`, `node`, type) are
/// fixed at creation; everything else lives in the `variables` bag, keyed by
/// the well-known [`props`] constants plus whatever callers add.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicaRecord {
    name: String,
    core: String,
    collection: String,
    shard: String,
    replica_type: ReplicaType,
    node: NodeId,
    variables: PropMap,
}

impl ReplicaRecord {
    pub fn new(
        name: impl Into<String>,
        core: impl Into<String>,
        collection: impl Into<String>,
        shard: impl Into<String>,
        replica_type: ReplicaType,
        node: NodeId,
    ) -> Self {
        Self {
            name: name.into(),
            core: core.into(),
            collection: collection.into(),
            shard: shard.into(),
            replica_type,
            node,
            variables: PropMap::new(),
        }
    }

    pub fn with_variables(mut self, variables: PropMap) -> Self {
        self.variables = variables;
        self
    }

    /// Cluster-unique replica id, e.g. `core_node3`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cluster-unique core name, e.g. `events_shard1_replica_n2`.
    pub fn core(&self) -> &str {
        &self.core
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn shard(&self) -> &str {
        &self.shard
    }

    pub fn replica_type(&self) -> ReplicaType {
        self.replica_type
    }

    pub fn node(&self) -> &NodeId {
        &self.node
    }

    pub fn variables(&self) -> &PropMap {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut PropMap {
        &mut self.variables
    }

    /// Current lifecycle state; a missing or unparseable `state` variable
    /// reads as `Down`.
    pub fn state(&self) -> ReplicaState {
        self.variables
            .get(props::STATE)
            .and_then(Value::as_str)
            .and_then(ReplicaState::parse)
            .unwrap_or(ReplicaState::Down)
    }

    pub fn set_state(&mut self, state: ReplicaState) {
        self.variables
            .insert(props::STATE.to_string(), Value::from(state.as_str()));
    }

    pub fn is_leader(&self) -> bool {
        self.variables.contains_key(props::LEADER)
    }

    pub fn set_leader(&mut self) {
        self.variables
            .insert(props::LEADER.to_string(), Value::from("true"));
    }

    pub fn clear_leader(&mut self) {
        self.variables.remove(props::LEADER);
    }
}
