//! Immutable cluster-state views.
//!
//! A [`ClusterState`] is a point-in-time snapshot materialised from the
//! provider's internal maps: the live-node set plus, per collection, a map of
//! shard → [`Slice`] where each slice carries its [`Replica`] views and
//! properties. Snapshots serialize to the canonical JSON layout written to
//! the external state manager.

use crate::types::{props, NodeId, PropMap, ReplicaState, ReplicaType};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Default routing policy attached to every collection view.
pub const DEFAULT_ROUTER: &str = "compositeId";

/// Outward view of one replica.
///
/// The properties bag embeds the backing record's variables plus the
/// `node_name`, `core` and `type` identity keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Replica {
    #[serde(skip)]
    name: String,

    #[serde(flatten)]
    properties: PropMap,
}

impl Replica {
    pub fn new(name: impl Into<String>, properties: PropMap) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &PropMap {
        &self.properties
    }

    pub fn node_name(&self) -> Option<NodeId> {
        self.properties
            .get(props::NODE_NAME)
            .and_then(Value::as_str)
            .map(NodeId::new)
    }

    pub fn core(&self) -> Option<&str> {
        self.properties.get(props::CORE).and_then(Value::as_str)
    }

    pub fn replica_type(&self) -> Option<ReplicaType> {
        self.properties
            .get(props::TYPE)
            .and_then(Value::as_str)
            .and_then(ReplicaType::parse)
    }

    /// Lifecycle state; missing or unparseable reads as `Down`.
    pub fn state(&self) -> ReplicaState {
        self.properties
            .get(props::STATE)
            .and_then(Value::as_str)
            .and_then(ReplicaState::parse)
            .unwrap_or(ReplicaState::Down)
    }

    pub fn is_leader(&self) -> bool {
        self.properties.contains_key(props::LEADER)
    }

    /// Active and hosted on a live node.
    pub fn is_active(&self, live_nodes: &BTreeSet<NodeId>) -> bool {
        self.state() == ReplicaState::Active
            && self
                .node_name()
                .map_or(false, |node| live_nodes.contains(&node))
    }
}

/// One shard of a collection: its replicas plus slice properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    #[serde(skip)]
    name: String,

    replicas: BTreeMap<String, Replica>,

    #[serde(flatten)]
    properties: PropMap,
}

impl Slice {
    pub fn new(
        name: impl Into<String>,
        replicas: BTreeMap<String, Replica>,
        properties: PropMap,
    ) -> Self {
        Self {
            name: name.into(),
            replicas,
            properties,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn replicas(&self) -> &BTreeMap<String, Replica> {
        &self.replicas
    }

    pub fn properties(&self) -> &PropMap {
        &self.properties
    }

    pub fn replica(&self, name: &str) -> Option<&Replica> {
        self.replicas.get(name)
    }

    /// The replica carrying the leader flag, if any.
    pub fn leader(&self) -> Option<&Replica> {
        self.replicas.values().find(|r| r.is_leader())
    }
}

/// Routing policy of a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Router {
    pub name: String,
}

impl Default for Router {
    fn default() -> Self {
        Router {
            name: DEFAULT_ROUTER.to_string(),
        }
    }
}

/// Point-in-time view of one collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionState {
    #[serde(skip)]
    name: String,

    #[serde(rename = "shards")]
    slices: BTreeMap<String, Slice>,

    properties: PropMap,

    router: Router,

    #[serde(skip)]
    version: i32,
}

impl CollectionState {
    pub fn new(
        name: impl Into<String>,
        slices: BTreeMap<String, Slice>,
        properties: PropMap,
    ) -> Self {
        Self {
            name: name.into(),
            slices,
            properties,
            router: Router::default(),
            version: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slices(&self) -> &BTreeMap<String, Slice> {
        &self.slices
    }

    pub fn slice(&self, name: &str) -> Option<&Slice> {
        self.slices.get(name)
    }

    pub fn properties(&self) -> &PropMap {
        &self.properties
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    /// Search every slice for a replica by name.
    pub fn replica(&self, name: &str) -> Option<&Replica> {
        self.slices.values().find_map(|s| s.replica(name))
    }

    /// The slice containing the named replica.
    pub fn slice_of_replica(&self, name: &str) -> Option<&Slice> {
        self.slices.values().find(|s| s.replica(name).is_some())
    }
}

/// Immutable snapshot of the whole cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterState {
    version: i32,

    #[serde(rename = "liveNodes")]
    live_nodes: BTreeSet<NodeId>,

    collections: BTreeMap<String, CollectionState>,
}

impl ClusterState {
    pub fn new(
        live_nodes: BTreeSet<NodeId>,
        collections: BTreeMap<String, CollectionState>,
    ) -> Self {
        Self {
            version: 0,
            live_nodes,
            collections,
        }
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn live_nodes(&self) -> &BTreeSet<NodeId> {
        &self.live_nodes
    }

    pub fn collections(&self) -> &BTreeMap<String, CollectionState> {
        &self.collections
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionState> {
        self.collections.get(name)
    }
}
