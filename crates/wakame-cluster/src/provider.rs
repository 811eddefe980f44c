//! The simulated cluster-state provider.
//!
//! Owns the authoritative state of a simulated cluster: which nodes are
//! live, which replicas exist and where, and the cluster / collection /
//! slice property maps. All structural state lives in [`CoreState`] behind a
//! single mutex; every mutator holds it for the whole of its structural
//! change. Follow-up leader elections are enqueued on the executor before
//! the lock is released and run after the mutator returns, so callers
//! synchronise through [`wait_for_state`](SimClusterStateProvider::wait_for_state),
//! never via shared flags.

use crate::assign;
use crate::builder::build_cluster_state;
use crate::config::SimClusterConfig;
use crate::election::elect_leaders;
use crate::error::{ClusterError, Result};
use crate::executor::TaskExecutor;
use crate::manager::DistribStateManager;
use crate::node_values::NodeStateProvider;
use crate::placement::{CreateCollectionRequest, PlacementEngine};
use crate::publish::{publish_properties_locked, publish_state_locked};
use crate::record::ReplicaRecord;
use crate::state::{ClusterState, CollectionState};
use crate::time::TimeSource;
use crate::types::{props, NodeId, PropMap, ReplicaState, ReplicaType};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Results of an admin command (create / delete / move).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandResults {
    /// Echo of the request's async id, when one was given.
    pub request_id: Option<String>,
    pub success: bool,
}

impl CommandResults {
    fn with_request_id(request_id: Option<String>) -> Self {
        Self {
            request_id,
            success: false,
        }
    }
}

/// Parameters of a replica-move operation.
#[derive(Debug, Clone)]
pub struct MoveReplicaRequest {
    pub collection: String,
    pub replica: String,
    pub target_node: NodeId,
    pub async_id: Option<String>,
}

/// All structural state, guarded by the provider's single lock.
pub(crate) struct CoreState {
    /// node → ordered list of replica records; the authoritative store.
    pub(crate) node_replicas: BTreeMap<NodeId, Vec<ReplicaRecord>>,
    pub(crate) live_nodes: BTreeSet<NodeId>,
    pub(crate) cluster_properties: PropMap,
    pub(crate) collection_properties: BTreeMap<String, PropMap>,
    pub(crate) slice_properties: BTreeMap<String, BTreeMap<String, PropMap>>,
    pub(crate) last_published_state: Option<ClusterState>,
    pub(crate) last_published_properties: Option<PropMap>,
}

impl CoreState {
    pub(crate) fn new() -> Self {
        Self {
            node_replicas: BTreeMap::new(),
            live_nodes: BTreeSet::new(),
            cluster_properties: PropMap::new(),
            collection_properties: BTreeMap::new(),
            slice_properties: BTreeMap::new(),
            last_published_state: None,
            last_published_properties: None,
        }
    }
}

pub(crate) struct ProviderInner {
    pub(crate) state: Mutex<CoreState>,
    /// Serializes elections; always taken before the state lock.
    pub(crate) election_lock: Mutex<()>,
    pub(crate) rng: Mutex<StdRng>,
    pub(crate) state_manager: Arc<dyn DistribStateManager>,
    pub(crate) node_values: Arc<dyn NodeStateProvider>,
    pub(crate) placement: Arc<dyn PlacementEngine>,
    pub(crate) executor: Arc<dyn TaskExecutor>,
    pub(crate) time_source: Arc<dyn TimeSource>,
    pub(crate) poll_interval: Duration,
}

impl ProviderInner {
    /// Re-elect leaders for the given collections. Holds the election lock
    /// for the whole procedure so overlapping elections are strictly
    /// ordered.
    pub(crate) fn run_election(
        &self,
        collections: &BTreeSet<String>,
        publish_first: bool,
    ) -> Result<()> {
        let _serialize = self.election_lock.lock();
        let mut state = self.state.lock();
        if publish_first {
            publish_state_locked(self.state_manager.as_ref(), &mut state)?;
        }
        let snapshot = build_cluster_state(&mut state);
        let mut rng = self.rng.lock();
        elect_leaders(&mut state, &snapshot, collections, &mut rng)
    }
}

/// In-memory, deterministic stand-in for a cluster's metadata plane.
///
/// Starts empty: zero live nodes, zero replicas. Populate it with
/// [`set_cluster_state`](Self::set_cluster_state) or by adding nodes and
/// collections.
pub struct SimClusterStateProvider {
    pub(crate) inner: Arc<ProviderInner>,
}

impl SimClusterStateProvider {
    pub fn new(
        config: SimClusterConfig,
        state_manager: Arc<dyn DistribStateManager>,
        node_values: Arc<dyn NodeStateProvider>,
        placement: Arc<dyn PlacementEngine>,
        executor: Arc<dyn TaskExecutor>,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                state: Mutex::new(CoreState::new()),
                election_lock: Mutex::new(()),
                rng: Mutex::new(StdRng::seed_from_u64(config.seed)),
                state_manager,
                node_values,
                placement,
                executor,
                time_source,
                poll_interval: config.poll_interval,
            }),
        }
    }

    // ---- setup ----

    /// Wipe all internal maps and repopulate them from the given snapshot,
    /// then publish. Replicas hosted on nodes outside the snapshot's live
    /// set are not indexed; `cores` telemetry is re-synced to the new lists.
    pub fn set_cluster_state(&self, initial: &ClusterState) -> Result<()> {
        let mut state = self.inner.state.lock();
        state.collection_properties.clear();
        state.slice_properties.clear();
        state.node_replicas.clear();
        state.live_nodes = initial.live_nodes().clone();
        for node in initial.live_nodes() {
            state.node_replicas.entry(node.clone()).or_default();
        }

        for (collection, coll_state) in initial.collections() {
            state
                .collection_properties
                .entry(collection.clone())
                .or_default()
                .extend(coll_state.properties().clone());
            for (shard, slice) in coll_state.slices() {
                state
                    .slice_properties
                    .entry(collection.clone())
                    .or_default()
                    .entry(shard.clone())
                    .or_default()
                    .extend(slice.properties().clone());
                for (replica_name, replica) in slice.replicas() {
                    let node = replica.node_name().ok_or_else(|| {
                        ClusterError::InvalidRequest {
                            reason: format!("replica {replica_name} has no node_name"),
                        }
                    })?;
                    if !state.live_nodes.contains(&node) {
                        continue;
                    }
                    let core = replica
                        .core()
                        .ok_or_else(|| ClusterError::InvalidRequest {
                            reason: format!("replica {replica_name} has no core"),
                        })?
                        .to_string();
                    let replica_type = replica.replica_type().unwrap_or(ReplicaType::Nrt);
                    let mut variables = replica.properties().clone();
                    variables.remove(props::NODE_NAME);
                    variables.remove(props::CORE);
                    variables.remove(props::TYPE);
                    let record = ReplicaRecord::new(
                        replica_name.clone(),
                        core,
                        collection.clone(),
                        shard.clone(),
                        replica_type,
                        node.clone(),
                    )
                    .with_variables(variables);
                    state.node_replicas.entry(node).or_default().push(record);
                }
            }
        }

        for (node, records) in &state.node_replicas {
            if state.live_nodes.contains(node) {
                self.inner.node_values.set_node_value(
                    node,
                    props::CORES,
                    Value::from(records.len() as u64),
                );
            }
        }

        publish_state_locked(self.inner.state_manager.as_ref(), &mut state)?;
        Ok(())
    }

    // ---- node membership ----

    /// Add a node to the live set. Returns true when its replica list was
    /// newly created.
    pub fn add_node(&self, node: &NodeId) -> Result<bool> {
        let mut state = self.inner.state.lock();
        if state.live_nodes.contains(node) {
            return Err(ClusterError::NodeAlreadyLive { node: node.clone() });
        }
        state.live_nodes.insert(node.clone());
        let created = !state.node_replicas.contains_key(node);
        state.node_replicas.entry(node.clone()).or_default();
        Ok(created)
    }

    /// Remove a node from the live set, marking every replica on it as down
    /// and scheduling a leader election over the affected collections.
    /// Returns whether the node was live.
    pub fn remove_node(&self, node: &NodeId) -> Result<bool> {
        let mut state = self.inner.state.lock();
        let mut collections = BTreeSet::new();
        if let Some(records) = state.node_replicas.get_mut(node) {
            for record in records.iter_mut() {
                record.set_state(ReplicaState::Down);
                collections.insert(record.collection().to_string());
            }
        }
        let was_live = state.live_nodes.remove(node);
        self.schedule_election(collections);
        Ok(was_live)
    }

    // ---- replicas ----

    /// Append a replica to a live node's list, marking it active and
    /// bumping the node's `cores` counter. Fails on a duplicate core name or
    /// a non-live node, leaving state unchanged.
    pub fn add_replica(
        &self,
        node: &NodeId,
        record: ReplicaRecord,
        run_election: bool,
    ) -> Result<()> {
        let collection = record.collection().to_string();
        let mut state = self.inner.state.lock();
        self.add_replica_locked(&mut state, node, record)?;
        if run_election {
            self.schedule_election([collection].into_iter().collect());
        }
        Ok(())
    }

    fn add_replica_locked(
        &self,
        state: &mut CoreState,
        node: &NodeId,
        mut record: ReplicaRecord,
    ) -> Result<()> {
        if record.node() != node {
            return Err(ClusterError::InvalidRequest {
                reason: format!(
                    "record for {} names node {} but is being added to {node}",
                    record.name(),
                    record.node()
                ),
            });
        }
        for (host, records) in &state.node_replicas {
            if records.iter().any(|r| r.core() == record.core()) {
                return Err(ClusterError::DuplicateCore {
                    core: record.core().to_string(),
                    node: host.clone(),
                });
            }
        }
        if !state.live_nodes.contains(node) {
            return Err(ClusterError::NodeNotLive { node: node.clone() });
        }
        record.set_state(ReplicaState::Active);
        state.node_replicas.entry(node.clone()).or_default().push(record);

        let cores = self.node_value_i64(node, props::CORES).unwrap_or(0);
        self.inner
            .node_values
            .set_node_value(node, props::CORES, Value::from(cores + 1));
        Ok(())
    }

    /// Remove the named replica from a node's list, decrementing the node's
    /// `cores` counter when the node is live, and schedule a leader election
    /// over the replica's collection.
    pub fn remove_replica(&self, node: &NodeId, replica_name: &str) -> Result<()> {
        let mut state = self.inner.state.lock();
        let records =
            state
                .node_replicas
                .get_mut(node)
                .ok_or_else(|| ClusterError::ReplicaNotFound {
                    replica: replica_name.to_string(),
                    node: node.clone(),
                })?;
        let position = records
            .iter()
            .position(|r| r.name() == replica_name)
            .ok_or_else(|| ClusterError::ReplicaNotFound {
                replica: replica_name.to_string(),
                node: node.clone(),
            })?;
        let record = records.remove(position);

        if state.live_nodes.contains(node) {
            match self.node_value_i64(node, props::CORES) {
                Some(cores) if cores > 0 => {
                    self.inner
                        .node_values
                        .set_node_value(node, props::CORES, Value::from(cores - 1));
                }
                other => {
                    return Err(ClusterError::InvariantViolation {
                        reason: format!("unexpected cores value {other:?} on node {node}"),
                    });
                }
            }
        }
        self.schedule_election([record.collection().to_string()].into_iter().collect());
        Ok(())
    }

    // ---- collections ----

    /// Create a collection: ask the placement engine for positions, mint
    /// core and replica names, add every replica, then schedule one leader
    /// election for the collection.
    pub fn create_collection(&self, request: CreateCollectionRequest) -> Result<CommandResults> {
        let mut results = CommandResults::with_request_id(request.async_id.clone());
        info!(
            "creating collection {} ({} shards, {} replicas per shard)",
            request.name,
            request.num_shards,
            request.replicas_per_shard()
        );
        let snapshot = self.cluster_state();
        let live: Vec<NodeId> = snapshot.live_nodes().iter().cloned().collect();
        let positions =
            self.inner
                .placement
                .build_replica_positions(&snapshot, &request, &live)?;

        let mut replica_num = 1u32;
        for position in positions {
            let core = format!(
                "{}_{}_replica_{}{}",
                request.name,
                position.shard,
                position.replica_type.core_suffix(),
                replica_num
            );
            replica_num += 1;
            let id = assign::inc_and_get_id(self.inner.state_manager.as_ref(), &request.name)?;
            let mut record = ReplicaRecord::new(
                format!("core_node{id}"),
                core,
                request.name.clone(),
                position.shard.clone(),
                position.replica_type,
                position.node.clone(),
            );
            record
                .variables_mut()
                .insert(props::SHARD.to_string(), Value::from(position.shard));
            self.add_replica(&position.node, record, false)?;
        }

        self.schedule_election([request.name.clone()].into_iter().collect());
        results.success = true;
        Ok(results)
    }

    /// Delete a collection: drop its property entries, remove every matching
    /// record, decrement `cores` by the removed count per node, and publish.
    pub fn delete_collection(
        &self,
        collection: &str,
        async_id: Option<&str>,
    ) -> Result<CommandResults> {
        let mut results = CommandResults::with_request_id(async_id.map(str::to_string));
        info!("deleting collection {collection}");
        let mut state = self.inner.state.lock();
        state.collection_properties.remove(collection);
        state.slice_properties.remove(collection);

        let mut removed_per_node: Vec<(NodeId, usize)> = Vec::new();
        for (node, records) in state.node_replicas.iter_mut() {
            let before = records.len();
            records.retain(|r| r.collection() != collection);
            let removed = before - records.len();
            if removed > 0 {
                removed_per_node.push((node.clone(), removed));
            }
        }
        for (node, removed) in removed_per_node {
            // A missing cores value means the node is gone; nothing to sync.
            if let Some(cores) = self.node_value_i64(&node, props::CORES) {
                if cores < removed as i64 {
                    return Err(ClusterError::InvariantViolation {
                        reason: format!(
                            "cores underflow on node {node}: {cores} < {removed}"
                        ),
                    });
                }
                self.inner.node_values.set_node_value(
                    &node,
                    props::CORES,
                    Value::from(cores - removed as i64),
                );
            }
        }

        publish_state_locked(self.inner.state_manager.as_ref(), &mut state)?;
        results.success = true;
        Ok(results)
    }

    /// Remove every collection: clear all replica lists and collection/slice
    /// properties, zero every node's `cores` counter, and publish.
    pub fn delete_all_collections(&self) -> Result<()> {
        let mut state = self.inner.state.lock();
        for records in state.node_replicas.values_mut() {
            records.clear();
        }
        state.collection_properties.clear();
        state.slice_properties.clear();
        for node in self.inner.node_values.all_node_values().keys() {
            self.inner
                .node_values
                .set_node_value(node, props::CORES, Value::from(0));
        }
        publish_state_locked(self.inner.state_manager.as_ref(), &mut state)?;
        Ok(())
    }

    /// Move a replica to another node by adding a fresh NRT replica there
    /// and removing the original; the remove's scheduled election covers the
    /// move.
    pub fn move_replica(&self, request: &MoveReplicaRequest) -> Result<CommandResults> {
        let mut results = CommandResults::with_request_id(request.async_id.clone());
        let snapshot = self.cluster_state();
        let coll = snapshot
            .collection(&request.collection)
            .ok_or_else(|| ClusterError::CollectionNotFound {
                collection: request.collection.clone(),
            })?;
        let (slice, replica) = coll
            .slices()
            .values()
            .find_map(|s| s.replica(&request.replica).map(|r| (s, r)))
            .ok_or_else(|| ClusterError::ReplicaNotInCollection {
                replica: request.replica.clone(),
                collection: request.collection.clone(),
            })?;
        let source = replica
            .node_name()
            .ok_or_else(|| ClusterError::InvariantViolation {
                reason: format!("replica {} has no node_name", request.replica),
            })?;
        info!(
            "moving replica {} of {} from {source} to {}",
            request.replica, request.collection, request.target_node
        );

        let manager = self.inner.state_manager.as_ref();
        let core =
            assign::build_core_name(manager, &request.collection, slice.name(), ReplicaType::Nrt)?;
        let name = assign::assign_core_node_name(manager, &request.collection)?;
        let record = ReplicaRecord::new(
            name,
            core,
            request.collection.clone(),
            slice.name(),
            ReplicaType::Nrt,
            request.target_node.clone(),
        );
        self.add_replica(&request.target_node, record, false)?;
        self.remove_replica(&source, &request.replica)?;
        results.success = true;
        Ok(results)
    }

    // ---- properties ----

    /// Replace the cluster-wide property map and publish it.
    pub fn set_cluster_properties(&self, properties: PropMap) -> Result<()> {
        let mut state = self.inner.state.lock();
        state.cluster_properties = properties;
        publish_properties_locked(self.inner.state_manager.as_ref(), &mut state)?;
        Ok(())
    }

    /// Set (or, with `None`, remove) one cluster property and publish.
    pub fn set_cluster_property(&self, key: &str, value: Option<Value>) -> Result<()> {
        let mut state = self.inner.state.lock();
        match value {
            Some(value) => {
                state.cluster_properties.insert(key.to_string(), value);
            }
            None => {
                state.cluster_properties.remove(key);
            }
        }
        publish_properties_locked(self.inner.state_manager.as_ref(), &mut state)?;
        Ok(())
    }

    /// Replace a collection's property map; `None` removes the entry
    /// entirely. Publishes the cluster snapshot.
    pub fn set_collection_properties(
        &self,
        collection: &str,
        properties: Option<PropMap>,
    ) -> Result<()> {
        let mut state = self.inner.state.lock();
        match properties {
            None => {
                state.collection_properties.remove(collection);
            }
            Some(properties) => {
                let entry = state
                    .collection_properties
                    .entry(collection.to_string())
                    .or_default();
                *entry = properties;
            }
        }
        publish_state_locked(self.inner.state_manager.as_ref(), &mut state)?;
        Ok(())
    }

    /// Set (or, with `None`, remove) one collection property and publish.
    pub fn set_collection_property(
        &self,
        collection: &str,
        key: &str,
        value: Option<Value>,
    ) -> Result<()> {
        let mut state = self.inner.state.lock();
        let entry = state
            .collection_properties
            .entry(collection.to_string())
            .or_default();
        match value {
            Some(value) => {
                entry.insert(key.to_string(), value);
            }
            None => {
                entry.remove(key);
            }
        }
        publish_state_locked(self.inner.state_manager.as_ref(), &mut state)?;
        Ok(())
    }

    /// Replace a slice's property map; `None` clears it. Publishes the
    /// cluster snapshot.
    pub fn set_slice_properties(
        &self,
        collection: &str,
        slice: &str,
        properties: Option<PropMap>,
    ) -> Result<()> {
        let mut state = self.inner.state.lock();
        let entry = state
            .slice_properties
            .entry(collection.to_string())
            .or_default()
            .entry(slice.to_string())
            .or_default();
        *entry = properties.unwrap_or_default();
        publish_state_locked(self.inner.state_manager.as_ref(), &mut state)?;
        Ok(())
    }

    // ---- elections / publication ----

    /// Synchronously re-elect leaders for the given collections.
    pub fn run_leader_election(
        &self,
        collections: &BTreeSet<String>,
        publish_first: bool,
    ) -> Result<()> {
        self.inner.run_election(collections, publish_first)
    }

    /// Publish the current snapshot; a snapshot equal to the last published
    /// one performs no external write.
    pub fn publish_state(&self) -> Result<ClusterState> {
        let mut state = self.inner.state.lock();
        publish_state_locked(self.inner.state_manager.as_ref(), &mut state)
    }

    /// Publish the cluster-wide property map.
    pub fn publish_cluster_properties(&self) -> Result<PropMap> {
        let mut state = self.inner.state.lock();
        publish_properties_locked(self.inner.state_manager.as_ref(), &mut state)
    }

    fn schedule_election(&self, collections: BTreeSet<String>) {
        let inner = Arc::downgrade(&self.inner);
        self.inner.executor.submit(Box::new(move || {
            let Some(inner) = inner.upgrade() else {
                return;
            };
            if let Err(e) = inner.run_election(&collections, true) {
                error!("scheduled leader election failed: {e}");
            }
        }));
    }

    // ---- read interface ----

    /// Materialise the current snapshot.
    pub fn cluster_state(&self) -> ClusterState {
        let mut state = self.inner.state.lock();
        build_cluster_state(&mut state)
    }

    pub fn live_nodes(&self) -> BTreeSet<NodeId> {
        self.inner.state.lock().live_nodes.clone()
    }

    pub fn cluster_properties(&self) -> PropMap {
        self.inner.state.lock().cluster_properties.clone()
    }

    /// The collection's placement policy name, read from its `policy`
    /// property.
    pub fn policy_name(&self, collection: &str) -> Option<String> {
        let mut state = self.inner.state.lock();
        state
            .collection_properties
            .entry(collection.to_string())
            .or_default()
            .get(props::POLICY)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// The collection's view out of a fresh snapshot, if it exists.
    pub fn collection_state(&self, collection: &str) -> Option<CollectionState> {
        self.cluster_state().collection(collection).cloned()
    }

    /// Names of all collections with at least one replica.
    pub fn list_collections(&self) -> Vec<String> {
        let state = self.inner.state.lock();
        let mut names = BTreeSet::new();
        for records in state.node_replicas.values() {
            for record in records {
                names.insert(record.collection().to_string());
            }
        }
        names.into_iter().collect()
    }

    /// Clones of the replica records hosted on a node; empty if the node is
    /// unknown.
    pub fn replica_infos_for_node(&self, node: &NodeId) -> Vec<ReplicaRecord> {
        self.inner
            .state
            .lock()
            .node_replicas
            .get(node)
            .cloned()
            .unwrap_or_default()
    }

    /// A uniformly random live node, or `None` when the live set is empty.
    pub fn random_live_node<R: Rng>(&self, rng: &mut R) -> Option<NodeId> {
        let state = self.inner.state.lock();
        if state.live_nodes.is_empty() {
            return None;
        }
        let nodes: Vec<&NodeId> = state.live_nodes.iter().collect();
        Some(nodes[rng.gen_range(0..nodes.len())].clone())
    }

    /// Alias resolution is intentionally not simulated.
    pub fn resolve_alias(&self, _alias: &str) -> Result<Vec<String>> {
        Err(ClusterError::Unsupported {
            operation: "resolve_alias",
        })
    }

    /// No-op; provided for interface conformance.
    pub fn connect(&self) {}

    /// No-op; provided for interface conformance.
    pub fn close(&self) {}

    fn node_value_i64(&self, node: &NodeId, key: &str) -> Option<i64> {
        self.inner
            .node_values
            .get_node_value(node, key)
            .and_then(|v| v.as_i64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::SimTaskExecutor;
    use crate::manager::InMemoryStateManager;
    use crate::node_values::SimNodeStateProvider;
    use crate::placement::ReplicaPosition;
    use crate::time::SimTimeSource;

    /// Engine that spreads one replica per position over the live nodes in
    /// order; enough for provider-level tests.
    struct FirstFitPlacement;

    impl PlacementEngine for FirstFitPlacement {
        fn build_replica_positions(
            &self,
            _state: &ClusterState,
            request: &CreateCollectionRequest,
            live_nodes: &[NodeId],
        ) -> Result<Vec<ReplicaPosition>> {
            if live_nodes.is_empty() {
                return Err(ClusterError::Placement {
                    reason: "no live nodes".to_string(),
                });
            }
            let mut positions = Vec::new();
            let mut next = 0usize;
            for shard in crate::placement::shard_names(request.num_shards) {
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

    fn provider() -> SimClusterStateProvider {
        SimClusterStateProvider::new(
            SimClusterConfig::default(),
            Arc::new(InMemoryStateManager::new()),
            Arc::new(SimNodeStateProvider::new()),
            Arc::new(FirstFitPlacement),
            Arc::new(SimTaskExecutor::new()),
            Arc::new(SimTimeSource::new()),
        )
    }

    #[test]
    fn test_add_node_twice_fails() {
        let provider = provider();
        let node = NodeId::new("n1");
        assert!(provider.add_node(&node).unwrap());
        assert!(matches!(
            provider.add_node(&node),
            Err(ClusterError::NodeAlreadyLive { .. })
        ));
    }

    #[test]
    fn test_remove_node_reports_liveness() {
        let provider = provider();
        let node = NodeId::new("n1");
        provider.add_node(&node).unwrap();
        assert!(provider.remove_node(&node).unwrap());
        assert!(!provider.remove_node(&node).unwrap());
    }

    #[test]
    fn test_add_replica_to_unknown_node_fails() {
        let provider = provider();
        let record = ReplicaRecord::new(
            "core_node1",
            "c_shard1_replica_n1",
            "c",
            "shard1",
            ReplicaType::Nrt,
            NodeId::new("ghost"),
        );
        assert!(matches!(
            provider.add_replica(&NodeId::new("ghost"), record, false),
            Err(ClusterError::NodeNotLive { .. })
        ));
    }

    #[test]
    fn test_resolve_alias_unsupported() {
        let provider = provider();
        assert!(matches!(
            provider.resolve_alias("anything"),
            Err(ClusterError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_list_collections_empty() {
        let provider = provider();
        assert!(provider.list_collections().is_empty());
    }
}
