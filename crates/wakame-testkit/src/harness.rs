//! Fully wired simulated cluster for tests.

use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use wakame_cluster::{
    cluster_shape, CollectionState, CommandResults, CreateCollectionRequest,
    InMemoryStateManager, NodeId, NodeStateProvider, PlacementEngine, Replica, Result,
    SimClusterConfig, SimClusterStateProvider, SimNodeStateProvider, SimTaskExecutor,
    SimTimeSource, Slice,
};
use wakame_placement::RoundRobinPlacement;

/// How long state waits may run, in simulated time.
pub const DEFAULT_WAIT: Duration = Duration::from_secs(90);

/// A provider wired against in-memory collaborators and a simulated clock.
///
/// Nodes named `<prefix>:<base_port + i>_sim` are added up front per the
/// config's `node_count`.
pub struct SimCluster {
    provider: SimClusterStateProvider,
    state_manager: Arc<InMemoryStateManager>,
    node_values: Arc<SimNodeStateProvider>,
    executor: Arc<SimTaskExecutor>,
    time: SimTimeSource,
    config: SimClusterConfig,
}

impl SimCluster {
    /// A cluster with `node_count` live nodes and round-robin placement.
    pub fn new(node_count: usize) -> Self {
        Self::with_config(SimClusterConfig::default().with_node_count(node_count))
    }

    pub fn with_config(config: SimClusterConfig) -> Self {
        Self::with_placement(config, Arc::new(RoundRobinPlacement))
    }

    pub fn with_placement(config: SimClusterConfig, placement: Arc<dyn PlacementEngine>) -> Self {
        let state_manager = Arc::new(InMemoryStateManager::new());
        let node_values = Arc::new(SimNodeStateProvider::new());
        let executor = Arc::new(SimTaskExecutor::new());
        let time = SimTimeSource::new();
        let provider = SimClusterStateProvider::new(
            config.clone(),
            state_manager.clone(),
            node_values.clone(),
            placement,
            executor.clone(),
            Arc::new(time.clone()),
        );
        let cluster = Self {
            provider,
            state_manager,
            node_values,
            executor,
            time,
            config,
        };
        for i in 0..cluster.config.node_count {
            cluster
                .provider
                .add_node(&cluster.node_name(i))
                .expect("fresh node must be addable");
        }
        cluster
    }

    /// Name of the i-th generated node.
    pub fn node_name(&self, i: usize) -> NodeId {
        NodeId::new(format!(
            "{}:{}_sim",
            self.config.node_name_prefix,
            self.config.base_port as usize + i
        ))
    }

    pub fn provider(&self) -> &SimClusterStateProvider {
        &self.provider
    }

    pub fn state_manager(&self) -> &Arc<InMemoryStateManager> {
        &self.state_manager
    }

    pub fn node_values(&self) -> &Arc<SimNodeStateProvider> {
        &self.node_values
    }

    pub fn time(&self) -> &SimTimeSource {
        &self.time
    }

    pub fn config(&self) -> &SimClusterConfig {
        &self.config
    }

    /// Block until every scheduled election submitted so far has run.
    pub fn drain_tasks(&self) {
        self.executor.drain();
    }

    /// The node's `cores` telemetry, or 0 when never set.
    pub fn cores(&self, node: &NodeId) -> i64 {
        self.node_values
            .get_node_value(node, wakame_cluster::types::props::CORES)
            .and_then(|v| v.as_i64())
            .unwrap_or(0)
    }

    /// Create a collection with `shards` shards and `replication` NRT
    /// replicas per shard.
    pub fn create_collection(
        &self,
        name: &str,
        shards: u32,
        replication: u32,
    ) -> Result<CommandResults> {
        self.provider
            .create_collection(CreateCollectionRequest::new(name, shards, replication))
    }

    /// Drain pending elections, then wait for the collection to reach the
    /// given shape within [`DEFAULT_WAIT`].
    pub fn wait_for_shape(&self, collection: &str, shards: usize, replicas: usize) -> Result<()> {
        self.drain_tasks();
        self.provider
            .wait_for_state(collection, DEFAULT_WAIT, cluster_shape(shards, replicas))
    }

    /// Current view of a collection; panics if it does not exist.
    pub fn collection_state(&self, collection: &str) -> CollectionState {
        self.provider
            .collection_state(collection)
            .unwrap_or_else(|| panic!("collection {collection} does not exist"))
    }
}

/// A reproducibly random shard of a collection; panics on a shardless
/// collection.
pub fn random_shard<'a, R: Rng>(collection: &'a CollectionState, rng: &mut R) -> &'a Slice {
    let mut shards: Vec<&Slice> = collection.slices().values().collect();
    assert!(
        !shards.is_empty(),
        "collection {} has no shards",
        collection.name()
    );
    shards.shuffle(rng);
    shards[0]
}

/// A reproducibly random replica of a slice; panics on an empty slice.
pub fn random_replica<'a, R: Rng>(slice: &'a Slice, rng: &mut R) -> &'a Replica {
    let mut replicas: Vec<&Replica> = slice.replicas().values().collect();
    assert!(!replicas.is_empty(), "slice {} has no replicas", slice.name());
    replicas.shuffle(rng);
    replicas[0]
}

/// A reproducibly random replica matching a predicate, if any does.
pub fn random_replica_matching<'a, R, P>(
    slice: &'a Slice,
    rng: &mut R,
    predicate: P,
) -> Option<&'a Replica>
where
    R: Rng,
    P: Fn(&Replica) -> bool,
{
    let mut replicas: Vec<&Replica> = slice.replicas().values().collect();
    replicas.shuffle(rng);
    replicas.into_iter().find(|r| predicate(r))
}
