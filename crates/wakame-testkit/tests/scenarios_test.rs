//! End-to-end scenarios against a fully wired simulated cluster.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use wakame_cluster::{
    ClusterError, MoveReplicaRequest, ReplicaState, SimClusterConfig, TimeSource,
};
use wakame_placement::HashSpreadPlacement;
use wakame_testkit::{
    assert_invariants, init_test_logging, random_replica, random_shard, SimCluster,
};

#[test]
fn test_create_two_by_two() {
    init_test_logging();
    let cluster = SimCluster::new(4);
    cluster.create_collection("events", 2, 2).unwrap();
    cluster.wait_for_shape("events", 2, 2).unwrap();

    let coll = cluster.collection_state("events");
    for slice in coll.slices().values() {
        let leaders = slice.replicas().values().filter(|r| r.is_leader()).count();
        assert_eq!(leaders, 1, "{} must have exactly one leader", slice.name());
    }

    // Cores per node equals the number of replicas hosted.
    for i in 0..4 {
        let node = cluster.node_name(i);
        let hosted = cluster.provider().replica_infos_for_node(&node).len() as i64;
        assert_eq!(cluster.cores(&node), hosted);
    }
    assert_invariants(&cluster);
}

#[test]
fn test_node_loss_triggers_reelection() {
    init_test_logging();
    let cluster = SimCluster::new(4);
    cluster.create_collection("events", 2, 2).unwrap();
    cluster.wait_for_shape("events", 2, 2).unwrap();

    let coll = cluster.collection_state("events");
    let victim = coll
        .slice("shard1")
        .unwrap()
        .leader()
        .unwrap()
        .node_name()
        .unwrap();

    assert!(cluster.provider().remove_node(&victim).unwrap());
    cluster.drain_tasks();

    let coll = cluster.collection_state("events");
    let slice = coll.slice("shard1").unwrap();
    let leader = slice.leader().expect("a surviving replica must lead");
    assert_ne!(leader.node_name().unwrap(), victim);
    assert_eq!(leader.state(), ReplicaState::Active);

    let dead = slice
        .replicas()
        .values()
        .find(|r| r.node_name().unwrap() == victim)
        .unwrap();
    assert_eq!(dead.state(), ReplicaState::Down);
    assert!(!dead.is_leader());
    assert_invariants(&cluster);
}

#[test]
fn test_move_preserves_replica_count() {
    init_test_logging();
    let cluster = SimCluster::new(3);
    cluster.create_collection("events", 1, 1).unwrap();
    cluster.wait_for_shape("events", 1, 1).unwrap();

    let coll = cluster.collection_state("events");
    let replica = coll
        .slice("shard1")
        .unwrap()
        .replicas()
        .values()
        .next()
        .unwrap()
        .clone();
    let source = replica.node_name().unwrap();
    let target = (0..3)
        .map(|i| cluster.node_name(i))
        .find(|n| *n != source)
        .unwrap();
    let source_cores = cluster.cores(&source);
    let target_cores = cluster.cores(&target);

    cluster
        .provider()
        .move_replica(&MoveReplicaRequest {
            collection: "events".to_string(),
            replica: replica.name().to_string(),
            target_node: target.clone(),
            async_id: None,
        })
        .unwrap();
    cluster.wait_for_shape("events", 1, 1).unwrap();

    assert_eq!(cluster.provider().replica_infos_for_node(&target).len(), 1);
    assert!(cluster.provider().replica_infos_for_node(&source).is_empty());
    assert_eq!(cluster.cores(&source), source_cores - 1);
    assert_eq!(cluster.cores(&target), target_cores + 1);
    assert_invariants(&cluster);
}

#[test]
fn test_delete_collection_releases_cores() {
    init_test_logging();
    let cluster = SimCluster::new(3);
    cluster.create_collection("events", 2, 2).unwrap();
    cluster.wait_for_shape("events", 2, 2).unwrap();

    let hosted: Vec<(usize, i64)> = (0..3).map(|i| (i, cluster.cores(&cluster.node_name(i)))).collect();
    assert!(hosted.iter().any(|(_, cores)| *cores > 0));

    cluster.provider().delete_collection("events", None).unwrap();
    cluster.drain_tasks();

    assert!(!cluster
        .provider()
        .list_collections()
        .contains(&"events".to_string()));
    for (i, _) in hosted {
        assert_eq!(cluster.cores(&cluster.node_name(i)), 0);
    }
    assert_invariants(&cluster);
}

#[test]
fn test_duplicate_core_rejected() {
    init_test_logging();
    let cluster = SimCluster::new(2);
    cluster.create_collection("events", 1, 1).unwrap();
    cluster.wait_for_shape("events", 1, 1).unwrap();
    let before = cluster.provider().cluster_state();

    let coll = cluster.collection_state("events");
    let existing_core = coll
        .slice("shard1")
        .unwrap()
        .replicas()
        .values()
        .next()
        .unwrap()
        .core()
        .unwrap()
        .to_string();

    let node = cluster.node_name(1);
    let record = wakame_cluster::ReplicaRecord::new(
        "core_node99",
        existing_core,
        "events",
        "shard1",
        wakame_cluster::ReplicaType::Nrt,
        node.clone(),
    );
    let err = cluster
        .provider()
        .add_replica(&node, record, true)
        .unwrap_err();
    assert!(matches!(err, ClusterError::DuplicateCore { .. }));

    cluster.drain_tasks();
    assert_eq!(cluster.provider().cluster_state(), before);
    assert_invariants(&cluster);
}

#[test]
fn test_waiter_timeout_advances_simulated_clock() {
    init_test_logging();
    let cluster = SimCluster::new(2);
    cluster.create_collection("events", 1, 1).unwrap();
    cluster.drain_tasks();

    let start = cluster.time().now_millis();
    let err = cluster
        .provider()
        .wait_for_state("events", Duration::from_secs(1), |_, _| false)
        .unwrap_err();
    match err {
        ClusterError::WaitTimeout {
            live_nodes,
            last_state,
            elapsed_ms,
            ..
        } => {
            assert_eq!(elapsed_ms, 1000);
            assert_eq!(live_nodes.len(), 2);
            let last = last_state.expect("collection existed at timeout");
            assert_eq!(last.slices().len(), 1);
        }
        other => panic!("expected WaitTimeout, got {other:?}"),
    }
    assert_eq!(cluster.time().now_millis() - start, 1000);
}

#[test]
fn test_hash_spread_cluster_reaches_shape() {
    init_test_logging();
    let cluster = SimCluster::with_placement(
        SimClusterConfig::default().with_node_count(5),
        Arc::new(HashSpreadPlacement),
    );
    cluster.create_collection("events", 3, 2).unwrap();
    cluster.wait_for_shape("events", 3, 2).unwrap();
    assert_invariants(&cluster);
}

#[test]
fn test_mixed_replica_types_elect_leaders() {
    init_test_logging();
    let cluster = SimCluster::new(3);
    cluster
        .provider()
        .create_collection(
            wakame_cluster::CreateCollectionRequest::new("events", 1, 1)
                .with_tlog_replicas(1)
                .with_pull_replicas(1),
        )
        .unwrap();
    cluster.wait_for_shape("events", 1, 3).unwrap();

    let coll = cluster.collection_state("events");
    let slice = coll.slice("shard1").unwrap();
    assert_eq!(slice.replicas().len(), 3);
    assert!(slice.leader().is_some());
    assert_invariants(&cluster);
}

#[test]
fn test_killing_every_node_leaves_slice_leaderless() {
    init_test_logging();
    let cluster = SimCluster::new(2);
    cluster.create_collection("events", 1, 2).unwrap();
    cluster.wait_for_shape("events", 1, 2).unwrap();

    for i in 0..2 {
        cluster.provider().remove_node(&cluster.node_name(i)).unwrap();
    }
    cluster.drain_tasks();

    let coll = cluster.collection_state("events");
    let slice = coll.slice("shard1").unwrap();
    assert!(slice.leader().is_none());
    for replica in slice.replicas().values() {
        assert_eq!(replica.state(), ReplicaState::Down);
    }
    assert_invariants(&cluster);
}

#[test]
fn test_random_pickers_respect_predicate() {
    init_test_logging();
    let cluster = SimCluster::new(3);
    cluster.create_collection("events", 2, 2).unwrap();
    cluster.wait_for_shape("events", 2, 2).unwrap();

    let coll = cluster.collection_state("events");
    let mut rng = StdRng::seed_from_u64(5);
    let shard = random_shard(&coll, &mut rng);
    let replica = random_replica(shard, &mut rng);
    assert!(shard.replica(replica.name()).is_some());

    let leader =
        wakame_testkit::random_replica_matching(shard, &mut rng, |r| r.is_leader()).unwrap();
    assert!(leader.is_leader());
}
