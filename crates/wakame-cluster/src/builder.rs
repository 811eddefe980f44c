//! Snapshot materialisation.
//!
//! Builds an immutable [`ClusterState`] from the provider's internal maps.
//! Property maps are created on first reference so that repeated builds see
//! stable (if empty) entries.

use crate::provider::CoreState;
use crate::state::{ClusterState, CollectionState, Replica, Slice};
use crate::types::props;
use serde_json::Value;
use std::collections::BTreeMap;

/// Materialise the current snapshot. Given identical inputs the output
/// compares equal.
pub(crate) fn build_cluster_state(state: &mut CoreState) -> ClusterState {
    // Group every record by (collection, shard), deriving the outward view:
    // the record's variables plus its identity keys.
    let mut grouped: BTreeMap<String, BTreeMap<String, BTreeMap<String, Replica>>> =
        BTreeMap::new();
    for (node, records) in &state.node_replicas {
        for record in records {
            let mut properties = record.variables().clone();
            properties.insert(props::NODE_NAME.to_string(), Value::from(node.as_str()));
            properties.insert(props::CORE.to_string(), Value::from(record.core()));
            properties.insert(
                props::TYPE.to_string(),
                Value::from(record.replica_type().as_str()),
            );
            grouped
                .entry(record.collection().to_string())
                .or_default()
                .entry(record.shard().to_string())
                .or_default()
                .insert(
                    record.name().to_string(),
                    Replica::new(record.name(), properties),
                );
        }
    }

    let mut collections = BTreeMap::new();
    for (collection, shards) in grouped {
        let mut slices = BTreeMap::new();
        for (shard, replicas) in shards {
            let slice_properties = state
                .slice_properties
                .entry(collection.clone())
                .or_default()
                .entry(shard.clone())
                .or_default()
                .clone();
            slices.insert(shard.clone(), Slice::new(shard, replicas, slice_properties));
        }
        let collection_properties = state
            .collection_properties
            .entry(collection.clone())
            .or_default()
            .clone();
        collections.insert(
            collection.clone(),
            CollectionState::new(collection, slices, collection_properties),
        );
    }

    ClusterState::new(state.live_nodes.clone(), collections)
}
