//! Per-node telemetry provider.
//!
//! The core only reads and writes the `cores` counter (number of cores a
//! node hosts); everything else in a node's value map belongs to outer
//! layers such as autoscaling policies.

use crate::types::{NodeId, PropMap};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;

/// Read/write access to per-node values.
pub trait NodeStateProvider: Send + Sync {
    /// A single value for a node; `None` if the node or key is unknown.
    fn get_node_value(&self, node: &NodeId, key: &str) -> Option<Value>;

    /// Set a single value, creating the node's map on first write.
    fn set_node_value(&self, node: &NodeId, key: &str, value: Value);

    /// Snapshot of every node's value map.
    fn all_node_values(&self) -> BTreeMap<NodeId, PropMap>;
}

/// In-memory telemetry store for simulation.
#[derive(Debug, Default)]
pub struct SimNodeStateProvider {
    values: Mutex<BTreeMap<NodeId, PropMap>>,
}

impl SimNodeStateProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NodeStateProvider for SimNodeStateProvider {
    fn get_node_value(&self, node: &NodeId, key: &str) -> Option<Value> {
        self.values.lock().get(node).and_then(|m| m.get(key)).cloned()
    }

    fn set_node_value(&self, node: &NodeId, key: &str, value: Value) {
        self.values
            .lock()
            .entry(node.clone())
            .or_default()
            .insert(key.to_string(), value);
    }

    fn all_node_values(&self) -> BTreeMap<NodeId, PropMap> {
        self.values.lock().clone()
    }
}
