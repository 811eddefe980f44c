//! Error types for the simulated cluster-state provider.

use crate::state::CollectionState;
use crate::types::NodeId;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors surfaced by the cluster-state provider and its collaborators.
///
/// Precondition violations (duplicate core, non-live node, missing replica)
/// are caller bugs and leave state unchanged. `InvariantViolation` marks an
/// internal inconsistency and is not recoverable.
#[derive(Error, Debug)]
pub enum ClusterError {
    /// A replica with this core name already exists somewhere in the cluster.
    #[error("Duplicate core {core} already hosted on node {node}")]
    DuplicateCore { core: String, node: NodeId },

    /// The target node is not in the live set.
    #[error("Target node {node} is not live")]
    NodeNotLive { node: NodeId },

    /// The node is already live.
    #[error("Node {node} already exists")]
    NodeAlreadyLive { node: NodeId },

    /// No replica with this name on the given node.
    #[error("Replica {replica} not found on node {node}")]
    ReplicaNotFound { replica: String, node: NodeId },

    /// No replica with this name anywhere in the collection.
    #[error("Replica {replica} not found in collection {collection}")]
    ReplicaNotInCollection { replica: String, collection: String },

    /// The collection does not exist in the current snapshot.
    #[error("Collection {collection} does not exist")]
    CollectionNotFound { collection: String },

    /// Malformed request or input snapshot.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The placement engine could not produce replica positions.
    #[error("Placement failed: {reason}")]
    Placement { reason: String },

    /// Compare-and-set write lost the race against another writer.
    #[error("Version conflict at {path} (expected {expected}, actual {actual})")]
    VersionConflict {
        path: String,
        expected: i32,
        actual: i32,
    },

    /// Internal inconsistency; unrecoverable.
    #[error("Invariant violation: {reason}")]
    InvariantViolation { reason: String },

    /// A predicate wait elapsed; carries the last observation for diagnostics.
    #[error("Timed out after {elapsed_ms}ms waiting for collection {collection}")]
    WaitTimeout {
        collection: String,
        elapsed_ms: u64,
        live_nodes: BTreeSet<NodeId>,
        last_state: Option<CollectionState>,
    },

    /// Operation intentionally not implemented by the simulator.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: &'static str },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

/// Crate result type.
pub type Result<T> = std::result::Result<T, ClusterError>;
