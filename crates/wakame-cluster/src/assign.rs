//! Replica-id and core-name assignment.
//!
//! Per-collection counters are persisted as versioned keys in the state
//! manager, so ids survive provider restarts within a simulation and writes
//! from concurrent assigners serialize through compare-and-set.

use crate::error::{ClusterError, Result};
use crate::manager::{DistribStateManager, CREATE_VERSION};
use crate::types::ReplicaType;
use bytes::Bytes;

fn counter_path(collection: &str) -> String {
    format!("/collections/{collection}/counter")
}

/// Atomically increment and return the per-collection id counter.
///
/// Retries on version conflict until the compare-and-set wins.
pub fn inc_and_get_id(manager: &dyn DistribStateManager, collection: &str) -> Result<u64> {
    let path = counter_path(collection);
    loop {
        let (current, version) = match manager.get_data(&path)? {
            Some(data) => {
                let text = std::str::from_utf8(&data.data).map_err(|_| {
                    ClusterError::InvariantViolation {
                        reason: format!("counter at {path} is not UTF-8"),
                    }
                })?;
                let value = text
                    .parse::<u64>()
                    .map_err(|_| ClusterError::InvariantViolation {
                        reason: format!("counter at {path} is not a number: {text}"),
                    })?;
                (value, data.version)
            }
            None => (0, CREATE_VERSION),
        };
        let next = current + 1;
        match manager.set_data(&path, Bytes::from(next.to_string()), version) {
            Ok(_) => return Ok(next),
            Err(ClusterError::VersionConflict { .. }) => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Mint a replica name of the form `core_node<id>`.
pub fn assign_core_node_name(
    manager: &dyn DistribStateManager,
    collection: &str,
) -> Result<String> {
    Ok(format!("core_node{}", inc_and_get_id(manager, collection)?))
}

/// Mint a core name of the form `<collection>_<shard>_replica_<t><n>` with
/// `n` drawn from the per-collection counter.
pub fn build_core_name(
    manager: &dyn DistribStateManager,
    collection: &str,
    shard: &str,
    replica_type: ReplicaType,
) -> Result<String> {
    let n = inc_and_get_id(manager, collection)?;
    Ok(format!(
        "{collection}_{shard}_replica_{}{n}",
        replica_type.core_suffix()
    ))
}
