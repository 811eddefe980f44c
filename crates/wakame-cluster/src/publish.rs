//! Snapshot publication.
//!
//! Serializes the current state into the versioned store under fixed paths,
//! with a compare-and-set against the last observed version. A snapshot that
//! equals the last published one is not rewritten. On publish failure the
//! in-memory state has already been mutated and keeps diverging until the
//! next successful publish reconciles; the simulator accepts this.

use crate::builder::build_cluster_state;
use crate::error::Result;
use crate::manager::{DistribStateManager, CLUSTER_PROPS, CLUSTER_STATE, CREATE_VERSION};
use crate::provider::CoreState;
use crate::state::ClusterState;
use crate::types::PropMap;
use bytes::Bytes;
use tracing::debug;

/// Publish the current cluster snapshot; returns it. The last-published
/// cache is updated only on success.
pub(crate) fn publish_state_locked(
    manager: &dyn DistribStateManager,
    state: &mut CoreState,
) -> Result<ClusterState> {
    let current = build_cluster_state(state);
    if state.last_published_state.as_ref() == Some(&current) {
        return Ok(current);
    }
    let data = serde_json::to_vec(&current)?;
    let version = manager
        .get_data(CLUSTER_STATE)?
        .map_or(CREATE_VERSION, |v| v.version);
    let new_version = manager.set_data(CLUSTER_STATE, Bytes::from(data), version)?;
    debug!(version = new_version, "published cluster state");
    state.last_published_state = Some(current.clone());
    Ok(current)
}

/// Publish the cluster-wide property map; returns it.
pub(crate) fn publish_properties_locked(
    manager: &dyn DistribStateManager,
    state: &mut CoreState,
) -> Result<PropMap> {
    let current = state.cluster_properties.clone();
    if state.last_published_properties.as_ref() == Some(&current) {
        return Ok(current);
    }
    let data = serde_json::to_vec(&current)?;
    let version = manager
        .get_data(CLUSTER_PROPS)?
        .map_or(CREATE_VERSION, |v| v.version);
    let new_version = manager.set_data(CLUSTER_PROPS, Bytes::from(data), version)?;
    debug!(version = new_version, "published cluster properties");
    state.last_published_properties = Some(current.clone());
    Ok(current)
}
