//! Predicate waiter over collection state.
//!
//! Blocks on a caller-supplied predicate of (live nodes, collection state)
//! under the injected time source, polling fresh snapshots at a fixed
//! cadence. The predicate may run many times and must be side-effect-free;
//! callers needing the last observation use the payload of the timeout
//! error.

use crate::error::{ClusterError, Result};
use crate::provider::SimClusterStateProvider;
use crate::state::CollectionState;
use crate::types::NodeId;
use std::collections::BTreeSet;
use std::time::Duration;

impl SimClusterStateProvider {
    /// Block until the predicate matches, the collection no longer exists
    /// (success), or `timeout` of injected-clock time elapses (failure,
    /// carrying the final observation).
    pub fn wait_for_state<P>(&self, collection: &str, timeout: Duration, predicate: P) -> Result<()>
    where
        P: Fn(&BTreeSet<NodeId>, &CollectionState) -> bool,
    {
        let time = &self.inner.time_source;
        let start = time.now_millis();
        let deadline = start + timeout.as_millis() as u64;
        loop {
            let state = self.cluster_state();
            match state.collection(collection) {
                // Already removed or never created; nothing to wait on.
                None => return Ok(()),
                Some(coll) => {
                    if predicate(state.live_nodes(), coll) {
                        return Ok(());
                    }
                }
            }
            let now = time.now_millis();
            if now >= deadline {
                return Err(ClusterError::WaitTimeout {
                    collection: collection.to_string(),
                    elapsed_ms: now - start,
                    live_nodes: state.live_nodes().clone(),
                    last_state: state.collection(collection).cloned(),
                });
            }
            time.sleep(self.inner.poll_interval);
        }
    }
}

/// Predicate matching a collection with exactly `shards` slices, each with
/// exactly `replicas` replicas that are active on live nodes.
pub fn cluster_shape(
    shards: usize,
    replicas: usize,
) -> impl Fn(&BTreeSet<NodeId>, &CollectionState) -> bool {
    move |live_nodes, collection| {
        if collection.slices().len() != shards {
            return false;
        }
        collection.slices().values().all(|slice| {
            slice
                .replicas()
                .values()
                .filter(|r| r.is_active(live_nodes))
                .count()
                == replicas
        })
    }
}
