//! Versioned key-value state manager: the publication substrate for cluster
//! snapshots.
//!
//! The provider writes serialized snapshots under fixed paths with
//! compare-and-set; subscribers read them back without bespoke change
//! notification. `InMemoryStateManager` is the simulation implementation;
//! production systems would back the same trait with a coordination service.

use crate::error::{ClusterError, Result};
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Path of the serialized cluster snapshot.
pub const CLUSTER_STATE: &str = "/clusterstate.json";

/// Path of the serialized cluster-wide property map.
pub const CLUSTER_PROPS: &str = "/clusterprops.json";

/// Sentinel passed as `expected_version` to create a missing key.
pub const CREATE_VERSION: i32 = -1;

/// A stored payload together with its write version.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedData {
    pub data: Bytes,
    pub version: i32,
}

/// Versioned key-value store with compare-and-set writes.
///
/// Versions start at 0 on create and increment by one per successful write.
pub trait DistribStateManager: Send + Sync {
    /// Read a key; `None` if it has never been written.
    fn get_data(&self, path: &str) -> Result<Option<VersionedData>>;

    /// Compare-and-set write.
    ///
    /// `expected_version` must be [`CREATE_VERSION`] for a missing key, or
    /// the key's current version otherwise; a mismatch fails with
    /// `VersionConflict` and leaves the key untouched. Returns the new
    /// version.
    fn set_data(&self, path: &str, data: Bytes, expected_version: i32) -> Result<i32>;
}

/// In-memory state manager for simulation.
#[derive(Debug, Default)]
pub struct InMemoryStateManager {
    entries: Mutex<BTreeMap<String, VersionedData>>,
}

impl InMemoryStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys ever written. Test helper.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl DistribStateManager for InMemoryStateManager {
    fn get_data(&self, path: &str) -> Result<Option<VersionedData>> {
        Ok(self.entries.lock().get(path).cloned())
    }

    fn set_data(&self, path: &str, data: Bytes, expected_version: i32) -> Result<i32> {
        let mut entries = self.entries.lock();
        let current = entries.get(path).map(|v| v.version);
        match current {
            None if expected_version == CREATE_VERSION => {
                entries.insert(path.to_string(), VersionedData { data, version: 0 });
                Ok(0)
            }
            Some(version) if expected_version == version => {
                let next = version + 1;
                entries.insert(
                    path.to_string(),
                    VersionedData {
                        data,
                        version: next,
                    },
                );
                Ok(next)
            }
            _ => Err(ClusterError::VersionConflict {
                path: path.to_string(),
                expected: expected_version,
                actual: current.unwrap_or(CREATE_VERSION),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key() {
        let mgr = InMemoryStateManager::new();
        assert_eq!(mgr.get_data("/nope").unwrap(), None);
    }

    #[test]
    fn test_create_then_read() {
        let mgr = InMemoryStateManager::new();
        let v = mgr
            .set_data("/a", Bytes::from_static(b"one"), CREATE_VERSION)
            .unwrap();
        assert_eq!(v, 0);

        let data = mgr.get_data("/a").unwrap().unwrap();
        assert_eq!(data.data, Bytes::from_static(b"one"));
        assert_eq!(data.version, 0);
    }

    #[test]
    fn test_cas_increments_version() {
        let mgr = InMemoryStateManager::new();
        mgr.set_data("/a", Bytes::from_static(b"one"), CREATE_VERSION)
            .unwrap();
        let v = mgr.set_data("/a", Bytes::from_static(b"two"), 0).unwrap();
        assert_eq!(v, 1);
        assert_eq!(mgr.get_data("/a").unwrap().unwrap().version, 1);
    }

    #[test]
    fn test_cas_conflict() {
        let mgr = InMemoryStateManager::new();
        mgr.set_data("/a", Bytes::from_static(b"one"), CREATE_VERSION)
            .unwrap();

        // Stale expected version fails and leaves the value untouched.
        let err = mgr
            .set_data("/a", Bytes::from_static(b"two"), 5)
            .unwrap_err();
        assert!(matches!(err, ClusterError::VersionConflict { actual: 0, .. }));
        assert_eq!(
            mgr.get_data("/a").unwrap().unwrap().data,
            Bytes::from_static(b"one")
        );
    }

    #[test]
    fn test_create_on_existing_key_conflicts() {
        let mgr = InMemoryStateManager::new();
        mgr.set_data("/a", Bytes::from_static(b"one"), CREATE_VERSION)
            .unwrap();
        let err = mgr
            .set_data("/a", Bytes::from_static(b"two"), CREATE_VERSION)
            .unwrap_err();
        assert!(matches!(err, ClusterError::VersionConflict { .. }));
    }
}
