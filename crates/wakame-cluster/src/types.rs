//! Core identifiers and property types for the simulated cluster.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Node identifier (unique across the cluster).
///
/// NodeId is a string to support host:port pairs, DNS names, or synthetic
/// simulator names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Replica type.
///
/// - `Nrt`: full index + transaction log, may become leader
/// - `Tlog`: transaction log only, may become leader
/// - `Pull`: pulls committed segments, never leads writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplicaType {
    Nrt,
    Tlog,
    Pull,
}

impl ReplicaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplicaType::Nrt => "NRT",
            ReplicaType::Tlog => "TLOG",
            ReplicaType::Pull => "PULL",
        }
    }

    /// Lowercase first letter of the type name, used in generated core names.
    pub fn core_suffix(&self) -> char {
        match self {
            ReplicaType::Nrt => 'n',
            ReplicaType::Tlog => 't',
            ReplicaType::Pull => 'p',
        }
    }

    pub fn parse(s: &str) -> Option<ReplicaType> {
        match s {
            "NRT" => Some(ReplicaType::Nrt),
            "TLOG" => Some(ReplicaType::Tlog),
            "PULL" => Some(ReplicaType::Pull),
            _ => None,
        }
    }
}

impl fmt::Display for ReplicaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replica lifecycle state, as published in cluster snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicaState {
    /// Serving queries and (for leaders) accepting writes.
    Active,

    /// Not running; the hosting node is gone or the core is stopped.
    Down,

    /// Catching up from the leader before going active.
    Recovering,

    /// Recovery was attempted and failed.
    RecoveryFailed,
}

impl ReplicaState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplicaState::Active => "active",
            ReplicaState::Down => "down",
            ReplicaState::Recovering => "recovering",
            ReplicaState::RecoveryFailed => "recovery_failed",
        }
    }

    pub fn parse(s: &str) -> Option<ReplicaState> {
        match s {
            "active" => Some(ReplicaState::Active),
            "down" => Some(ReplicaState::Down),
            "recovering" => Some(ReplicaState::Recovering),
            "recovery_failed" => Some(ReplicaState::RecoveryFailed),
            _ => None,
        }
    }
}

impl fmt::Display for ReplicaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered string → JSON value map used for all property bags.
pub type PropMap = BTreeMap<String, serde_json::Value>;

/// Well-known property keys.
pub mod props {
    /// Replica lifecycle state (`ReplicaState` string form).
    pub const STATE: &str = "state";

    /// Present (as `"true"`) only on the slice leader.
    pub const LEADER: &str = "leader";

    /// Node hosting the replica.
    pub const NODE_NAME: &str = "node_name";

    /// Cluster-unique core name.
    pub const CORE: &str = "core";

    /// Replica type (`ReplicaType` string form).
    pub const TYPE: &str = "type";

    /// Shard the replica belongs to.
    pub const SHARD: &str = "shard";

    /// Placement policy name, stored as a collection property.
    pub const POLICY: &str = "policy";

    /// Per-node telemetry key: number of cores hosted.
    pub const CORES: &str = "cores";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replica_type_roundtrip() {
        for t in [ReplicaType::Nrt, ReplicaType::Tlog, ReplicaType::Pull] {
            assert_eq!(ReplicaType::parse(t.as_str()), Some(t));
        }
        assert_eq!(ReplicaType::parse("bogus"), None);
    }

    #[test]
    fn test_replica_type_core_suffix() {
        assert_eq!(ReplicaType::Nrt.core_suffix(), 'n');
        assert_eq!(ReplicaType::Tlog.core_suffix(), 't');
        assert_eq!(ReplicaType::Pull.core_suffix(), 'p');
    }

    #[test]
    fn test_replica_state_roundtrip() {
        for s in [
            ReplicaState::Active,
            ReplicaState::Down,
            ReplicaState::Recovering,
            ReplicaState::RecoveryFailed,
        ] {
            assert_eq!(ReplicaState::parse(s.as_str()), Some(s));
        }
    }

    #[test]
    fn test_node_id_display() {
        let id = NodeId::new("127.0.0.1:10000_sim");
        assert_eq!(id.to_string(), "127.0.0.1:10000_sim");
        assert_eq!(id.as_str(), "127.0.0.1:10000_sim");
    }
}
