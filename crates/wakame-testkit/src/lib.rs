//! Test harness for wakame simulated clusters.
//!
//! Provides the pieces a cluster-level test needs:
//! - [`SimCluster`]: a fully wired provider (in-memory state manager, node
//!   telemetry, executor, simulated clock, placement engine)
//! - Structural invariant checks over the live model
//! - Property-based generators for mutator sequences
//!
//! # Usage
//!
//! ```ignore
//! use wakame_testkit::SimCluster;
//!
//! let cluster = SimCluster::new(4);
//! cluster.create_collection("events", 2, 2).unwrap();
//! cluster.wait_for_shape("events", 2, 2).unwrap();
//! ```

pub mod generators;
pub mod harness;
pub mod invariants;
pub mod logging;

pub use generators::{apply, op, op_sequence, SimOp};
pub use harness::{random_replica, random_replica_matching, random_shard, SimCluster};
pub use invariants::{assert_invariants, check_invariants};
pub use logging::init_test_logging;
