//! Top-level operations exposed to the binary.

pub mod snapshot;

pub use snapshot::{run_snapshot, SnapshotReport, StepFailure, MEMBERS_FILE};
