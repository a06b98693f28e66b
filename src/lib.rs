pub mod chain;
pub mod commands;
pub mod config;
pub mod error;
pub mod extract;
pub mod streaming;

pub use commands::{run_snapshot, SnapshotReport};
pub use config::SnapshotConfig;
pub use error::AppError;
