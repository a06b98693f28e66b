//! Output persistence.
//!
//! Every extracted table is written atomically: a temporary file in the
//! target directory is filled and then persisted over the destination.

mod atomic_writer;

pub use atomic_writer::{write_json, AtomicJsonWriter};
