//! Replica file handling.
//!
//! The replica is a raw byte file with no header. [`ReplicaWriter`] owns
//! the single long-lived handle and applies the per-cycle offset policy:
//! stomp cycles seek to offset 0 before every chunk, append cycles write
//! wherever the previous write left the position.

mod target;
mod writer;

pub use target::ReplicaTarget;
pub use writer::{ReplicaWriter, WriterError, REPLICA_FILE_NAME};
