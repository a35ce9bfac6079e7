//! Prometheus metrics for the replica loop.
//!
//! # Metrics Exposed
//!
//! - `replica_cycles_total` - Completed cycles
//! - `replica_stomp_cycles_total` - Completed cycles that rewrote offset 0
//! - `replica_append_cycles_total` - Completed cycles that wrote from the current position
//! - `replica_chunks_written_total` - Chunks committed
//! - `replica_bytes_written_total` - Bytes written, including overwrites
//! - `replica_file_length_bytes` - Replica length after the latest cycle
//! - `replica_last_batch_chunks` - Chunks in the latest mixed batch
//!
//! With the `metrics` feature, [`MetricsServer`] serves them over HTTP.

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig};
