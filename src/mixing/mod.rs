//! Batch mixing.
//!
//! Concatenates the per-strategy batches of one cycle and shuffles the
//! combined sequence so chunk order carries no provenance.

mod pool;

pub use pool::{EntropyPool, MixedBatch};
