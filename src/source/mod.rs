//! Seeded entropy sources.
//!
//! Each source invocation produces a [`ChunkBatch`] of fixed-width chunks.
//! Every chunk is drawn from a generator that is built from a fresh seed
//! and discarded immediately afterwards, so no generator state is shared
//! between chunks or between strategies.

mod chunk;
mod generator;
mod strategy;

pub use chunk::{Chunk, ChunkBatch, DEFAULT_CHUNK_WIDTH};
pub use generator::{chunk_from_seed, EntropySource, SourceError, MAX_POOL_SIZE};
pub use strategy::SeedStrategy;
