//! Shuffling pool for chunk batches.

use crate::source::{Chunk, ChunkBatch};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

/// All chunks of one cycle in randomized order.
#[derive(Debug, Clone, Default)]
pub struct MixedBatch {
    chunks: Vec<Chunk>,
}

impl MixedBatch {
    /// Returns the chunks in commit order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true if no chunks are present.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total bytes across all chunks.
    pub fn byte_len(&self) -> usize {
        self.chunks.iter().map(Chunk::len).sum()
    }

    /// Iterates chunks in commit order.
    pub fn iter(&self) -> std::slice::Iter<'_, Chunk> {
        self.chunks.iter()
    }
}

impl IntoIterator for MixedBatch {
    type Item = Chunk;
    type IntoIter = std::vec::IntoIter<Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.into_iter()
    }
}

/// Combines batches and applies a uniform permutation.
///
/// The shuffle generator is independent of the entropy sources; it only
/// decides ordering.
pub struct EntropyPool {
    /// Ordering generator.
    rng: ChaCha20Rng,
    /// Total mixes performed.
    total_mixes: u64,
}

impl EntropyPool {
    /// Creates a pool whose ordering generator is seeded from the OS.
    pub fn from_os_entropy() -> Self {
        Self::from_rng(ChaCha20Rng::from_entropy())
    }

    /// Creates a pool with a reproducible ordering (tests and benchmarks).
    pub fn from_seed(seed: u64) -> Self {
        Self::from_rng(ChaCha20Rng::seed_from_u64(seed))
    }

    fn from_rng(rng: ChaCha20Rng) -> Self {
        Self {
            rng,
            total_mixes: 0,
        }
    }

    /// Concatenates three batches in the given order, then shuffles.
    pub fn combine(&mut self, a: ChunkBatch, b: ChunkBatch, c: ChunkBatch) -> MixedBatch {
        self.mix([a, b, c])
    }

    /// Concatenates any number of batches, then shuffles once.
    pub fn mix(&mut self, batches: impl IntoIterator<Item = ChunkBatch>) -> MixedBatch {
        let mut chunks: Vec<Chunk> = batches
            .into_iter()
            .flat_map(ChunkBatch::into_chunks)
            .collect();

        chunks.shuffle(&mut self.rng);
        self.total_mixes += 1;

        tracing::trace!(
            chunks = chunks.len(),
            mix_number = self.total_mixes,
            "Shuffled mixed batch"
        );

        MixedBatch { chunks }
    }

    /// Returns total mixes performed.
    pub fn total_mixes(&self) -> u64 {
        self.total_mixes
    }
}

impl Default for EntropyPool {
    fn default() -> Self {
        Self::from_os_entropy()
    }
}
