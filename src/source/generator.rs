//! Per-chunk reseeding generator.
//!
//! A chunk is a pure function of its seed: [`chunk_from_seed`] builds a
//! ChaCha8 generator from the seed, fills one chunk and drops the
//! generator. Seed freshness comes entirely from the strategy.

use super::{Chunk, ChunkBatch, SeedStrategy, DEFAULT_CHUNK_WIDTH};
use rand_chacha::ChaCha8Rng;
use rand_core::{OsRng, RngCore, SeedableRng};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while generating a batch.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("secure seed unavailable: {0}")]
    SeedUnavailable(#[source] rand_core::Error),
    #[error("chunk width must be non-zero")]
    ZeroChunkWidth,
    #[error("minimum pool size {0} exceeds {max} bytes", max = MAX_POOL_SIZE)]
    PoolSizeTooLarge(usize),
}

/// Largest accepted batch threshold in bytes.
pub const MAX_POOL_SIZE: usize = 64 * 1024 * 1024;

/// Draws exactly one chunk of `width` bytes from a generator seeded with `seed`.
pub fn chunk_from_seed(seed: u64, width: usize) -> Chunk {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut bytes = vec![0u8; width];
    rng.fill_bytes(&mut bytes);
    Chunk::from_bytes(bytes)
}

/// Produces chunk batches under any [`SeedStrategy`].
///
/// `R` is the secure random source consulted by
/// [`SeedStrategy::SecureSeeded`]; it defaults to the OS generator.
pub struct EntropySource<R = OsRng> {
    /// Source of secure seed bytes.
    secure: R,
    /// Bytes per chunk.
    chunk_width: usize,
    /// Wall-clock nanoseconds at construction; offsets clock seeds per process.
    origin_nanos: u64,
    /// Reference point for monotonic clock seeds.
    epoch: Instant,
    /// Total chunks produced (for metrics).
    total_chunks: u64,
}

impl EntropySource<OsRng> {
    /// Creates a source backed by the OS secure random generator.
    pub fn new(chunk_width: usize) -> Self {
        Self::with_secure_rng(OsRng, chunk_width)
    }
}

impl Default for EntropySource<OsRng> {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_WIDTH)
    }
}

impl<R: RngCore> EntropySource<R> {
    /// Creates a source that draws secure seeds from `secure`.
    pub fn with_secure_rng(secure: R, chunk_width: usize) -> Self {
        Self {
            secure,
            chunk_width,
            origin_nanos: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default(),
            epoch: Instant::now(),
            total_chunks: 0,
        }
    }

    /// Bytes per chunk.
    pub fn chunk_width(&self) -> usize {
        self.chunk_width
    }

    /// Total chunks produced by this source.
    pub fn total_chunks(&self) -> u64 {
        self.total_chunks
    }

    /// Reads a fresh seed for `strategy`.
    pub fn seed(&mut self, strategy: SeedStrategy) -> Result<u64, SourceError> {
        match strategy {
            SeedStrategy::TimeBased => Ok(self
                .origin_nanos
                .wrapping_add(self.epoch.elapsed().as_nanos() as u64)),
            SeedStrategy::SecureSeeded => {
                let mut buf = [0u8; 8];
                self.secure
                    .try_fill_bytes(&mut buf)
                    .map_err(SourceError::SeedUnavailable)?;
                Ok(u64::from_be_bytes(buf))
            }
            SeedStrategy::IdentifierBased => Ok((Uuid::new_v4().as_u128() >> 64) as u64),
        }
    }

    /// Generates a batch whose byte length first exceeds `min_pool_size`.
    ///
    /// Chunks are appended while the running total is `<= min_pool_size`,
    /// so a 512-byte threshold with 8-byte chunks yields 65 chunks.
    pub fn generate(
        &mut self,
        min_pool_size: usize,
        strategy: SeedStrategy,
    ) -> Result<ChunkBatch, SourceError> {
        if self.chunk_width == 0 {
            return Err(SourceError::ZeroChunkWidth);
        }
        if min_pool_size > MAX_POOL_SIZE {
            return Err(SourceError::PoolSizeTooLarge(min_pool_size));
        }

        let mut chunks = Vec::with_capacity(min_pool_size / self.chunk_width + 1);
        let mut total = 0usize;

        while total <= min_pool_size {
            let seed = self.seed(strategy)?;
            chunks.push(chunk_from_seed(seed, self.chunk_width));
            total = total
                .checked_add(self.chunk_width)
                .ok_or(SourceError::PoolSizeTooLarge(min_pool_size))?;
        }

        self.total_chunks += chunks.len() as u64;

        tracing::trace!(
            strategy = %strategy,
            chunks = chunks.len(),
            bytes = total,
            "Generated chunk batch"
        );

        Ok(ChunkBatch::new(strategy, chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::ExhaustedRng;
    use proptest::prelude::*;

    #[test]
    fn test_default_batch_has_65_chunks() {
        let mut source = EntropySource::new(8);
        for strategy in SeedStrategy::ALL {
            let batch = source.generate(512, strategy).unwrap();
            assert_eq!(batch.len(), 65);
            assert_eq!(batch.byte_len(), 520);
            assert!(batch.chunks().iter().all(|c| c.len() == 8));
        }
        assert_eq!(source.total_chunks(), 195);
    }

    #[test]
    fn test_chunk_from_seed_is_pure() {
        assert_eq!(chunk_from_seed(42, 8), chunk_from_seed(42, 8));
        assert_ne!(chunk_from_seed(42, 8), chunk_from_seed(43, 8));
    }

    #[test]
    fn test_repeated_batches_differ() {
        let mut source = EntropySource::new(8);
        for strategy in SeedStrategy::ALL {
            let first = source.generate(512, strategy).unwrap();
            let second = source.generate(512, strategy).unwrap();
            assert_ne!(first.chunks(), second.chunks(), "strategy {}", strategy);
        }
    }

    #[test]
    fn test_secure_chunks_are_distinct_within_batch() {
        let mut source = EntropySource::new(8);
        let batch = source.generate(512, SeedStrategy::SecureSeeded).unwrap();
        let mut chunks = batch.into_chunks();
        chunks.sort();
        chunks.dedup();
        assert_eq!(chunks.len(), 65);
    }

    #[test]
    fn test_exhausted_secure_source() {
        let mut source = EntropySource::with_secure_rng(ExhaustedRng, 8);
        assert!(matches!(
            source.generate(512, SeedStrategy::SecureSeeded),
            Err(SourceError::SeedUnavailable(_))
        ));
        assert_eq!(source.total_chunks(), 0);
    }

    #[test]
    fn test_other_strategies_ignore_secure_source() {
        let mut source = EntropySource::with_secure_rng(ExhaustedRng, 8);
        assert!(source.generate(512, SeedStrategy::TimeBased).is_ok());
        assert!(source.generate(512, SeedStrategy::IdentifierBased).is_ok());
    }

    #[test]
    fn test_zero_width_rejected() {
        let mut source = EntropySource::new(0);
        assert!(matches!(
            source.generate(512, SeedStrategy::TimeBased),
            Err(SourceError::ZeroChunkWidth)
        ));
    }

    #[test]
    fn test_oversized_pool_rejected() {
        let mut source = EntropySource::new(8);
        for size in [MAX_POOL_SIZE + 1, usize::MAX] {
            assert!(matches!(
                source.generate(size, SeedStrategy::TimeBased),
                Err(SourceError::PoolSizeTooLarge(s)) if s == size
            ));
        }
        assert_eq!(source.total_chunks(), 0);
    }

    #[test]
    fn test_time_seed_offset_by_wall_clock() {
        let mut source = EntropySource::new(8);
        // Nanoseconds since 2020-01-01
        let floor = 1_577_836_800u64 * 1_000_000_000;
        let first = source.seed(SeedStrategy::TimeBased).unwrap();
        let second = source.seed(SeedStrategy::TimeBased).unwrap();
        assert!(first > floor);
        assert!(second >= first);
    }

    proptest! {
        #[test]
        fn prop_batch_overshoots_threshold(min_pool_size in 0usize..2048, width in 1usize..32) {
            let mut source = EntropySource::new(width);
            let batch = source.generate(min_pool_size, SeedStrategy::IdentifierBased).unwrap();
            let len = batch.byte_len();
            prop_assert!(len > min_pool_size);
            prop_assert_eq!(len % width, 0);
            prop_assert!(len - width <= min_pool_size);
        }
    }
}
