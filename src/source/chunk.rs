//! Chunk and batch types.

use super::SeedStrategy;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Bytes drawn per reseed unless configured otherwise.
pub const DEFAULT_CHUNK_WIDTH: usize = 8;

/// An immutable unit of generated bytes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Chunk {
    bytes: Box<[u8]>,
}

impl Chunk {
    /// Wraps raw bytes as a chunk.
    pub fn from_bytes(bytes: impl Into<Box<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Returns the chunk contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the chunk width in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true for a zero-width chunk.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Standard base64 (padded) rendering used on the progress line.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

impl AsRef<[u8]> for Chunk {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hex: String = self.bytes.iter().map(|b| format!("{:02x}", b)).collect();
        f.debug_tuple("Chunk").field(&hex).finish()
    }
}

/// Chunks produced by a single source invocation, in generation order.
#[derive(Debug, Clone)]
pub struct ChunkBatch {
    strategy: SeedStrategy,
    chunks: Vec<Chunk>,
}

impl ChunkBatch {
    pub(crate) fn new(strategy: SeedStrategy, chunks: Vec<Chunk>) -> Self {
        Self { strategy, chunks }
    }

    /// Strategy that seeded every chunk in this batch.
    pub fn strategy(&self) -> SeedStrategy {
        self.strategy
    }

    /// Returns the chunks in generation order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true if the batch holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total bytes across all chunks.
    pub fn byte_len(&self) -> usize {
        self.chunks.iter().map(Chunk::len).sum()
    }

    /// Consumes the batch, dropping its provenance.
    pub fn into_chunks(self) -> Vec<Chunk> {
        self.chunks
    }
}
