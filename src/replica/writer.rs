//! Offset-policy writer for the replica file.

use super::ReplicaTarget;
use crate::source::Chunk;
use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default name of the replica file inside the target directory.
pub const REPLICA_FILE_NAME: &str = "dev_random_replica";

/// Errors that can occur while opening or writing the replica.
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("replica location not found: {}", .path.display())]
    FileNotFound { path: PathBuf },
    #[error("failed to open replica {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to seek replica: {0}")]
    Seek(#[source] io::Error),
    #[error("failed to write chunk: {0}")]
    Write(#[source] io::Error),
    #[error("failed to sync replica: {0}")]
    Sync(#[source] io::Error),
    #[error("failed to read replica metadata: {0}")]
    Metadata(#[source] io::Error),
}

/// Owns the replica handle and commits chunks under the cycle's policy.
///
/// The handle is released when the writer is dropped; [`close`](Self::close)
/// additionally flushes and reports any final sync failure.
pub struct ReplicaWriter<T = File> {
    /// Open replica storage.
    target: T,
    /// On-disk location, if backed by a file.
    path: Option<PathBuf>,
    /// Total chunks committed.
    chunks_committed: u64,
    /// Total bytes written.
    bytes_written: u64,
}

impl ReplicaWriter<File> {
    /// Opens (creating if needed) the replica at `path` for read/write.
    ///
    /// Existing content is kept; the file is never truncated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WriterError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => WriterError::FileNotFound { path: path.clone() },
                _ => WriterError::Open {
                    path: path.clone(),
                    source,
                },
            })?;

        tracing::info!(path = %path.display(), "Replica opened");

        Ok(Self {
            path: Some(path),
            ..Self::from_target(file)
        })
    }

    /// Opens `<dir>/<file_name>`, failing if `dir` is not an existing directory.
    pub fn open_in_dir(dir: impl AsRef<Path>, file_name: &str) -> Result<Self, WriterError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(WriterError::FileNotFound {
                path: dir.to_path_buf(),
            });
        }
        Self::open(dir.join(file_name))
    }
}

impl<T: ReplicaTarget> ReplicaWriter<T> {
    /// Wraps already-open storage.
    pub fn from_target(target: T) -> Self {
        Self {
            target,
            path: None,
            chunks_committed: 0,
            bytes_written: 0,
        }
    }

    /// Commits one chunk.
    ///
    /// With `cycle_is_even` the position is first moved to offset 0, so
    /// every chunk of an even cycle lands on the previous one. Otherwise
    /// the chunk is written at the current position and the file grows.
    pub fn commit(&mut self, chunk: &Chunk, cycle_is_even: bool) -> Result<(), WriterError> {
        if cycle_is_even {
            self.target
                .seek(SeekFrom::Start(0))
                .map_err(WriterError::Seek)?;
        }

        self.target
            .write_all(chunk.as_bytes())
            .map_err(WriterError::Write)?;
        self.target.make_durable().map_err(WriterError::Sync)?;

        self.chunks_committed += 1;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    /// Current write position.
    pub fn position(&mut self) -> Result<u64, WriterError> {
        self.target.stream_position().map_err(WriterError::Seek)
    }

    /// Current replica length in bytes.
    pub fn replica_len(&mut self) -> Result<u64, WriterError> {
        self.target.byte_len().map_err(WriterError::Metadata)
    }

    /// Location of the replica, if file-backed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Total chunks committed.
    pub fn chunks_committed(&self) -> u64 {
        self.chunks_committed
    }

    /// Total bytes written, counting overwritten bytes.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flushes, syncs and releases the handle.
    pub fn close(mut self) -> Result<(), WriterError> {
        self.target.flush().map_err(WriterError::Write)?;
        self.target.make_durable().map_err(WriterError::Sync)?;
        tracing::info!(
            chunks = self.chunks_committed,
            bytes = self.bytes_written,
            "Replica closed"
        );
        Ok(())
    }

    /// Returns the underlying storage.
    pub fn into_inner(self) -> T {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn chunk(byte: u8) -> Chunk {
        Chunk::from_bytes(vec![byte; 8])
    }

    fn writer() -> ReplicaWriter<Cursor<Vec<u8>>> {
        ReplicaWriter::from_target(Cursor::new(Vec::new()))
    }

    #[test]
    fn test_even_cycle_keeps_last_chunk() {
        let mut w = writer();
        for b in 1..=5 {
            w.commit(&chunk(b), true).unwrap();
        }
        assert_eq!(w.chunks_committed(), 5);
        assert_eq!(w.bytes_written(), 40);
        assert_eq!(w.into_inner().into_inner(), vec![5u8; 8]);
    }

    #[test]
    fn test_odd_cycle_appends_from_position() {
        let mut w = ReplicaWriter::from_target(Cursor::new(vec![0xEEu8; 16]));
        w.target.seek(SeekFrom::Start(4)).unwrap();
        let start = w.position().unwrap();

        for b in 1..=3 {
            w.commit(&chunk(b), false).unwrap();
        }
        assert_eq!(w.position().unwrap(), start + 24);

        let bytes = w.into_inner().into_inner();
        assert_eq!(bytes.len(), 28);
        assert_eq!(&bytes[..4], &[0xEE; 4]);
        assert_eq!(&bytes[4..12], &[1u8; 8]);
        assert_eq!(&bytes[12..20], &[2u8; 8]);
        assert_eq!(&bytes[20..28], &[3u8; 8]);
    }

    #[test]
    fn test_stomp_then_append() {
        let mut w = writer();
        for b in [b'A', b'B', b'C'] {
            w.commit(&chunk(b), true).unwrap();
        }
        assert_eq!(w.replica_len().unwrap(), 8);

        for b in [b'D', b'E'] {
            w.commit(&chunk(b), false).unwrap();
        }
        assert_eq!(w.replica_len().unwrap(), 24);

        let mut expected = vec![b'C'; 8];
        expected.extend_from_slice(&[b'D'; 8]);
        expected.extend_from_slice(&[b'E'; 8]);
        assert_eq!(w.into_inner().into_inner(), expected);
    }

    #[test]
    fn test_stomp_does_not_truncate() {
        let mut w = writer();
        for b in 1..=4 {
            w.commit(&chunk(b), false).unwrap();
        }
        w.commit(&chunk(9), true).unwrap();

        let bytes = w.into_inner().into_inner();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[..8], &[9u8; 8]);
        assert_eq!(&bytes[8..16], &[2u8; 8]);
    }

    /// In-memory target whose metadata lookups always fail.
    struct NoMetadata(Cursor<Vec<u8>>);

    impl Write for NoMetadata {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for NoMetadata {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.0.seek(pos)
        }
    }

    impl ReplicaTarget for NoMetadata {
        fn make_durable(&mut self) -> io::Result<()> {
            Ok(())
        }

        fn byte_len(&mut self) -> io::Result<u64> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "stat denied"))
        }
    }

    #[test]
    fn test_length_failure_reported_as_metadata() {
        let mut w = ReplicaWriter::from_target(NoMetadata(Cursor::new(Vec::new())));
        w.commit(&chunk(1), true).unwrap();

        let err = w.replica_len().unwrap_err();
        assert!(matches!(err, WriterError::Metadata(_)));
        assert!(err.to_string().starts_with("failed to read replica metadata"));
    }

    #[test]
    fn test_open_in_missing_dir() {
        let result = ReplicaWriter::open_in_dir("/definitely/not/a/dir", REPLICA_FILE_NAME);
        assert!(matches!(result, Err(WriterError::FileNotFound { .. })));
    }
}
