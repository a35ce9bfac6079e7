//! Storage abstraction behind the replica writer.

use std::fs::File;
use std::io::{self, Cursor, Seek, Write};

/// Seekable byte storage that can be made durable.
///
/// Implemented for [`File`] and for in-memory cursors used in tests.
pub trait ReplicaTarget: Write + Seek {
    /// Forces written bytes to durable storage.
    fn make_durable(&mut self) -> io::Result<()>;

    /// Current length of the stored artifact in bytes.
    fn byte_len(&mut self) -> io::Result<u64>;
}

impl ReplicaTarget for File {
    fn make_durable(&mut self) -> io::Result<()> {
        self.sync_data()
    }

    fn byte_len(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }
}

impl ReplicaTarget for Cursor<Vec<u8>> {
    fn make_durable(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn byte_len(&mut self) -> io::Result<u64> {
        Ok(self.get_ref().len() as u64)
    }
}
