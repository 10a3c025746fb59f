//! Storage abstraction trait and common types.

use std::io::{self, Write};

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A random-access, read-only view of a file.
///
/// Readers never manipulate raw file positions; every access names the
/// absolute offset it wants.
pub trait StorageInput: Send + std::fmt::Debug {
    /// Get the size of the input in bytes.
    fn size(&self) -> Result<u64>;

    /// Read up to `buf.len()` bytes starting at `offset`.
    ///
    /// Returns the number of bytes read, which is short only when the end of
    /// the input was reached.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Close the input.
    fn close(&mut self) -> Result<()>;

    /// Read exactly `buf.len()` bytes starting at `offset`.
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let read = self.read_at(offset, buf)?;
        if read < buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("wanted {} bytes at offset {offset}, got {read}", buf.len()),
            )
            .into());
        }
        Ok(())
    }

    /// Read a little-endian u64 at `offset`.
    fn read_u64_at(&mut self, offset: u64) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_exact_at(offset, &mut buf)?;
        Ok(LittleEndian::read_u64(&buf))
    }

    /// Read a little-endian u32 at `offset`.
    fn read_u32_at(&mut self, offset: u64) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact_at(offset, &mut buf)?;
        Ok(LittleEndian::read_u32(&buf))
    }
}

/// A trait for writing data to storage.
pub trait StorageOutput: Write + Send + std::fmt::Debug {
    /// Flush and sync the output to storage.
    fn flush_and_sync(&mut self) -> Result<()>;

    /// Get the number of bytes written so far.
    fn position(&self) -> u64;

    /// Close the output stream.
    fn close(&mut self) -> Result<()>;
}

// Implement StorageInput for Box<dyn StorageInput> to allow trait objects
impl StorageInput for Box<dyn StorageInput> {
    fn size(&self) -> Result<u64> {
        self.as_ref().size()
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        self.as_mut().read_at(offset, buf)
    }

    fn close(&mut self) -> Result<()> {
        self.as_mut().close()
    }
}

/// Configuration for storage backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Whether to use memory-mapped files for reading.
    pub use_mmap: bool,

    /// Buffer size for I/O operations.
    pub buffer_size: usize,

    /// Whether to sync the index file to disk when a build finishes.
    pub sync_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            use_mmap: false,
            buffer_size: 65536, // 64KB buffer for better I/O performance
            sync_writes: false,
        }
    }
}
