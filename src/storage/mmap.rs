//! Memory-mapped storage backend for high-performance file access.

use std::fs::File;
use std::path::Path;

use memmap2::{Mmap, MmapOptions};

use crate::error::Result;
use crate::storage::traits::StorageInput;

/// Memory-mapped input; `read_at` is a copy out of the mapping.
#[derive(Debug)]
pub struct MmapInput {
    mmap: Mmap,
}

impl MmapInput {
    /// Map `path` read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;

        // The index and digit files are immutable once written.
        let mmap = unsafe { MmapOptions::new().map(&file)? };

        Ok(MmapInput { mmap })
    }
}

impl StorageInput for MmapInput {
    fn size(&self) -> Result<u64> {
        Ok(self.mmap.len() as u64)
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let len = self.mmap.len();
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(len);
        let n = buf.len().min(len - start);
        buf[..n].copy_from_slice(&self.mmap[start..start + n]);
        Ok(n)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_mmap_read_at() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("digits.txt");
        fs::write(&path, b"3.14159").unwrap();

        let mut input = MmapInput::open(&path).unwrap();
        assert_eq!(input.size().unwrap(), 7);

        let mut buf = [0u8; 4];
        input.read_exact_at(2, &mut buf).unwrap();
        assert_eq!(&buf, b"1415");

        assert_eq!(input.read_at(5, &mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"59");
        assert_eq!(input.read_at(100, &mut buf).unwrap(), 0);
    }
}
