//! Access to the digit stream.
//!
//! The digit file starts with `skip` bytes that are not part of the stream
//! (for π conventionally the `3.` or just the `.`), followed by ASCII
//! digits. Position `p` lives at file byte `skip + p`. The stream ends at
//! the end of the file or at the first non-digit byte, whichever comes
//! first, so a trailing newline is harmless.

use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::error::Result;
use crate::storage::{StorageConfig, StorageInput, open_input};

/// Bytes preceding digit position 0 in a digit file.
pub const DEFAULT_SKIP: u64 = 1;

/// Random-access reader over the digit stream.
#[derive(Debug)]
pub struct DigitStream {
    input: Box<dyn StorageInput>,
    skip: u64,
}

impl DigitStream {
    /// Open the digit file at `path`.
    pub fn open<P: AsRef<Path>>(path: P, skip: u64, config: &StorageConfig) -> Result<Self> {
        Ok(Self::from_input(open_input(path, config)?, skip))
    }

    pub fn from_input(input: Box<dyn StorageInput>, skip: u64) -> Self {
        DigitStream { input, skip }
    }

    pub fn skip(&self) -> u64 {
        self.skip
    }

    /// Upper bound on the number of digits in the stream.
    pub fn max_len(&self) -> Result<u64> {
        Ok(self.input.size()?.saturating_sub(self.skip))
    }

    /// Read up to `len` digits starting at `position`.
    ///
    /// The result is shorter than `len` when the stream ends first.
    pub fn read_digits(&mut self, position: u64, len: usize) -> Result<String> {
        let mut buf = vec![0u8; len];
        let read = self.input.read_at(self.skip + position, &mut buf)?;
        Ok(leading_digits(&buf[..read]))
    }

    pub fn close(&mut self) -> Result<()> {
        self.input.close()
    }
}

/// Open the digit file for a single forward pass, positioned at digit 0.
pub fn open_sequential<P: AsRef<Path>>(
    path: P,
    skip: u64,
    buffer_size: usize,
) -> Result<BufReader<File>> {
    let mut file = File::open(path.as_ref())?;
    file.seek(SeekFrom::Start(skip))?;
    Ok(BufReader::with_capacity(buffer_size, file))
}

/// The longest all-digit prefix of `bytes`, as a string.
pub fn leading_digits(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .map(|&b| char::from(b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;

    fn write_digits(dir: &TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join("pi.txt");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_digits_after_skip() {
        let dir = TempDir::new().unwrap();
        let path = write_digits(&dir, ".314159265358979\n");

        for use_mmap in [false, true] {
            let config = StorageConfig {
                use_mmap,
                ..Default::default()
            };
            let mut stream = DigitStream::open(&path, DEFAULT_SKIP, &config).unwrap();

            assert_eq!(stream.read_digits(0, 3).unwrap(), "314");
            assert_eq!(stream.read_digits(4, 2).unwrap(), "59");
            // Stops at the trailing newline and at end of file.
            assert_eq!(stream.read_digits(12, 10).unwrap(), "979");
            assert_eq!(stream.read_digits(100, 4).unwrap(), "");
            assert_eq!(stream.max_len().unwrap(), 16);
        }
    }

    #[test]
    fn test_open_sequential_skips_prefix() {
        let dir = TempDir::new().unwrap();
        let path = write_digits(&dir, "3.1415");

        let mut reader = open_sequential(&path, 2, 64).unwrap();
        let mut rest = String::new();
        reader.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "1415");
    }

    #[test]
    fn test_leading_digits() {
        assert_eq!(leading_digits(b"0123\n45"), "0123");
        assert_eq!(leading_digits(b"x12"), "");
    }
}
