//! File-based storage implementation.

use std::fmt::Debug;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::Result;
use crate::storage::traits::{StorageInput, StorageOutput};

/// A buffered file input.
///
/// Reads that start at or shortly after the end of the previous read are
/// served from the read buffer without a real seek.
#[derive(Debug)]
pub struct FileInput<R = File> {
    reader: BufReader<R>,
    size: u64,
    /// Offset the buffered reader sits at, or `None` after a failed read
    /// left it somewhere unknown.
    position: Option<u64>,
}

impl FileInput<File> {
    /// Open `path` for random-access reading.
    pub fn open<P: AsRef<Path>>(path: P, buffer_size: usize) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let size = file.metadata()?.len();
        Ok(Self::from_reader(file, size, buffer_size))
    }
}

impl<R: Read + Seek> FileInput<R> {
    /// Wrap `inner`, currently at offset 0, whose total length is `size`.
    pub fn from_reader(inner: R, size: u64, buffer_size: usize) -> Self {
        FileInput {
            reader: BufReader::with_capacity(buffer_size, inner),
            size,
            position: Some(0),
        }
    }

    fn seek_to(&mut self, offset: u64) -> Result<()> {
        match self.position {
            Some(position) if position == offset => {}
            Some(position) if offset > position && offset - position <= i64::MAX as u64 => {
                self.reader.seek_relative((offset - position) as i64)?;
            }
            _ => {
                self.reader.seek(SeekFrom::Start(offset))?;
            }
        }
        self.position = Some(offset);
        Ok(())
    }
}

impl<R: Read + Seek + Send + Debug> StorageInput for FileInput<R> {
    fn size(&self) -> Result<u64> {
        Ok(self.size)
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if let Err(e) = self.seek_to(offset) {
            self.position = None;
            return Err(e);
        }

        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.position = None;
                    return Err(e.into());
                }
            }
        }
        self.position = Some(offset + filled as u64);

        Ok(filled)
    }

    fn close(&mut self) -> Result<()> {
        // The file will be closed when the BufReader is dropped
        Ok(())
    }
}

/// A file output implementation.
#[derive(Debug)]
pub struct FileOutput {
    writer: BufWriter<File>,
    sync_writes: bool,
    position: u64,
}

impl FileOutput {
    /// Create (or truncate) `path` for writing.
    pub fn create<P: AsRef<Path>>(path: P, buffer_size: usize, sync_writes: bool) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path.as_ref())?;

        Ok(FileOutput {
            writer: BufWriter::with_capacity(buffer_size, file),
            sync_writes,
            position: 0,
        })
    }
}

impl Write for FileOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let bytes_written = self.writer.write(buf)?;
        self.position += bytes_written as u64;
        Ok(bytes_written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl StorageOutput for FileOutput {
    fn flush_and_sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn close(&mut self) -> Result<()> {
        if self.sync_writes {
            self.flush_and_sync()
        } else {
            self.writer.flush()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_file_output_then_input() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.bin");

        let mut output = FileOutput::create(&path, 16, true).unwrap();
        output.write_all(b"3.14159265").unwrap();
        assert_eq!(output.position(), 10);
        output.close().unwrap();

        let mut input = FileInput::open(&path, 4).unwrap();
        assert_eq!(input.size().unwrap(), 10);

        let mut buf = [0u8; 3];
        input.read_exact_at(2, &mut buf).unwrap();
        assert_eq!(&buf, b"141");

        // Sequential read continues from the buffer.
        input.read_exact_at(5, &mut buf).unwrap();
        assert_eq!(&buf, b"592");

        // Backwards seek.
        input.read_exact_at(0, &mut buf).unwrap();
        assert_eq!(&buf, b"3.1");

        // Short read at the end.
        let mut tail = [0u8; 8];
        assert_eq!(input.read_at(8, &mut tail).unwrap(), 2);
        assert_eq!(&tail[..2], b"65");
    }

    /// Hands out at most three bytes per read and fails the read numbered
    /// `fail_at` once.
    #[derive(Debug)]
    struct FlakyReader {
        data: Cursor<Vec<u8>>,
        reads: usize,
        fail_at: Option<usize>,
    }

    impl Read for FlakyReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.reads += 1;
            if self.fail_at == Some(self.reads) {
                self.fail_at = None;
                return Err(std::io::Error::other("transient read failure"));
            }
            let n = buf.len().min(3);
            self.data.read(&mut buf[..n])
        }
    }

    impl Seek for FlakyReader {
        fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
            self.data.seek(pos)
        }
    }

    #[test]
    fn test_retry_after_failed_read_rereads_from_offset() {
        let reader = FlakyReader {
            data: Cursor::new(b"0123456789".to_vec()),
            reads: 0,
            fail_at: Some(2),
        };
        let mut input = FileInput::from_reader(reader, 10, 4);

        let mut buf = [0u8; 8];
        assert!(matches!(
            input.read_at(0, &mut buf),
            Err(crate::error::PiSearchError::Io(_))
        ));

        // The failed call consumed three bytes; the retry must not pick up
        // where it stopped.
        input.read_exact_at(0, &mut buf).unwrap();
        assert_eq!(&buf, b"01234567");

        let mut tail = [0u8; 2];
        input.read_exact_at(8, &mut tail).unwrap();
        assert_eq!(&tail, b"89");
    }

    #[test]
    fn test_forward_skip_within_buffer() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        let mut input = FileInput::open(&path, 8).unwrap();
        let mut buf = [0u8; 2];
        input.read_exact_at(1, &mut buf).unwrap();
        assert_eq!(&buf, b"12");
        input.read_exact_at(5, &mut buf).unwrap();
        assert_eq!(&buf, b"56");
        input.read_exact_at(9, &mut buf[..1]).unwrap();
        assert_eq!(&buf[..1], b"9");
    }

    #[test]
    fn test_open_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileInput::open(temp_dir.path().join("missing"), 16);
        assert!(matches!(result, Err(crate::error::PiSearchError::Io(_))));
    }
}
