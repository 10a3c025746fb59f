//! Read access to an index file's header and offset table.

use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{PiSearchError, Result};
use crate::index::layout::{BucketRange, IndexLayout, OFFSET_ENTRY_SIZE, POSITION_ENTRY_SIZE};
use crate::pattern::Pattern;
use crate::storage::{StorageConfig, StorageInput, open_input};

/// Offset table entries read per block when walking the whole table.
const OFFSET_BLOCK_ENTRIES: u64 = 8192;

/// The byte range of the position table that holds a pattern's candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryBounds {
    /// Absolute file offset of the first candidate entry.
    pub start: u64,
    /// Absolute file offset one past the last candidate entry.
    pub end: u64,
    pub buckets: BucketRange,
}

impl QueryBounds {
    pub fn needs_verification(&self) -> bool {
        self.buckets.needs_verification
    }

    /// Number of position entries in the range.
    pub fn entry_count(&self) -> u64 {
        (self.end - self.start) / POSITION_ENTRY_SIZE
    }
}

/// Summary of an index file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub psize: usize,
    pub bucket_count: u64,
    pub position_count: u64,
    pub non_empty_buckets: u64,
    pub largest_bucket: u64,
    pub file_size: u64,
}

/// An open index file.
#[derive(Debug)]
pub struct IndexFile {
    input: Box<dyn StorageInput>,
    layout: IndexLayout,
    file_size: u64,
}

impl IndexFile {
    pub fn open<P: AsRef<Path>>(path: P, config: &StorageConfig) -> Result<Self> {
        Self::from_input(open_input(path, config)?)
    }

    /// Read and check the header of `input`.
    pub fn from_input(mut input: Box<dyn StorageInput>) -> Result<Self> {
        let raw = input
            .read_u64_at(0)
            .map_err(|e| e.eof_as_malformed("index header"))?;
        let layout = IndexLayout::from_header(raw)?;
        let file_size = input.size()?;

        if file_size < layout.positions_start() {
            return Err(PiSearchError::malformed_index(format!(
                "file is {file_size} bytes but a psize {} offset table ends at {}",
                layout.psize(),
                layout.positions_start()
            )));
        }

        debug!(
            "Opened psize {} index ({file_size} bytes)",
            layout.psize()
        );
        Ok(IndexFile {
            input,
            layout,
            file_size,
        })
    }

    pub fn layout(&self) -> IndexLayout {
        self.layout
    }

    pub fn psize(&self) -> usize {
        self.layout.psize()
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Offset table entry for `bucket` (`0..=bucket_count`).
    pub fn offset(&mut self, bucket: u64) -> Result<u64> {
        self.input
            .read_u64_at(self.layout.offset_entry(bucket))
            .map_err(|e| e.eof_as_malformed("offset table"))
    }

    /// Resolve the position-table byte range to scan for `pattern`.
    pub fn bounds(&mut self, pattern: &Pattern) -> Result<QueryBounds> {
        let buckets = self.layout.bucket_range(pattern);
        let start = self.offset(buckets.first)?;
        let end = self.offset(buckets.last + 1)?;

        if start > end
            || start < self.layout.positions_start()
            || end > self.file_size
            || (end - start) % POSITION_ENTRY_SIZE != 0
        {
            return Err(PiSearchError::malformed_index(format!(
                "buckets {}..={} map to invalid range {start}..{end}",
                buckets.first, buckets.last
            )));
        }

        debug!(
            "Pattern {pattern} -> buckets {}..={}, bytes {start}..{end}",
            buckets.first, buckets.last
        );
        Ok(QueryBounds {
            start,
            end,
            buckets,
        })
    }

    /// Read `out.len()` position entries starting at absolute offset `offset`.
    pub fn read_positions(&mut self, offset: u64, out: &mut [u32]) -> Result<()> {
        let mut buf = vec![0u8; out.len() * POSITION_ENTRY_SIZE as usize];
        self.input
            .read_exact_at(offset, &mut buf)
            .map_err(|e| e.eof_as_malformed("position table"))?;
        LittleEndian::read_u32_into(&buf, out);
        Ok(())
    }

    /// Read the position entry at absolute offset `offset`.
    pub fn read_position(&mut self, offset: u64) -> Result<u32> {
        self.input
            .read_u32_at(offset)
            .map_err(|e| e.eof_as_malformed("position table"))
    }

    /// The non-empty `(start, end)` byte ranges of each bucket in `buckets`,
    /// in bucket order.
    pub fn bucket_spans(&mut self, buckets: BucketRange) -> Result<Vec<(u64, u64)>> {
        let positions_start = self.layout.positions_start();
        let file_size = self.file_size;
        let mut spans = Vec::new();
        let mut previous: Option<u64> = None;

        self.for_each_offset(buckets.first, buckets.last + 2, |bucket, offset| {
            if let Some(start) = previous {
                if start > offset
                    || start < positions_start
                    || offset > file_size
                    || (offset - start) % POSITION_ENTRY_SIZE != 0
                {
                    return Err(PiSearchError::malformed_index(format!(
                        "bucket {} maps to invalid range {start}..{offset}",
                        bucket - 1
                    )));
                }
                if offset > start {
                    spans.push((start, offset));
                }
            }
            previous = Some(offset);
            Ok(())
        })?;
        Ok(spans)
    }

    /// Call `f` with the offset table entries for buckets `first..end`.
    fn for_each_offset<F: FnMut(u64, u64) -> Result<()>>(
        &mut self,
        first: u64,
        end: u64,
        mut f: F,
    ) -> Result<()> {
        let mut bucket = first;
        while bucket < end {
            let count = OFFSET_BLOCK_ENTRIES.min(end - bucket);
            let mut buf = vec![0u8; (count * OFFSET_ENTRY_SIZE) as usize];
            self.input
                .read_exact_at(self.layout.offset_entry(bucket), &mut buf)
                .map_err(|e| e.eof_as_malformed("offset table"))?;
            for (i, chunk) in buf.chunks_exact(OFFSET_ENTRY_SIZE as usize).enumerate() {
                f(bucket + i as u64, LittleEndian::read_u64(chunk))?;
            }
            bucket += count;
        }
        Ok(())
    }

    /// Compute bucket statistics by walking the offset table.
    pub fn stats(&mut self) -> Result<IndexStats> {
        let mut previous: Option<u64> = None;
        let mut non_empty_buckets = 0;
        let mut largest_bucket = 0;
        let mut last = self.layout.positions_start();

        let entries = self.layout.bucket_count() + 1;
        self.for_each_offset(0, entries, |_, offset| {
            if let Some(prev) = previous {
                let entries = offset.saturating_sub(prev) / POSITION_ENTRY_SIZE;
                if entries > 0 {
                    non_empty_buckets += 1;
                }
                largest_bucket = largest_bucket.max(entries);
            }
            previous = Some(offset);
            last = offset;
            Ok(())
        })?;

        Ok(IndexStats {
            psize: self.layout.psize(),
            bucket_count: self.layout.bucket_count(),
            position_count: last.saturating_sub(self.layout.positions_start())
                / POSITION_ENTRY_SIZE,
            non_empty_buckets,
            largest_bucket,
            file_size: self.file_size,
        })
    }

    /// Check the structural invariants of the offset table.
    ///
    /// The first entry must point just past the offset table, entries must
    /// be non-decreasing and aligned to position entries, and the last entry
    /// must equal the file length.
    pub fn validate(&mut self) -> Result<()> {
        let positions_start = self.layout.positions_start();
        let bucket_count = self.layout.bucket_count();
        let file_size = self.file_size;
        let mut previous = positions_start;

        self.for_each_offset(0, bucket_count + 1, |bucket, offset| {
            if bucket == 0 && offset != positions_start {
                return Err(PiSearchError::malformed_index(format!(
                    "first offset is {offset}, expected {positions_start}"
                )));
            }
            if offset < previous {
                return Err(PiSearchError::malformed_index(format!(
                    "offset of bucket {bucket} ({offset}) is below its predecessor ({previous})"
                )));
            }
            if (offset - positions_start) % POSITION_ENTRY_SIZE != 0 {
                return Err(PiSearchError::malformed_index(format!(
                    "offset of bucket {bucket} ({offset}) is not entry aligned"
                )));
            }
            if bucket == bucket_count && offset != file_size {
                return Err(PiSearchError::malformed_index(format!(
                    "last offset is {offset} but the file is {file_size} bytes"
                )));
            }
            previous = offset;
            Ok(())
        })
    }

    pub fn close(&mut self) -> Result<()> {
        self.input.close()
    }
}
