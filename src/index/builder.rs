//! One-pass construction of the bucket index.
//!
//! The builder slides a `psize`-digit window over the digit stream and
//! records each window's start position in the list for the bucket the
//! window's digits name. When the stream is exhausted it writes the header,
//! the cumulative offset table and the concatenated bucket lists.
//!
//! All `10^psize` lists and every position live in memory until the write
//! phase. Choosing `psize` is therefore a capacity-planning decision: the
//! builder fails with [`PiSearchError::ResourceExhausted`] when an
//! allocation cannot be satisfied rather than trying to bound itself.

use std::io::{ErrorKind, Read};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::digits::{DEFAULT_SKIP, open_sequential};
use crate::error::{PiSearchError, Result};
use crate::index::layout::{IndexLayout, POSITION_ENTRY_SIZE};
use crate::storage::{FileOutput, StorageConfig, StorageOutput};

/// Settings for an index build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Key width in digits.
    pub psize: usize,
    /// Bytes preceding digit position 0 in the digit file.
    pub skip: u64,
    /// Capacity each bucket list starts with before doubling.
    pub initial_bucket_capacity: usize,
    /// Log a progress line every this many digits; 0 disables.
    pub progress_interval: u64,
    pub storage: StorageConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            psize: 7,
            skip: DEFAULT_SKIP,
            initial_bucket_capacity: 8,
            progress_interval: 1_000_000,
            storage: StorageConfig::default(),
        }
    }
}

/// What a finished build produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub psize: usize,
    pub digits_read: u64,
    pub positions: u64,
    pub file_size: u64,
}

/// Per-bucket position lists.
#[derive(Debug)]
struct BucketLists {
    lists: Vec<Vec<u32>>,
    initial_capacity: usize,
}

impl BucketLists {
    fn new(bucket_count: u64, initial_capacity: usize) -> Result<Self> {
        let count = usize::try_from(bucket_count).map_err(|_| {
            PiSearchError::resource_exhausted(format!("{bucket_count} buckets do not fit in memory"))
        })?;

        let mut lists = Vec::new();
        lists.try_reserve_exact(count).map_err(|e| {
            PiSearchError::resource_exhausted(format!("allocating {count} bucket lists: {e}"))
        })?;
        lists.resize_with(count, Vec::new);

        Ok(BucketLists {
            lists,
            initial_capacity: initial_capacity.max(1),
        })
    }

    /// Append `position` to `bucket`, doubling the list when it is full.
    fn push(&mut self, bucket: usize, position: u32) -> Result<()> {
        let list = &mut self.lists[bucket];
        if list.len() == list.capacity() {
            let additional = if list.capacity() == 0 {
                self.initial_capacity
            } else {
                list.capacity()
            };
            list.try_reserve_exact(additional).map_err(|e| {
                PiSearchError::resource_exhausted(format!("growing bucket {bucket}: {e}"))
            })?;
        }
        list.push(position);
        Ok(())
    }
}

/// Builds bucket index files.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    config: BuildConfig,
    layout: IndexLayout,
}

impl IndexBuilder {
    pub fn new(config: BuildConfig) -> Result<Self> {
        let layout = IndexLayout::new(config.psize)?;
        Ok(IndexBuilder { config, layout })
    }

    pub fn layout(&self) -> IndexLayout {
        self.layout
    }

    /// Index the digit file at `digits` into a new index file at `output`.
    ///
    /// A failed build may leave a partial file at `output`.
    pub fn build<P: AsRef<Path>, Q: AsRef<Path>>(&self, output: P, digits: Q) -> Result<BuildSummary> {
        let digits = digits.as_ref();
        let output = output.as_ref();
        info!(
            "Building psize {} index of {} into {}",
            self.layout.psize(),
            digits.display(),
            output.display()
        );

        let reader = open_sequential(digits, self.config.skip, self.config.storage.buffer_size)?;
        let mut out = FileOutput::create(
            output,
            self.config.storage.buffer_size,
            self.config.storage.sync_writes,
        )?;
        let summary = self.build_from_reader(reader, &mut out)?;
        out.close()?;

        info!("Done.");
        Ok(summary)
    }

    /// Index digits read from `digits`, which must already be positioned at
    /// digit 0, writing the index to `out`.
    pub fn build_from_reader<R: Read, W: StorageOutput>(
        &self,
        digits: R,
        out: &mut W,
    ) -> Result<BuildSummary> {
        let mut lists = BucketLists::new(
            self.layout.bucket_count(),
            self.config.initial_bucket_capacity,
        )?;

        info!("Loading digits ...");
        let (digits_read, positions) = self.collect(digits, &mut lists)?;
        info!("{digits_read} digits loaded ...");

        let file_size = self.write(lists, out)?;
        Ok(BuildSummary {
            psize: self.layout.psize(),
            digits_read,
            positions,
            file_size,
        })
    }

    /// Fill `lists` from the digit stream. Returns the number of digits read
    /// and the number of windows recorded.
    fn collect<R: Read>(&self, digits: R, lists: &mut BucketLists) -> Result<(u64, u64)> {
        let psize = self.layout.psize();
        // Dropping the oldest digit of the window is `window % 10^(psize-1)`.
        let keep = self.layout.bucket_count() / 10;
        let interval = self.config.progress_interval;

        let mut window = 0u64;
        let mut primed = 0usize;
        let mut digits_read = 0u64;
        let mut next_position = 0u64;

        for byte in digits.bytes() {
            let byte = match byte {
                Ok(b) => b,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if !byte.is_ascii_digit() {
                debug!("Digit stream ends at byte {byte:#04x} after {digits_read} digits");
                break;
            }

            window = (window % keep) * 10 + u64::from(byte - b'0');
            digits_read += 1;
            if interval > 0 && digits_read % interval == 0 {
                info!("{digits_read} digits loaded ...");
            }

            if primed < psize {
                primed += 1;
                if primed < psize {
                    continue;
                }
            }

            let position = u32::try_from(next_position).map_err(|_| {
                PiSearchError::resource_exhausted(format!(
                    "position {next_position} does not fit in a 32-bit position entry"
                ))
            })?;
            lists.push(window as usize, position)?;
            next_position += 1;
        }

        Ok((digits_read, next_position))
    }

    /// Write header, offset table and position table. Returns the file size.
    fn write<W: StorageOutput>(&self, lists: BucketLists, out: &mut W) -> Result<u64> {
        info!("Writing index ...");
        out.write_u64::<LittleEndian>(self.layout.psize() as u64)?;

        let mut offset = self.layout.positions_start();
        for list in &lists.lists {
            out.write_u64::<LittleEndian>(offset)?;
            offset += list.len() as u64 * POSITION_ENTRY_SIZE;
        }
        out.write_u64::<LittleEndian>(offset)?;

        info!("Writing tables ...");
        for list in lists.lists {
            for position in list {
                out.write_u32::<LittleEndian>(position)?;
            }
        }

        debug_assert_eq!(out.position(), offset);
        Ok(offset)
    }
}
