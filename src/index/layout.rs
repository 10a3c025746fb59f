//! On-disk layout of the bucket index.
//!
//! ```text
//! offset 0:                  u64   psize
//! offset 8:                  u64 × (10^psize + 1)   cumulative offsets
//! offset 8 + 8·(10^psize+1): u32 × n                positions
//! ```
//!
//! All integers are little-endian. Offset table entry `b` is the absolute
//! file offset where bucket `b`'s positions begin; the final entry is the
//! file length. Within a bucket, positions are in ascending order.

use crate::error::{PiSearchError, Result};
use crate::pattern::Pattern;

/// Smallest supported key width.
pub const MIN_PSIZE: usize = 1;

/// Largest supported key width. `10^9` buckets already needs an 8 GB
/// offset table.
pub const MAX_PSIZE: usize = 9;

/// Size of the header (the `psize` field).
pub const HEADER_SIZE: u64 = 8;

/// Size of an offset table entry.
pub const OFFSET_ENTRY_SIZE: u64 = 8;

/// Size of a position table entry.
pub const POSITION_ENTRY_SIZE: u64 = 4;

/// Geometry of an index with a given key width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexLayout {
    psize: usize,
}

/// An inclusive range of bucket ids to scan for a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketRange {
    pub first: u64,
    pub last: u64,
    /// Whether candidates must be checked against the digit stream, i.e.
    /// the pattern is longer than the key.
    pub needs_verification: bool,
}

impl IndexLayout {
    /// Layout for a key width chosen by the caller.
    pub fn new(psize: usize) -> Result<Self> {
        if !(MIN_PSIZE..=MAX_PSIZE).contains(&psize) {
            return Err(PiSearchError::invalid_config(format!(
                "psize must be between {MIN_PSIZE} and {MAX_PSIZE}, got {psize}"
            )));
        }
        Ok(IndexLayout { psize })
    }

    /// Layout for a key width read from an index header.
    pub fn from_header(raw: u64) -> Result<Self> {
        usize::try_from(raw)
            .ok()
            .and_then(|psize| IndexLayout::new(psize).ok())
            .ok_or_else(|| {
                PiSearchError::malformed_index(format!("header holds unsupported psize {raw}"))
            })
    }

    pub fn psize(&self) -> usize {
        self.psize
    }

    /// Number of buckets, `10^psize`.
    pub fn bucket_count(&self) -> u64 {
        10u64.pow(self.psize as u32)
    }

    /// File offset of offset table entry `bucket` (`0..=bucket_count`).
    pub fn offset_entry(&self, bucket: u64) -> u64 {
        HEADER_SIZE + bucket * OFFSET_ENTRY_SIZE
    }

    /// File offset where the position table begins.
    pub fn positions_start(&self) -> u64 {
        self.offset_entry(self.bucket_count() + 1)
    }

    /// Buckets whose keys start with `pattern`.
    ///
    /// A pattern no longer than the key is a prefix of `10^(psize - len)`
    /// consecutive keys. A longer pattern is truncated to the key width and
    /// maps to a single bucket.
    pub fn bucket_range(&self, pattern: &Pattern) -> BucketRange {
        if pattern.len() <= self.psize {
            let span = 10u64.pow((self.psize - pattern.len()) as u32);
            let first = pattern.prefix_value(pattern.len()) * span;
            BucketRange {
                first,
                last: first + span - 1,
                needs_verification: false,
            }
        } else {
            let bucket = pattern.prefix_value(self.psize);
            BucketRange {
                first: bucket,
                last: bucket,
                needs_verification: true,
            }
        }
    }
}
