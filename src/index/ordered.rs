//! Position-ordered iteration across several buckets.
//!
//! A pattern shorter than the key width spans a run of buckets, each sorted
//! by position. [`OrderedCursor`] merges those runs so hits come out in
//! stream order, reading one entry per bucket up front and then only as
//! many entries and context digits as the caller consumes.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::debug;

use crate::error::Result;
use crate::hit::Hit;
use crate::index::cursor::resolve_hit;
use crate::index::layout::POSITION_ENTRY_SIZE;
use crate::index::reader::IndexReader;
use crate::index::table::QueryBounds;
use crate::pattern::Pattern;

/// Next unread entry of one bucket: `(position, offset, end)`.
type BucketHead = (u32, u64, u64);

/// A query whose hits come out in ascending position order.
///
/// Created by [`IndexReader::begin_ordered`].
#[derive(Debug)]
pub struct OrderedCursor<'a> {
    reader: &'a mut IndexReader,
    pattern: Pattern,
    needs_verification: bool,
    context_length: usize,
    heads: BinaryHeap<Reverse<BucketHead>>,
    failed: bool,
}

impl<'a> OrderedCursor<'a> {
    pub(crate) fn new(reader: &'a mut IndexReader, pattern: Pattern, bounds: QueryBounds) -> Result<Self> {
        let spans = reader.index.bucket_spans(bounds.buckets)?;
        let mut heads = Vec::with_capacity(spans.len());
        for (start, end) in spans {
            let position = reader.index.read_position(start)?;
            heads.push(Reverse((position, start, end)));
        }
        debug!(
            "Merging {} non-empty bucket(s) for {pattern}",
            heads.len()
        );

        Ok(OrderedCursor {
            reader,
            pattern,
            needs_verification: bounds.needs_verification(),
            context_length: 0,
            heads: BinaryHeap::from(heads),
            failed: false,
        })
    }

    /// Return `len` digits of context with each hit. Zero means no context.
    pub fn with_context(mut self, len: usize) -> Self {
        self.context_length = len;
        self
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// True once no candidates remain. Without verification this also means
    /// no hits remain.
    pub fn is_exhausted(&self) -> bool {
        self.heads.is_empty()
    }

    /// Advance to the next hit.
    pub fn step(&mut self) -> Result<Option<Hit>> {
        if self.failed {
            return Ok(None);
        }
        let result = self.advance();
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn advance(&mut self) -> Result<Option<Hit>> {
        while let Some(Reverse((position, offset, end))) = self.heads.pop() {
            let next = offset + POSITION_ENTRY_SIZE;
            if next < end {
                let following = self.reader.index.read_position(next)?;
                self.heads.push(Reverse((following, next, end)));
            }

            let hit = resolve_hit(
                &mut self.reader.digits,
                &self.pattern,
                self.needs_verification,
                self.context_length,
                u64::from(position),
            )?;
            if hit.is_some() {
                return Ok(hit);
            }
        }
        Ok(None)
    }
}

impl Iterator for OrderedCursor<'_> {
    type Item = Result<Hit>;

    fn next(&mut self) -> Option<Self::Item> {
        self.step().transpose()
    }
}
