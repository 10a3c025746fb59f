//! Lazy iteration over a query's candidate positions.

use crate::digits::DigitStream;
use crate::error::Result;
use crate::hit::Hit;
use crate::index::layout::POSITION_ENTRY_SIZE;
use crate::index::reader::IndexReader;
use crate::index::table::QueryBounds;
use crate::pattern::Pattern;

/// Position entries fetched per read from the position table.
const PREFETCH_ENTRIES: u64 = 1024;

/// A query in progress.
///
/// Created by [`IndexReader::begin_query`]. Each [`step`](Self::step) yields
/// the next matching position, or `None` once the range is exhausted.
/// After an error the cursor yields nothing further.
#[derive(Debug)]
pub struct QueryCursor<'a> {
    reader: &'a mut IndexReader,
    pattern: Pattern,
    needs_verification: bool,
    single_bucket: bool,
    context_length: usize,
    /// Absolute file offset of the next entry to hand out.
    offset: u64,
    end: u64,
    prefetched: Vec<u32>,
    next_prefetched: usize,
    failed: bool,
}

impl<'a> QueryCursor<'a> {
    pub(crate) fn new(reader: &'a mut IndexReader, pattern: Pattern, bounds: QueryBounds) -> Self {
        QueryCursor {
            reader,
            pattern,
            needs_verification: bounds.needs_verification(),
            single_bucket: bounds.buckets.first == bounds.buckets.last,
            context_length: 0,
            offset: bounds.start,
            end: bounds.end,
            prefetched: Vec::new(),
            next_prefetched: 0,
            failed: false,
        }
    }

    /// Return `len` digits of context with each hit (at least the pattern
    /// length). Zero means no context.
    pub fn with_context(mut self, len: usize) -> Self {
        self.context_length = len;
        self
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn needs_verification(&self) -> bool {
        self.needs_verification
    }

    /// Whether the range is one bucket, in which case hits come out in
    /// ascending position order. Across buckets the order is bucket-major.
    pub fn is_position_ordered(&self) -> bool {
        self.single_bucket
    }

    /// Entries left in the range. Verification may reject some of them, so
    /// this is an upper bound on the remaining hits.
    pub fn result_count_upper_bound(&self) -> u64 {
        (self.end - self.offset) / POSITION_ENTRY_SIZE
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
        while self.offset < self.end {
            let position = self.next_entry()?;
            let hit = resolve_hit(
                &mut self.reader.digits,
                &self.pattern,
                self.needs_verification,
                self.context_length,
                position,
            )?;
            if hit.is_some() {
                return Ok(hit);
            }
        }
        Ok(None)
    }

    fn next_entry(&mut self) -> Result<u64> {
        if self.next_prefetched == self.prefetched.len() {
            let count = PREFETCH_ENTRIES.min(self.result_count_upper_bound()) as usize;
            self.prefetched.resize(count, 0);
            self.reader
                .index
                .read_positions(self.offset, &mut self.prefetched)?;
            self.next_prefetched = 0;
        }

        let position = self.prefetched[self.next_prefetched];
        self.next_prefetched += 1;
        self.offset += POSITION_ENTRY_SIZE;
        Ok(u64::from(position))
    }
}

/// Turn a candidate position into a hit: verify it against the digit
/// stream when required and attach `context_length` digits of context.
/// Returns `None` for a candidate that fails verification.
pub(crate) fn resolve_hit(
    digits: &mut DigitStream,
    pattern: &Pattern,
    needs_verification: bool,
    context_length: usize,
    position: u64,
) -> Result<Option<Hit>> {
    if !needs_verification && context_length == 0 {
        return Ok(Some(Hit::new(position, String::new())));
    }

    let len = pattern.len().max(context_length);
    let digits = digits.read_digits(position, len)?;
    if needs_verification && !digits.starts_with(pattern.as_str()) {
        return Ok(None);
    }

    let context = if context_length > 0 {
        digits
    } else {
        String::new()
    };
    Ok(Some(Hit::new(position, context)))
}

impl Iterator for QueryCursor<'_> {
    type Item = Result<Hit>;

    fn next(&mut self) -> Option<Self::Item> {
        self.step().transpose()
    }
}
