//! Query sessions over a bucket index.

use std::path::Path;

use log::debug;

use crate::config::SearchConfig;
use crate::digits::DigitStream;
use crate::error::Result;
use crate::index::cursor::QueryCursor;
use crate::index::layout::IndexLayout;
use crate::index::ordered::OrderedCursor;
use crate::index::table::{IndexFile, IndexStats, QueryBounds};
use crate::pattern::Pattern;

/// An index file paired with the digit stream it was built from.
///
/// Both files stay open for the lifetime of the reader. Queries borrow the
/// reader mutably, so one query runs at a time.
#[derive(Debug)]
pub struct IndexReader {
    pub(crate) index: IndexFile,
    pub(crate) digits: DigitStream,
}

impl IndexReader {
    /// Open `index` and `digits` with the default configuration.
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(index: P, digits: Q) -> Result<Self> {
        Self::open_with_config(index, digits, &SearchConfig::default())
    }

    pub fn open_with_config<P: AsRef<Path>, Q: AsRef<Path>>(
        index: P,
        digits: Q,
        config: &SearchConfig,
    ) -> Result<Self> {
        let index_file = IndexFile::open(index.as_ref(), &config.storage)?;
        let digits = DigitStream::open(digits.as_ref(), config.skip, &config.storage)?;
        debug!(
            "Reader ready: {} over {}",
            index.as_ref().display(),
            digits_display(&digits)
        );
        Ok(Self::new(index_file, digits))
    }

    pub fn new(index: IndexFile, digits: DigitStream) -> Self {
        IndexReader { index, digits }
    }

    pub fn layout(&self) -> IndexLayout {
        self.index.layout()
    }

    pub fn psize(&self) -> usize {
        self.index.psize()
    }

    /// Resolve the position-table range for `pattern`.
    pub fn bounds(&mut self, pattern: &Pattern) -> Result<QueryBounds> {
        self.index.bounds(pattern)
    }

    /// Start a query for `pattern`.
    pub fn begin_query(&mut self, pattern: &str) -> Result<QueryCursor<'_>> {
        let pattern = Pattern::new(pattern)?;
        self.begin(pattern)
    }

    /// Start a query for an already validated pattern.
    pub fn begin(&mut self, pattern: Pattern) -> Result<QueryCursor<'_>> {
        let bounds = self.index.bounds(&pattern)?;
        Ok(QueryCursor::new(self, pattern, bounds))
    }

    /// Start a query whose hits come out in ascending position order, even
    /// when the pattern spans several buckets.
    pub fn begin_ordered(&mut self, pattern: Pattern) -> Result<OrderedCursor<'_>> {
        let bounds = self.index.bounds(&pattern)?;
        OrderedCursor::new(self, pattern, bounds)
    }

    /// Context length used for display when the caller does not pick one:
    /// twice the longer of the key width and the pattern.
    pub fn default_context_length(&self, pattern: &Pattern) -> usize {
        self.psize().max(pattern.len()) * 2
    }

    pub fn stats(&mut self) -> Result<IndexStats> {
        self.index.stats()
    }

    pub fn validate(&mut self) -> Result<()> {
        self.index.validate()
    }

    /// Close both files.
    pub fn close(mut self) -> Result<()> {
        self.index.close()?;
        self.digits.close()
    }
}

fn digits_display(digits: &DigitStream) -> String {
    match digits.max_len() {
        Ok(len) => format!("up to {len} digits"),
        Err(_) => "digit stream".to_string(),
    }
}
