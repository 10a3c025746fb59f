//! Index-free search with Boyer–Moore–Horspool.
//!
//! [`StreamSearch`] reads the digit stream front to back through a bounded
//! read-ahead buffer and yields every occurrence of the pattern in position
//! order. It needs no index and does no random access, so it serves as the
//! fallback when no index exists and as the reference the index is checked
//! against.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use log::debug;

use crate::config::SearchConfig;
use crate::digits::{leading_digits, open_sequential};
use crate::error::Result;
use crate::hit::Hit;
use crate::pattern::Pattern;

/// Digits of context shown past the end of each match.
pub const DEFAULT_LOOKAHEAD: usize = 8;

/// Read-ahead buffer size as a multiple of the pattern length.
const BUFFER_PATTERN_MULTIPLE: usize = 16;

/// Horspool bad-character table: how far the window may move given the
/// byte under its last position.
pub fn bad_char_skip(pattern: &[u8]) -> [usize; 256] {
    let len = pattern.len();
    let mut skip = [len; 256];
    let last = len.saturating_sub(1);
    for (i, &b) in pattern[..last].iter().enumerate() {
        skip[b as usize] = last - i;
    }
    skip
}

/// Search the digit file at `path` for `pattern` with the default
/// configuration.
pub fn stream_search<P: AsRef<Path>>(path: P, pattern: &str) -> Result<StreamSearch<BufReader<File>>> {
    StreamSearch::open(path, Pattern::new(pattern)?, &SearchConfig::default())
}

/// A lazy, forward-only scan for one pattern.
#[derive(Debug)]
pub struct StreamSearch<R> {
    reader: R,
    pattern: Pattern,
    skip: [usize; 256],
    lookahead: usize,
    buffer: Vec<u8>,
    /// Start of the current window within `buffer`.
    head: usize,
    capacity: usize,
    /// Stream position of the current window.
    position: u64,
    eof: bool,
    failed: bool,
}

impl StreamSearch<BufReader<File>> {
    /// Open the digit file at `path` and scan it for `pattern`.
    pub fn open<P: AsRef<Path>>(path: P, pattern: Pattern, config: &SearchConfig) -> Result<Self> {
        let reader = open_sequential(path.as_ref(), config.skip, config.storage.buffer_size)?;
        debug!("Scanning {} for {pattern}", path.as_ref().display());
        Ok(StreamSearch::new(reader, pattern, config.context_lookahead))
    }
}

impl<R: Read> StreamSearch<R> {
    /// Scan `reader`, which must be positioned at digit 0.
    pub fn new(reader: R, pattern: Pattern, lookahead: usize) -> Self {
        let len = pattern.len();
        let capacity = (len * BUFFER_PATTERN_MULTIPLE).max(len + lookahead);
        StreamSearch {
            reader,
            skip: bad_char_skip(pattern.as_bytes()),
            pattern,
            lookahead,
            buffer: Vec::with_capacity(capacity),
            head: 0,
            capacity,
            position: 0,
            eof: false,
            failed: false,
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Stream position of the window that will be tested next.
    pub fn position(&self) -> u64 {
        self.position
    }

    fn available(&self) -> usize {
        self.buffer.len() - self.head
    }

    /// Top the buffer up once the window plus its context no longer fits.
    fn fill(&mut self) -> Result<()> {
        if self.eof || self.available() >= self.pattern.len() + self.lookahead {
            return Ok(());
        }

        self.buffer.drain(..self.head);
        self.head = 0;

        while !self.eof && self.buffer.len() < self.capacity {
            let filled = self.buffer.len();
            self.buffer.resize(self.capacity, 0);
            match self.reader.read(&mut self.buffer[filled..]) {
                Ok(0) => {
                    self.buffer.truncate(filled);
                    self.eof = true;
                }
                Ok(n) => {
                    // The stream ends at the first non-digit byte.
                    let fresh = &self.buffer[filled..filled + n];
                    match fresh.iter().position(|b| !b.is_ascii_digit()) {
                        Some(stop) => {
                            self.buffer.truncate(filled + stop);
                            self.eof = true;
                            debug!("Digit stream ends at a non-digit byte");
                        }
                        None => self.buffer.truncate(filled + n),
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => self.buffer.truncate(filled),
                Err(e) => {
                    self.buffer.truncate(filled);
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    /// Advance to the next occurrence.
    pub fn next_hit(&mut self) -> Result<Option<Hit>> {
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
        let len = self.pattern.len();
        let last = len - 1;

        loop {
            self.fill()?;
            if self.available() < len {
                return Ok(None);
            }

            let window = &self.buffer[self.head..];
            let pattern = self.pattern.as_bytes();
            let hit = if (0..len).rev().all(|i| window[i] == pattern[i]) {
                let context_end = (len + self.lookahead).min(window.len());
                Some(Hit::new(self.position, leading_digits(&window[..context_end])))
            } else {
                None
            };

            let shift = self.skip[window[last] as usize];
            self.head += shift;
            self.position += shift as u64;

            if hit.is_some() {
                return Ok(hit);
            }
        }
    }
}

impl<R: Read> Iterator for StreamSearch<R> {
    type Item = Result<Hit>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_hit().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn scan(haystack: &str, pattern: &str, lookahead: usize) -> Vec<Hit> {
        StreamSearch::new(
            Cursor::new(haystack.as_bytes().to_vec()),
            Pattern::new(pattern).unwrap(),
            lookahead,
        )
        .collect::<Result<Vec<_>>>()
        .unwrap()
    }

    fn naive(haystack: &str, pattern: &str) -> Vec<u64> {
        (0..=haystack.len().saturating_sub(pattern.len()))
            .filter(|&i| haystack[i..].starts_with(pattern))
            .map(|i| i as u64)
            .collect()
    }

    #[test]
    fn test_bad_char_skip() {
        let skip = bad_char_skip(b"1592");
        assert_eq!(skip[b'1' as usize], 3);
        assert_eq!(skip[b'5' as usize], 2);
        assert_eq!(skip[b'9' as usize], 1);
        // The last byte keeps the default unless it also occurs earlier.
        assert_eq!(skip[b'2' as usize], 4);
        assert_eq!(skip[b'0' as usize], 4);

        let skip = bad_char_skip(b"7");
        assert!(skip.iter().all(|&s| s == 1));
    }

    #[test]
    fn test_finds_example_occurrence() {
        let hits = scan("314159265358979", "59", 8);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].position, 4);
        assert_eq!(hits[0].context, "5926535897");
    }

    #[test]
    fn test_position_zero_and_overlaps() {
        let hits = scan("1111", "11", 0);
        let positions: Vec<u64> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_context_truncated_at_stream_end() {
        let hits = scan("0000979\n", "979", 8);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].position, 4);
        assert_eq!(hits[0].context, "979");
    }

    #[test]
    fn test_digits_after_a_non_digit_are_ignored() {
        assert!(scan("1415\n9265\n", "26", 8).is_empty());
        assert!(scan("1415\n9265\n", "59", 8).is_empty());
        assert_eq!(
            scan("1415x1415", "1415", 8)
                .iter()
                .map(|h| h.position)
                .collect::<Vec<_>>(),
            vec![0]
        );
    }

    #[test]
    fn test_no_match_and_short_stream() {
        assert!(scan("314159", "2718", 8).is_empty());
        assert!(scan("31", "314", 8).is_empty());
        assert!(scan("", "3", 8).is_empty());
    }

    #[test]
    fn test_agrees_with_naive_search_across_refills() {
        // Long enough to force many buffer refills for short patterns.
        let haystack: String = (0..5000u32)
            .map(|i| char::from(b'0' + ((i * 7 + i / 13) % 10) as u8))
            .collect();

        for pattern in ["0", "12", "907", "4815", "3333", "78901234"] {
            let found: Vec<u64> = scan(&haystack, pattern, 8)
                .iter()
                .map(|h| h.position)
                .collect();
            assert_eq!(found, naive(&haystack, pattern), "pattern {pattern}");
        }
    }
}
