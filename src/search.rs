//! Search sessions that pick the indexed or the streaming path.
//!
//! A [`Searcher`] uses the bucket index when one is available and falls
//! back to a full [`StreamSearch`] of the digit file otherwise. Both paths
//! report hits in the same position coordinates.

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::error::Result;
use crate::hit::Hit;
use crate::index::IndexReader;
use crate::matcher::StreamSearch;
use crate::pattern::Pattern;

/// Which path answered a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Indexed,
    Streaming,
}

/// Per-search options.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Digits of context per hit. `None` picks the path's default.
    pub context: Option<usize>,
    /// Stop after this many hits.
    pub limit: Option<usize>,
}

/// All hits for one pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub pattern: String,
    pub mode: SearchMode,
    pub hits: Vec<Hit>,
    /// Whether `limit` cut the result list short.
    pub truncated: bool,
    pub duration_ms: u64,
}

/// A search session over one digit file.
#[derive(Debug)]
pub struct Searcher {
    config: SearchConfig,
    digits_path: PathBuf,
    reader: Option<IndexReader>,
}

impl Searcher {
    /// Open a session. The index is used when `index` names an existing
    /// file; otherwise every search scans the digit file.
    pub fn open<P: AsRef<Path>>(digits: P, index: Option<&Path>, config: SearchConfig) -> Result<Self> {
        let digits_path = digits.as_ref().to_path_buf();
        let reader = match index {
            Some(index) if index.exists() => Some(IndexReader::open_with_config(
                index,
                &digits_path,
                &config,
            )?),
            Some(index) => {
                info!(
                    "No index at {}, falling back to stream scans",
                    index.display()
                );
                None
            }
            None => None,
        };

        Ok(Searcher {
            config,
            digits_path,
            reader,
        })
    }

    pub fn mode(&self) -> SearchMode {
        if self.reader.is_some() {
            SearchMode::Indexed
        } else {
            SearchMode::Streaming
        }
    }

    pub fn search(&mut self, pattern: &str, options: &SearchOptions) -> Result<SearchResults> {
        let pattern = Pattern::new(pattern)?;
        let start = std::time::Instant::now();
        let limit = options.limit.unwrap_or(usize::MAX);
        let mode = self.mode();

        let mut hits = Vec::new();
        let mut truncated = false;
        match self.reader.as_mut() {
            Some(reader) => {
                let context = options
                    .context
                    .unwrap_or_else(|| reader.default_context_length(&pattern));
                let buckets = reader.layout().bucket_range(&pattern);

                if buckets.first == buckets.last {
                    // One bucket is already in position order.
                    let mut cursor = reader.begin(pattern.clone())?.with_context(context);
                    while let Some(hit) = cursor.step()? {
                        if hits.len() == limit {
                            truncated = true;
                            break;
                        }
                        hits.push(hit);
                    }
                } else if options.limit.is_some() {
                    // Merge the buckets so only the kept hits are read.
                    let mut cursor = reader
                        .begin_ordered(pattern.clone())?
                        .with_context(context);
                    while hits.len() < limit {
                        match cursor.step()? {
                            Some(hit) => hits.push(hit),
                            None => break,
                        }
                    }
                    truncated = !cursor.is_exhausted();
                } else {
                    // Every hit is returned anyway; a sequential pass over
                    // the range and one sort beat hopping between buckets.
                    let mut cursor = reader.begin(pattern.clone())?.with_context(context);
                    while let Some(hit) = cursor.step()? {
                        hits.push(hit);
                    }
                    hits.sort_by_key(|hit| hit.position);
                }
            }
            None => {
                let mut config = self.config.clone();
                if let Some(context) = options.context {
                    config.context_lookahead = context.saturating_sub(pattern.len());
                }
                let no_context = options.context == Some(0);
                let mut scan = StreamSearch::open(&self.digits_path, pattern.clone(), &config)?;
                while let Some(mut hit) = scan.next_hit()? {
                    if hits.len() == limit {
                        truncated = true;
                        break;
                    }
                    if no_context {
                        hit.context.clear();
                    }
                    hits.push(hit);
                }
            }
        }

        Ok(SearchResults {
            pattern: pattern.to_string(),
            mode,
            hits,
            truncated,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    pub fn close(self) -> Result<()> {
        match self.reader {
            Some(reader) => reader.close(),
            None => Ok(()),
        }
    }
}
