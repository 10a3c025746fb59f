//! # pisearch
//!
//! Find digit strings in the digits of π.
//!
//! ## Features
//!
//! - Positional bucket index: every `psize`-digit window is filed under its
//!   numeric value, so a lookup reads one contiguous slice of the index
//! - Patterns shorter than the key width served as a bucket range, longer
//!   ones verified against the digit file
//! - Lazy query cursors with an upper bound on remaining results
//! - Index-free Boyer–Moore–Horspool scan as fallback
//! - Buffered-file or memory-mapped storage
//!
//! ## Example
//!
//! ```no_run
//! use pisearch::index::{BuildConfig, IndexBuilder, IndexReader};
//!
//! # fn main() -> pisearch::error::Result<()> {
//! IndexBuilder::new(BuildConfig { psize: 7, ..Default::default() })?
//!     .build("pi.index", "pi-billion.txt")?;
//!
//! let mut reader = IndexReader::open("pi.index", "pi-billion.txt")?;
//! for hit in reader.begin_query("14159265")?.with_context(16) {
//!     let hit = hit?;
//!     println!("{}: {}", hit.position, hit.context);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod digits;
pub mod error;
pub mod hit;
pub mod index;
pub mod matcher;
pub mod pattern;
pub mod search;
pub mod storage;

pub mod prelude {
    pub use crate::config::SearchConfig;
    pub use crate::error::{PiSearchError, Result};
    pub use crate::hit::Hit;
    pub use crate::index::{BuildConfig, IndexBuilder, IndexReader, OrderedCursor, QueryCursor};
    pub use crate::matcher::{StreamSearch, stream_search};
    pub use crate::pattern::Pattern;
    pub use crate::search::{SearchOptions, Searcher};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
