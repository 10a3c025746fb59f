//! The positional bucket index.
//!
//! Every `psize`-digit window of the digit stream falls into one of
//! `10^psize` buckets keyed by the window's numeric value. The index file
//! stores, per bucket, the positions of its windows. Because numeric order
//! of keys matches lexicographic order of digits, a pattern of at most
//! `psize` digits maps to one contiguous run of buckets, and a longer
//! pattern to the single bucket of its first `psize` digits, with each
//! candidate verified against the digit stream.

pub mod builder;
pub mod cursor;
pub mod layout;
pub mod ordered;
pub mod reader;
pub mod table;

// Re-export commonly used types
pub use builder::{BuildConfig, BuildSummary, IndexBuilder};
pub use cursor::QueryCursor;
pub use layout::{BucketRange, IndexLayout, MAX_PSIZE, MIN_PSIZE};
pub use ordered::OrderedCursor;
pub use reader::IndexReader;
pub use table::{IndexFile, IndexStats, QueryBounds};
