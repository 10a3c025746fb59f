//! Configuration shared by the builder, the reader and the stream scanner.
//!
//! Every field has a default, so a JSON config file only needs the values
//! it changes:
//!
//! ```json
//! { "psize": 8, "storage": { "use_mmap": true } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::digits::DEFAULT_SKIP;
use crate::error::{PiSearchError, Result};
use crate::index::builder::BuildConfig;
use crate::index::layout::IndexLayout;
use crate::matcher::DEFAULT_LOOKAHEAD;
use crate::storage::StorageConfig;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Key width for newly built indexes.
    ///
    /// Building keeps `10^psize` lists plus every position in memory, so
    /// this is a capacity-planning input: 8 is the practical ceiling for a
    /// billion digits.
    pub psize: usize,

    /// Bytes preceding digit position 0 in the digit file.
    pub skip: u64,

    /// Extra digits shown after each stream scan hit.
    pub context_lookahead: usize,

    /// Log a progress line every this many digits during a build; 0 disables.
    pub progress_interval: u64,

    /// Capacity each bucket list starts with before doubling.
    pub initial_bucket_capacity: usize,

    /// Storage backend options.
    pub storage: StorageConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            psize: 7,
            skip: DEFAULT_SKIP,
            context_lookahead: DEFAULT_LOOKAHEAD,
            progress_interval: 1_000_000,
            initial_bucket_capacity: 8,
            storage: StorageConfig::default(),
        }
    }
}

impl SearchConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PiSearchError::invalid_config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config: SearchConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<()> {
        IndexLayout::new(self.psize)?;
        if self.initial_bucket_capacity == 0 {
            return Err(PiSearchError::invalid_config(
                "initial_bucket_capacity must be at least 1",
            ));
        }
        if self.storage.buffer_size == 0 {
            return Err(PiSearchError::invalid_config(
                "storage.buffer_size must be at least 1",
            ));
        }
        Ok(())
    }

    /// Builder settings derived from this configuration.
    pub fn build_config(&self) -> BuildConfig {
        BuildConfig {
            psize: self.psize,
            skip: self.skip,
            initial_bucket_capacity: self.initial_bucket_capacity,
            progress_interval: self.progress_interval,
            storage: self.storage.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.psize, 7);
        assert_eq!(config.skip, 1);
        assert_eq!(config.context_lookahead, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pisearch.json");
        fs::write(&path, r#"{ "psize": 4, "storage": { "use_mmap": true } }"#).unwrap();

        let config = SearchConfig::from_file(&path).unwrap();
        assert_eq!(config.psize, 4);
        assert!(config.storage.use_mmap);
        assert_eq!(config.storage.buffer_size, 65536);
        assert_eq!(config.skip, 1);
    }

    #[test]
    fn test_invalid_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pisearch.json");

        fs::write(&path, r#"{ "psize": 12 }"#).unwrap();
        assert!(matches!(
            SearchConfig::from_file(&path),
            Err(PiSearchError::InvalidConfig(_))
        ));

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            SearchConfig::from_file(&path),
            Err(PiSearchError::Json(_))
        ));

        assert!(matches!(
            SearchConfig::from_file(dir.path().join("missing.json")),
            Err(PiSearchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_build_config_follows_search_config() {
        let config = SearchConfig {
            psize: 5,
            progress_interval: 0,
            ..Default::default()
        };
        let build = config.build_config();
        assert_eq!(build.psize, 5);
        assert_eq!(build.progress_interval, 0);
        assert_eq!(build.skip, 1);
    }
}
