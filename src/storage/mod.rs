//! Storage abstraction layer for pisearch.
//!
//! The index reader and the digit stream both read through
//! [`StorageInput`], either a buffered file or a memory map depending on
//! [`StorageConfig::use_mmap`].

use std::path::Path;

use log::debug;

use crate::error::Result;

pub mod file;
pub mod mmap;
pub mod traits;

// Re-export commonly used types
pub use file::*;
pub use mmap::*;
pub use traits::*;

/// Open `path` for random-access reading with the backend chosen by `config`.
pub fn open_input<P: AsRef<Path>>(path: P, config: &StorageConfig) -> Result<Box<dyn StorageInput>> {
    let path = path.as_ref();
    if config.use_mmap {
        debug!("Mapping {}", path.display());
        Ok(Box::new(MmapInput::open(path)?))
    } else {
        debug!("Opening {}", path.display());
        Ok(Box::new(FileInput::open(path, config.buffer_size)?))
    }
}
