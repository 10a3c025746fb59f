//! Search results.

use serde::{Deserialize, Serialize};

/// One occurrence of a pattern in the digit stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    /// Zero-based digit position where the occurrence starts.
    pub position: u64,

    /// Digits starting at `position`, for display. Empty when no context
    /// was requested.
    pub context: String,
}

impl Hit {
    pub fn new(position: u64, context: impl Into<String>) -> Self {
        Hit {
            position,
            context: context.into(),
        }
    }
}
