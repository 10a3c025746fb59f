//! Validated digit patterns.

use std::fmt;
use std::str::FromStr;

use crate::error::{PiSearchError, Result};

/// A non-empty string of ASCII decimal digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern(String);

impl Pattern {
    /// Validate `pattern`, rejecting empty strings and non-digit characters.
    pub fn new<S: Into<String>>(pattern: S) -> Result<Self> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(PiSearchError::invalid_pattern("pattern is empty"));
        }
        if let Some(c) = pattern.chars().find(|c| !c.is_ascii_digit()) {
            return Err(PiSearchError::invalid_pattern(format!(
                "{pattern:?} contains non-digit character {c:?}"
            )));
        }
        Ok(Pattern(pattern))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Number of digits in the pattern. Always at least one.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The numeric value of the first `digits` digits (all of them if the
    /// pattern is shorter).
    pub fn prefix_value(&self, digits: usize) -> u64 {
        self.as_bytes()
            .iter()
            .take(digits)
            .fold(0u64, |acc, &b| acc * 10 + u64::from(b - b'0'))
    }
}

impl FromStr for Pattern {
    type Err = PiSearchError;

    fn from_str(s: &str) -> Result<Self> {
        Pattern::new(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_pattern() {
        let pattern = Pattern::new("0592").unwrap();
        assert_eq!(pattern.len(), 4);
        assert_eq!(pattern.as_str(), "0592");
        assert_eq!(pattern.to_string(), "0592");
    }

    #[test]
    fn test_rejects_bad_patterns() {
        assert!(matches!(
            Pattern::new(""),
            Err(PiSearchError::InvalidPattern(_))
        ));
        assert!(matches!(
            Pattern::new("3.14"),
            Err(PiSearchError::InvalidPattern(_))
        ));
        assert!(matches!(
            "12a".parse::<Pattern>(),
            Err(PiSearchError::InvalidPattern(_))
        ));
        // Non-ASCII digits are not decimal digits for our purposes.
        assert!(Pattern::new("١٢").is_err());
    }

    #[test]
    fn test_prefix_value() {
        let pattern = Pattern::new("0592653").unwrap();
        assert_eq!(pattern.prefix_value(3), 59);
        assert_eq!(pattern.prefix_value(4), 592);
        assert_eq!(pattern.prefix_value(20), 592653);
    }
}
