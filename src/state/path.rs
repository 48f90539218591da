//! Validated paths into the state tree.
//!
//! Subscriptions name the sub-value they watch with a dot-delimited path.
//! Paths are checked at subscription time: segments must be non-empty and
//! the first segment must name a real top-level section, so a typo fails
//! fast instead of silently watching nothing.

use crate::error::{Result, StoreError};
use crate::state::StateTree;
use std::fmt;

/// A validated dot-delimited path into the state tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StatePath {
    raw: String,
}

impl StatePath {
    /// Parse and validate a path like `"ui.theme"` or `"locations"`.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(StoreError::InvalidPath("empty path".into()));
        }
        let mut segments = raw.split('.');
        let head = segments.next().unwrap_or("");
        if !StateTree::SECTIONS.contains(&head) {
            return Err(StoreError::InvalidPath(format!(
                "unknown top-level section '{}' in '{}'",
                head, raw
            )));
        }
        if segments.any(|s| s.is_empty()) {
            return Err(StoreError::InvalidPath(format!(
                "empty segment in '{}'",
                raw
            )));
        }
        Ok(Self { raw: raw.to_string() })
    }

    /// Iterate the path's segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.raw.split('.')
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
