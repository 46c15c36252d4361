//! Pagination types
//!
//! Caller input, the normalized window, and the configured bounds.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Number;

use crate::error::{Result, StatGateError};

/// Raw caller pagination input.
///
/// Values are kept as JSON numbers so that non-integral input (`2.5`) reaches
/// the normalizer and is rejected there with a pagination error rather than a
/// generic deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct PaginationRequest {
    /// Page number (1-based). Mutually exclusive with `offset`.
    pub page: Option<Number>,
    /// Zero-based record offset. Mutually exclusive with `page`.
    pub offset: Option<Number>,
    /// Records per page.
    pub limit: Option<Number>,
}

impl PaginationRequest {
    /// Build a request from integer values.
    pub fn from_ints(page: Option<i64>, offset: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.map(Number::from),
            offset: offset.map(Number::from),
            limit: limit.map(Number::from),
        }
    }
}

/// A caller's pagination intent after normalization.
///
/// `offset == (page - 1) * limit` whenever the window was built from a page.
/// A window built from an offset keeps the caller's offset and rounds `page`
/// down to the page containing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalWindow {
    pub page: u64,
    pub offset: u64,
    pub limit: u64,
}

impl CanonicalWindow {
    /// One past the last global index in the window.
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.limit)
    }
}

/// Upstream chunk size and caller page-size bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Fixed number of rows the upstream returns per fetch.
    pub chunk_size: u64,
    /// Page size used when the caller gives no `limit`.
    pub default_limit: u64,
    /// Largest `limit` a caller may request.
    pub max_limit: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            chunk_size: 10_000,
            default_limit: 20,
            max_limit: 100,
        }
    }
}

impl PageLimits {
    /// Check internal consistency.
    ///
    /// `max_limit <= chunk_size` keeps any window within at most two chunks.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(StatGateError::Config("chunk size must be at least 1".to_string()));
        }
        if self.max_limit == 0 {
            return Err(StatGateError::Config("max limit must be at least 1".to_string()));
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(StatGateError::Config(format!(
                "default limit {} must be between 1 and max limit {}",
                self.default_limit, self.max_limit
            )));
        }
        if self.max_limit > self.chunk_size {
            return Err(StatGateError::Config(format!(
                "max limit {} exceeds upstream chunk size {}",
                self.max_limit, self.chunk_size
            )));
        }
        Ok(())
    }
}
