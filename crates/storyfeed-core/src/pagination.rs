//! Pagination tracking.

use serde::{Deserialize, Serialize};

/// Default page size.
pub const DEFAULT_LIMIT: u32 = 10;

/// Offset/limit cursor plus the server-declared "more data" flag.
///
/// `has_more` starts out true so the first fetch is always attempted, and
/// afterwards changes only when the server says so.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    offset: u32,
    limit: u32,
    has_more: bool,
}

impl Pagination {
    /// Start at offset 0 with the given page size.
    pub fn new(limit: u32) -> Self {
        Self {
            offset: 0,
            limit,
            has_more: true,
        }
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Move to the next page. Only the caller-facing load-more path calls this.
    pub fn advance(&mut self) {
        self.offset = self.offset.saturating_add(self.limit);
    }

    /// Record a server-declared `has_more`.
    pub fn set_has_more(&mut self, has_more: bool) {
        self.has_more = has_more;
    }

    /// Record the page a session was started for.
    pub fn begin(&mut self, offset: u32, limit: u32) {
        self.offset = offset;
        self.limit = limit;
    }

    /// Forget everything the server declared and go back to the first page.
    pub fn reset(&mut self, limit: u32) {
        *self = Self::new(limit);
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}
