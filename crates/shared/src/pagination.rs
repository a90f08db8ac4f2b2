//! Offset pagination utilities.

use serde::{Deserialize, Serialize};

/// Page size used when the request does not specify one.
pub const DEFAULT_PER_PAGE: i64 = 25;

/// Upper bound for any page size.
pub const MAX_PER_PAGE: i64 = 100;

/// A normalized page request.
///
/// `page` is 1-indexed and never below 1. `per_page` is always within
/// `1..=max_per_page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Clamps raw paging values into a valid request.
    pub fn new(page: i64, per_page: i64, max_per_page: i64) -> Self {
        let max_per_page = max_per_page.max(1);
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, max_per_page),
        }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Number of rows to fetch.
    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE, MAX_PER_PAGE)
    }
}

/// Number of pages needed to show `total` rows.
pub fn total_pages(total: i64, per_page: i64) -> i64 {
    if total <= 0 || per_page <= 0 {
        return 0;
    }
    (total + per_page - 1) / per_page
}
