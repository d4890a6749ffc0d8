//! Page-number pagination arithmetic.

use serde::Serialize;

/// Page size used when the caller does not give one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A validated page request. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Clamp raw query values: `page >= 1`, `1 <= page_size <= MAX_PAGE_SIZE`.
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip: `(page - 1) * page_size`.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Build the response block for a result set of `total` rows.
    pub fn paginate(&self, total: i64) -> Pagination {
        Pagination {
            page: self.page,
            page_size: self.page_size,
            total,
            total_pages: total_pages(total, self.page_size),
        }
    }
}

/// Pagination block returned alongside list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// `ceil(total / page_size)`; zero when there are no rows.
pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if total <= 0 || page_size <= 0 {
        return 0;
    }
    (total + page_size - 1) / page_size
}
