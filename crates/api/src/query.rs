//! Shared query parameter types for API handlers.

use dyemark_core::pagination::PageRequest;
use dyemark_db::models::record::RecordFilter;
use serde::Deserialize;

/// Query parameters for `GET /api/v1/records`
/// (`?page=&pageSize=&keyword=&operation=&status=`).
///
/// Page values are clamped by [`PageRequest::new`]; blank filters are
/// ignored by [`RecordFilter`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub keyword: Option<String>,
    pub operation: Option<String>,
    pub status: Option<String>,
}

impl RecordListQuery {
    pub fn into_parts(self) -> (RecordFilter, PageRequest) {
        let page = PageRequest::new(self.page, self.page_size);
        let filter = RecordFilter {
            keyword: self.keyword,
            operation: self.operation,
            status: self.status,
        };
        (filter, page)
    }
}
