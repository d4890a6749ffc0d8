//! Job record row model and DTOs.

use dyemark_core::normalize::{
    clamp_progress, confidence_from_metadata, file_name_from_url, non_negative_size,
    parse_metadata,
};
use dyemark_core::record::{Record, RecordOperation, RecordStatus};
use dyemark_core::types::{DbId, Timestamp};
use serde::Deserialize;
use sqlx::FromRow;

/// A row from `job_records` joined with its content and policy.
///
/// Every column is read permissively; [`RecordRow::into_record`] turns it
/// into a canonical [`Record`].
#[derive(Debug, Clone, FromRow)]
pub struct RecordRow {
    pub id: Option<DbId>,
    pub task_id: Option<String>,
    pub biz_id: Option<String>,
    pub operation: Option<String>,
    pub status: Option<String>,
    pub file_url: Option<String>,
    pub file_size: Option<i64>,
    pub watermark_text: Option<String>,
    pub policy_id: Option<DbId>,
    pub policy_name: Option<String>,
    pub progress: Option<i32>,
    pub result: Option<String>,
    pub metadata: Option<String>,
    pub error: Option<String>,
    pub retry_of_record_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RecordRow {
    /// Normalize into a [`Record`]. Returns `None` when the row has no id.
    pub fn into_record(self) -> Option<Record> {
        let id = self.id?;
        let metadata = parse_metadata(self.metadata.as_deref());
        let confidence = confidence_from_metadata(&metadata);

        Some(Record {
            id,
            file_name: file_name_from_url(self.file_url.as_deref()),
            task_id: self.task_id,
            biz_id: self.biz_id,
            operation: RecordOperation::normalize(self.operation.as_deref()),
            status: RecordStatus::normalize(self.status.as_deref()),
            file_url: self.file_url,
            file_size: non_negative_size(self.file_size),
            watermark_text: self.watermark_text,
            policy_id: self.policy_id,
            policy_name: self.policy_name,
            progress: clamp_progress(self.progress),
            result_url: self.result,
            confidence,
            error: self.error,
            metadata,
            retry_of_record_id: self.retry_of_record_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.updated_at,
        })
    }
}

/// DTO for inserting a new record after a successful submission.
#[derive(Debug, Clone)]
pub struct CreateRecord {
    pub task_id: Option<String>,
    pub biz_id: Option<String>,
    pub operation: RecordOperation,
    pub status: RecordStatus,
    pub file_url: Option<String>,
    pub file_size: Option<i64>,
    pub content_id: Option<DbId>,
    pub policy_id: Option<DbId>,
    pub traffic_rule_id: Option<DbId>,
    pub metadata: Option<serde_json::Value>,
}

/// Filters for the record listing. Blank values are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordFilter {
    /// Case-insensitive substring of `task_id`, `file_url`, or `result`.
    pub keyword: Option<String>,
    /// Exact operation match.
    pub operation: Option<String>,
    /// Exact status match.
    pub status: Option<String>,
}

impl RecordFilter {
    pub fn keyword(&self) -> Option<&str> {
        non_blank(self.keyword.as_deref())
    }

    pub fn operation(&self) -> Option<&str> {
        non_blank(self.operation.as_deref())
    }

    pub fn status(&self) -> Option<&str> {
        non_blank(self.status.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Escape `%`, `_` and `\` so `keyword` matches literally inside `ILIKE`.
pub fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}
