//! Shared response envelope types for API handlers.
//!
//! Every successful response carries `"success": true` next to its payload.
//! Use these types instead of ad-hoc `serde_json::json!` bodies so the
//! envelope stays consistent across handlers.

use dyemark_core::pagination::Pagination;
use dyemark_core::types::DbId;
use serde::Serialize;
use serde_json::Value;

use crate::engine::poller::TaskStatusReport;

/// Standard `{ "success": true, "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse::ok(record)))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// A full, unpaginated listing with its length.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub total: usize,
}

impl<T: Serialize> ListResponse<T> {
    pub fn ok(data: Vec<T>) -> Self {
        Self {
            success: true,
            total: data.len(),
            data,
        }
    }
}

/// One page of a listing plus its pagination block.
#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// A newly created entity with a confirmation message.
#[derive(Debug, Serialize)]
pub struct CreatedResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> CreatedResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }
}

/// Body returned after a task is accepted by the processor.
///
/// `data` is the processor's raw response, kept for diagnostics.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub data: Value,
    pub task_id: String,
    pub biz_id: String,
    pub record_id: DbId,
}

/// Flat body for a task status poll.
#[derive(Debug, Serialize)]
pub struct PollResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: TaskStatusReport,
}
