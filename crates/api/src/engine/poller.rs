//! Task status polling.
//!
//! Each poll queries the processor once and projects its raw status through
//! [`TaskProjection`]. Progress depends only on the raw status and the ETA
//! only on progress. The poller keeps nothing between calls.

use dyemark_core::task::{TaskProjection, TaskState};
use dyemark_db::repositories::RecordRepo;
use dyemark_db::DbPool;
use dyemark_processor::api::{ExternalProcessor, ProcessorError};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Client-facing view of one poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusReport {
    pub task_id: String,
    pub status: TaskState,
    /// The status string exactly as the processor sent it.
    pub raw_status: Option<String>,
    pub progress: u8,
    pub estimated_time: String,
    pub result: Option<Value>,
    pub biz_id: Option<String>,
    pub task_type: Option<String>,
}

impl TaskStatusReport {
    /// The result as stored on a record: strings verbatim, other JSON
    /// values serialized.
    pub fn result_text(&self) -> Option<String> {
        match &self.result {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

/// Query the processor for `task_id` and project its status.
///
/// A blank id fails validation without contacting the processor. An
/// envelope that reports neither a success code nor a success flag is an
/// external service error carrying the processor's message.
pub async fn poll(processor: &dyn ExternalProcessor, task_id: &str) -> AppResult<TaskStatusReport> {
    let task_id = task_id.trim();
    if task_id.is_empty() {
        return Err(AppError::validation("taskId is required"));
    }

    let response = processor.query(task_id).await?;
    if !response.is_success() {
        return Err(ProcessorError::Rejected {
            code: response.code,
            message: response.message_or_default(),
        }
        .into());
    }

    let data = response.data.ok_or_else(|| {
        ProcessorError::MalformedResponse("query response has no data".to_string())
    })?;

    let raw_status = data.task_status.unwrap_or_default();
    let projection = TaskProjection::from_raw_status(&raw_status);

    if projection.state == TaskState::Unknown {
        tracing::warn!(task_id, raw_status = %raw_status, "Unrecognised processor task status");
    } else if projection.state.is_terminal() {
        tracing::debug!(task_id, state = %projection.state, "Task is terminal");
    }

    Ok(TaskStatusReport {
        task_id: data.task_id.unwrap_or_else(|| task_id.to_string()),
        status: projection.state,
        raw_status: Some(raw_status).filter(|s| !s.is_empty()),
        progress: projection.progress,
        estimated_time: projection.estimated_time,
        result: data.result.filter(|v| !v.is_null()),
        biz_id: data.biz_id,
        task_type: data.task_type,
    })
}

/// Copy a poll result onto the records that carry its task id.
///
/// Only records whose status may legally move to the polled state are
/// updated; terminal records and unknown states are left alone. Failures
/// are logged and swallowed so a poll never fails because of the store.
pub async fn sync_record(pool: &DbPool, report: &TaskStatusReport) {
    let Some(target) = report.status.record_status() else {
        return;
    };
    let from: Vec<_> = report
        .status
        .live_predecessors()
        .into_iter()
        .filter_map(TaskState::record_status)
        .collect();

    let result = report.result_text();
    match RecordRepo::sync_task_status(
        pool,
        &report.task_id,
        &from,
        target,
        report.progress,
        result.as_deref(),
    )
    .await
    {
        Ok(0) => {}
        Ok(updated) => tracing::debug!(
            task_id = %report.task_id,
            status = %target,
            updated,
            "Record status synced from poll",
        ),
        Err(e) => tracing::warn!(
            task_id = %report.task_id,
            error = %e,
            "Failed to sync record status from poll",
        ),
    }
}
