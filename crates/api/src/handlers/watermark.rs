//! Handlers for watermark tasks.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use dyemark_core::error::CoreError;
use dyemark_core::types::DbId;
use dyemark_db::repositories::PolicyRepo;
use serde::Deserialize;

use crate::engine::poller;
use crate::engine::submission::{self, RecordLinks, TaskSpec};
use crate::error::{AppError, AppResult};
use crate::response::{PollResponse, SubmitResponse};
use crate::state::AppState;

/// Body of `POST /api/v1/watermark/tasks`.
///
/// Every field is optional at the JSON level so a missing field is reported
/// as a validation error rather than a deserialization failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitWatermarkTask {
    pub file_url: Option<String>,
    pub content: Option<String>,
    pub biz_id: Option<String>,
    pub policy_id: Option<DbId>,
    pub file_size: Option<i64>,
}

/// Body of `POST /api/v1/watermark/extract`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitExtractTask {
    pub file_url: Option<String>,
    pub biz_id: Option<String>,
    pub file_size: Option<i64>,
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /api/v1/watermark/tasks
///
/// Validate, optionally attach a policy, submit an `add` task, and record
/// it. Returns the processor's raw response with the assigned `taskId`.
pub async fn submit_task(
    State(state): State<AppState>,
    payload: Result<Json<SubmitWatermarkTask>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;

    let mut spec = TaskSpec::embed(
        input.file_url.as_deref(),
        input.content.as_deref(),
        input.biz_id.as_deref(),
    )?;

    if let Some(policy_id) = input.policy_id {
        let policy = PolicyRepo::find_by_id(&state.pool, policy_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Policy",
                id: policy_id,
            }))?;
        spec = spec.with_policy(&policy);
    }

    let links = RecordLinks {
        policy_id: input.policy_id,
        file_size: input.file_size,
        ..Default::default()
    };
    dispatch(&state, spec, links).await
}

/// POST /api/v1/watermark/extract
///
/// Submit an `extract` task for a file and record it.
pub async fn submit_extract(
    State(state): State<AppState>,
    payload: Result<Json<SubmitExtractTask>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;

    let spec = TaskSpec::extract(input.file_url.as_deref(), input.biz_id.as_deref())?;
    let links = RecordLinks {
        file_size: input.file_size,
        ..Default::default()
    };
    dispatch(&state, spec, links).await
}

async fn dispatch(
    state: &AppState,
    spec: TaskSpec,
    links: RecordLinks,
) -> AppResult<Json<SubmitResponse>> {
    let handle = submission::submit(state.processor.as_ref(), &spec).await?;
    let record_id = submission::record_submission(&state.pool, &spec, &handle, links).await?;

    Ok(Json(SubmitResponse {
        success: true,
        data: handle.raw,
        task_id: handle.task_id,
        biz_id: handle.biz_id,
        record_id,
    }))
}

// ---------------------------------------------------------------------------
// Poll
// ---------------------------------------------------------------------------

/// GET /api/v1/watermark/tasks/{taskId}
///
/// Poll the processor and project the task's status. Records carrying the
/// task id are brought up to date on a best-effort basis.
pub async fn get_task_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let report = poller::poll(state.processor.as_ref(), &task_id).await?;
    poller::sync_record(&state.pool, &report).await;

    Ok(Json(PollResponse {
        success: true,
        report,
    }))
}
