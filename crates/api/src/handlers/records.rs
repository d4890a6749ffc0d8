//! Handlers for the `/records` resource.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use dyemark_core::error::CoreError;
use dyemark_db::repositories::RecordRepo;

use crate::engine::retry;
use crate::error::{AppError, AppResult};
use crate::query::RecordListQuery;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// GET /api/v1/records
///
/// Filtered, newest-first page of normalized records. Supports `page`,
/// `pageSize`, `keyword`, `operation`, and `status`.
pub async fn list_records(
    State(state): State<AppState>,
    params: Result<Query<RecordListQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = params?;
    let (filter, page) = params.into_parts();

    let (records, total) = RecordRepo::list(&state.pool, &filter, &page).await?;

    Ok(Json(PageResponse {
        success: true,
        data: records,
        pagination: page.paginate(total),
    }))
}

/// GET /api/v1/records/{id}
pub async fn get_record(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = retry::parse_record_id(&raw_id)?;
    let record = RecordRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Record",
            id,
        }))?;

    Ok(Json(DataResponse::ok(record)))
}

/// POST /api/v1/records/{id}/retry
///
/// Create a new attempt linked to the record. The original is unchanged.
pub async fn retry_record(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let outcome = retry::retry(&state.pool, &raw_id).await?;
    Ok(Json(DataResponse::ok(outcome)))
}
