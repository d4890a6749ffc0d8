//! Handlers for the `/policies` resource.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use dyemark_core::error::CoreError;
use dyemark_core::policy::{
    validate_rendering, DEFAULT_EMBED_DEPTH, DEFAULT_FONT_SIZE, DEFAULT_OPACITY,
};
use dyemark_core::types::DbId;
use dyemark_db::models::policy::{CreatePolicy, PolicyListQuery};
use dyemark_db::repositories::PolicyRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::{CreatedResponse, DataResponse, ListResponse};
use crate::state::AppState;

/// GET /api/v1/policies
///
/// All policies, optionally filtered by `?active=true|false`.
pub async fn list_policies(
    State(state): State<AppState>,
    params: Result<Query<PolicyListQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = params?;
    let policies = PolicyRepo::list(&state.pool, &params).await?;
    Ok(Json(ListResponse::ok(policies)))
}

/// POST /api/v1/policies
///
/// Create a policy. `name` and `watermarkText` are required; rendering
/// parameters are range-checked after defaults are applied.
pub async fn create_policy(
    State(state): State<AppState>,
    payload: Result<Json<CreatePolicy>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;

    input.validate().map_err(CoreError::from)?;
    validate_rendering(
        input.opacity.unwrap_or(DEFAULT_OPACITY),
        input.font_size.unwrap_or(DEFAULT_FONT_SIZE),
        input.embed_depth.unwrap_or(DEFAULT_EMBED_DEPTH),
    )?;

    let policy = PolicyRepo::create(&state.pool, &input).await?;
    tracing::info!(policy_id = policy.id, name = %policy.name, "Policy created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new(policy, "Policy created")),
    ))
}

/// GET /api/v1/policies/{id}
pub async fn get_policy(
    State(state): State<AppState>,
    id: Result<Path<DbId>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = id?;
    let policy = PolicyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Policy",
            id,
        }))?;
    Ok(Json(DataResponse::ok(policy)))
}
