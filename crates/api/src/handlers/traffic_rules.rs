//! Handlers for the `/traffic-rules` resource.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use dyemark_core::error::CoreError;
use dyemark_core::traffic::{RuleStatus, TrafficRule};
use dyemark_core::types::DbId;
use dyemark_db::models::traffic_rule::{CreateTrafficRule, TrafficRuleListQuery};
use dyemark_db::repositories::TrafficRuleRepo;
use serde::Serialize;
use validator::Validate;

use crate::engine::submission::{self, RecordLinks, TaskSpec};
use crate::error::{AppError, AppResult};
use crate::response::{CreatedResponse, DataResponse, ListResponse};
use crate::state::AppState;

/// Result of executing a rule.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleExecution {
    pub rule: TrafficRule,
    pub task_id: String,
    pub biz_id: String,
    pub record_id: DbId,
}

/// GET /api/v1/traffic-rules
///
/// Rules ordered by priority, optionally filtered by `status` and `appType`.
pub async fn list_rules(
    State(state): State<AppState>,
    params: Result<Query<TrafficRuleListQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = params?;
    let rules = TrafficRuleRepo::list(&state.pool, &params).await?;
    Ok(Json(ListResponse::ok(rules)))
}

/// POST /api/v1/traffic-rules
///
/// Enum fields are normalized, so unknown values fall back to their
/// defaults instead of being rejected.
pub async fn create_rule(
    State(state): State<AppState>,
    payload: Result<Json<CreateTrafficRule>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;
    input.validate().map_err(CoreError::from)?;

    let rule = TrafficRuleRepo::create(&state.pool, &input)
        .await?
        .ok_or_else(|| CoreError::Internal("created traffic rule could not be read back".into()))?;
    tracing::info!(rule_id = rule.id, name = %rule.name, "Traffic rule created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new(rule, "Traffic rule created")),
    ))
}

/// GET /api/v1/traffic-rules/{id}
pub async fn get_rule(
    State(state): State<AppState>,
    id: Result<Path<DbId>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = id?;
    let rule = find_rule(&state, id).await?;
    Ok(Json(DataResponse::ok(rule)))
}

/// POST /api/v1/traffic-rules/{id}/execute
///
/// Submit a `dye` task for an active rule, mark the rule `processing`, and
/// record the submission. Rules that are inactive or already processing
/// are rejected with 409.
pub async fn execute_rule(
    State(state): State<AppState>,
    id: Result<Path<DbId>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = id?;
    let rule = find_rule(&state, id).await?;

    if rule.status != RuleStatus::Active {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Traffic rule is {} and cannot be executed",
            rule.status
        ))));
    }

    let spec = TaskSpec::dye(&rule, None)?;
    let handle = submission::submit(state.processor.as_ref(), &spec).await?;

    let rule = TrafficRuleRepo::mark_dispatched(&state.pool, id, &handle.task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TrafficRule",
            id,
        }))?;

    let links = RecordLinks {
        traffic_rule_id: Some(id),
        ..Default::default()
    };
    let record_id = submission::record_submission(&state.pool, &spec, &handle, links).await?;

    Ok(Json(DataResponse::ok(RuleExecution {
        rule,
        task_id: handle.task_id,
        biz_id: handle.biz_id,
        record_id,
    })))
}

async fn find_rule(state: &AppState, id: DbId) -> AppResult<TrafficRule> {
    TrafficRuleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TrafficRule",
            id,
        }))
}
