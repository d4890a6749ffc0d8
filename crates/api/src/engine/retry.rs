//! Retry of an existing record.
//!
//! A retry never mutates the original record. It inserts a new record that
//! copies the original's job parameters, carries a fresh `retry_<epoch-ms>`
//! task id, starts in `processing`, and links back through
//! `retry_of_record_id`.
//!
//! The processor never issued the new task id, so polling it does not
//! drive the attempt: the row stays `processing` until it is resubmitted
//! or updated out of band.

use chrono::Utc;
use dyemark_core::correlation::{generate_biz_id_after, is_generated, RETRY_PREFIX};
use dyemark_core::error::CoreError;
use dyemark_core::record::RecordStatus;
use dyemark_core::types::{DbId, Timestamp};
use dyemark_db::repositories::RecordRepo;
use dyemark_db::DbPool;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Message returned with every accepted retry.
pub const RETRY_MESSAGE: &str = "Retry submitted";

/// Result of a retry request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryOutcome {
    /// The record the retry was requested for.
    pub id: DbId,
    pub status: RecordStatus,
    pub message: String,
    pub new_task_id: String,
    /// The record created for the new attempt.
    pub new_record_id: DbId,
    pub retry_at: Timestamp,
}

/// Parse a record id from a path segment.
///
/// Blank ids and ids that are not positive integers fail validation.
pub fn parse_record_id(raw: &str) -> Result<DbId, CoreError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CoreError::Validation("recordId is required".into()));
    }
    raw.parse::<DbId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| CoreError::Validation(format!("recordId must be a positive integer, got {raw}")))
}

/// Create a retry attempt for the record identified by `record_id`.
///
/// The processor is not contacted and the returned `new_task_id` is not
/// known to it.
pub async fn retry(pool: &DbPool, record_id: &str) -> AppResult<RetryOutcome> {
    let id = parse_record_id(record_id)?;

    let original = RecordRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Record",
            id,
        }))?;

    if !original.status.is_terminal() {
        tracing::warn!(
            record_id = id,
            status = %original.status,
            "Retrying a record that has not reached a terminal status",
        );
    }

    let new_task_id = generate_biz_id_after(RETRY_PREFIX, original.task_id.as_deref());

    let new_record_id = RecordRepo::create_retry(pool, id, &new_task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Record",
            id,
        }))?;

    tracing::info!(
        record_id = id,
        new_record_id,
        new_task_id = %new_task_id,
        previous_status = %original.status,
        chained = original
            .task_id
            .as_deref()
            .is_some_and(|t| is_generated(t, RETRY_PREFIX)),
        "Record retry created",
    );

    Ok(RetryOutcome {
        id,
        status: RecordStatus::Processing,
        message: RETRY_MESSAGE.to_string(),
        new_task_id,
        new_record_id,
        retry_at: Utc::now(),
    })
}
