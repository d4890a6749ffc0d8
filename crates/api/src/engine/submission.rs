//! Task submission to the external processor.
//!
//! Input is validated into a [`TaskSpec`] before anything else happens, so
//! a rejected request never reaches the processor or the database. A
//! processor failure is surfaced as-is; there is no automatic retry here.

use dyemark_core::correlation::biz_id_or_generate;
use dyemark_core::error::CoreError;
use dyemark_core::policy::Policy;
use dyemark_core::record::{RecordOperation, RecordStatus};
use dyemark_core::traffic::TrafficRule;
use dyemark_core::types::DbId;
use dyemark_db::models::record::CreateRecord;
use dyemark_db::repositories::{ContentRepo, RecordRepo};
use dyemark_db::DbPool;
use dyemark_processor::api::ExternalProcessor;
use serde_json::{json, Value};

use crate::error::AppResult;

/// A validated job, ready to hand to the processor.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSpec {
    pub operation: RecordOperation,
    pub biz_id: String,
    pub file_url: Option<String>,
    /// Watermark text for `add` jobs, persisted as a content row.
    pub content: Option<String>,
    /// Operation-specific parameters sent to the processor.
    pub payload: Value,
}

impl TaskSpec {
    /// Embed `content` into the file at `file_url`.
    pub fn embed(
        file_url: Option<&str>,
        content: Option<&str>,
        biz_id: Option<&str>,
    ) -> Result<Self, CoreError> {
        let file_url = require("fileUrl", file_url)?;
        let content = require("content", content)?;
        let operation = RecordOperation::Add;

        Ok(Self {
            operation,
            biz_id: biz_id_or_generate(biz_id, operation.as_str()),
            payload: json!({ "file_url": file_url, "content": content }),
            file_url: Some(file_url.to_string()),
            content: Some(content.to_string()),
        })
    }

    /// Extract a watermark from the file at `file_url`.
    pub fn extract(file_url: Option<&str>, biz_id: Option<&str>) -> Result<Self, CoreError> {
        let file_url = require("fileUrl", file_url)?;
        let operation = RecordOperation::Extract;

        Ok(Self {
            operation,
            biz_id: biz_id_or_generate(biz_id, operation.as_str()),
            payload: json!({ "file_url": file_url }),
            file_url: Some(file_url.to_string()),
            content: None,
        })
    }

    /// Run a traffic-dye rule against its target.
    pub fn dye(rule: &TrafficRule, biz_id: Option<&str>) -> Result<Self, CoreError> {
        let target = require("target", rule.target.as_deref())?;
        let operation = RecordOperation::Dye;

        Ok(Self {
            operation,
            biz_id: biz_id_or_generate(biz_id, operation.as_str()),
            payload: json!({
                "rule_id": rule.id,
                "rule_name": rule.name,
                "target": target,
                "app_type": rule.app_type,
                "protocol": rule.protocol,
                "priority": rule.priority,
            }),
            file_url: None,
            content: None,
        })
    }

    /// Attach a policy's rendering parameters to the payload.
    pub fn with_policy(mut self, policy: &Policy) -> Self {
        if let Value::Object(map) = &mut self.payload {
            map.insert(
                "policy".into(),
                json!({
                    "id": policy.id,
                    "opacity": policy.opacity,
                    "font_size": policy.font_size,
                    "embed_depth": policy.embed_depth,
                    "color": policy.color,
                    "position": policy.position,
                    "file_types": policy.file_types,
                    "sensitivity": policy.sensitivity,
                }),
            );
        }
        self
    }
}

/// Handle for a task the processor accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskHandle {
    pub task_id: String,
    pub biz_id: String,
    /// The processor's full response body.
    pub raw: Value,
}

/// Send a validated job to the processor.
pub async fn submit(processor: &dyn ExternalProcessor, spec: &TaskSpec) -> AppResult<TaskHandle> {
    let outcome = processor
        .submit(spec.operation, &spec.biz_id, &spec.payload)
        .await?;

    tracing::info!(
        task_id = %outcome.task_id,
        biz_id = %spec.biz_id,
        operation = %spec.operation,
        "Task submitted",
    );

    Ok(TaskHandle {
        task_id: outcome.task_id,
        biz_id: spec.biz_id.clone(),
        raw: outcome.raw,
    })
}

/// Optional references stored on the record of a submitted task.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordLinks {
    pub policy_id: Option<DbId>,
    pub traffic_rule_id: Option<DbId>,
    pub file_size: Option<i64>,
}

/// Persist the record for a task the processor accepted.
///
/// The record starts in `processing`. Watermark text, when present, is
/// stored as a content row and linked. If this fails the task still runs
/// at the processor, so the failure is logged with its task id.
pub async fn record_submission(
    pool: &DbPool,
    spec: &TaskSpec,
    handle: &TaskHandle,
    links: RecordLinks,
) -> AppResult<DbId> {
    let stored = store_record(pool, spec, handle, links).await;

    match stored {
        Ok(record_id) => {
            tracing::info!(record_id, task_id = %handle.task_id, "Submission recorded");
            Ok(record_id)
        }
        Err(e) => {
            tracing::error!(
                task_id = %handle.task_id,
                biz_id = %handle.biz_id,
                error = %e,
                "Task accepted by processor but its record could not be stored",
            );
            Err(e.into())
        }
    }
}

async fn store_record(
    pool: &DbPool,
    spec: &TaskSpec,
    handle: &TaskHandle,
    links: RecordLinks,
) -> Result<DbId, sqlx::Error> {
    let content_id = match spec.content.as_deref() {
        Some(text) => Some(ContentRepo::create(pool, text).await?.id),
        None => None,
    };

    let input = CreateRecord {
        task_id: Some(handle.task_id.clone()),
        biz_id: Some(handle.biz_id.clone()),
        operation: spec.operation,
        status: RecordStatus::Processing,
        file_url: spec.file_url.clone(),
        file_size: links.file_size,
        content_id,
        policy_id: links.policy_id,
        traffic_rule_id: links.traffic_rule_id,
        metadata: None,
    };
    RecordRepo::create(pool, &input).await
}

/// Validate and submit a watermark embed job in one step.
///
/// Blank `file_url` or `content` fails with a validation error before the
/// processor is contacted. A missing `biz_id` becomes `add_<epoch-ms>`.
pub async fn submit_watermark(
    processor: &dyn ExternalProcessor,
    file_url: &str,
    content: &str,
    biz_id: Option<&str>,
) -> AppResult<TaskHandle> {
    let spec = TaskSpec::embed(Some(file_url), Some(content), biz_id)?;
    submit(processor, &spec).await
}

fn require<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, CoreError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoreError::Validation(format!("{field} is required")))
}
