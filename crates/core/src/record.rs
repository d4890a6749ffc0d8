//! Canonical job history record and its enum-constrained fields.

use serde::Serialize;

use crate::normalize::define_normalized_enum;
use crate::types::{DbId, Timestamp};

define_normalized_enum! {
    /// Kind of job a record describes. Also the task type sent to the
    /// external processor.
    RecordOperation default Add {
        /// Embed a watermark.
        Add => "add",
        /// Extract a watermark.
        Extract => "extract",
        /// Execute a traffic-dye rule.
        Dye => "dye",
    }
}

define_normalized_enum! {
    /// Persisted outcome of a job.
    RecordStatus default Pending {
        Pending => "pending",
        Processing => "processing",
        Success => "success",
        Failed => "failed",
    }
}

impl RecordStatus {
    /// Records in a terminal status are never rewritten by status sync.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

/// A normalized job history entry as returned to clients.
///
/// Every enum field holds a declared member and every derived field
/// (`file_name`, `confidence`, `metadata`) has already been computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: DbId,
    pub task_id: Option<String>,
    pub biz_id: Option<String>,
    pub operation: RecordOperation,
    pub status: RecordStatus,
    pub file_url: Option<String>,
    pub file_name: String,
    pub file_size: i64,
    pub watermark_text: Option<String>,
    pub policy_id: Option<DbId>,
    pub policy_name: Option<String>,
    pub progress: u8,
    pub result_url: Option<String>,
    pub confidence: Option<f64>,
    pub error: Option<String>,
    pub metadata: serde_json::Value,
    pub retry_of_record_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Timestamp,
}
