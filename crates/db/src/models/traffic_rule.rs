//! Traffic-dye rule row model and DTOs.

use dyemark_core::normalize::parse_json_field;
use dyemark_core::traffic::{
    AppType, Protocol, ReportData, RuleStatus, TraceInfo, TrafficRule, DEFAULT_PRIORITY,
};
use dyemark_core::types::{DbId, Timestamp};
use serde::Deserialize;
use sqlx::FromRow;
use validator::Validate;

/// A row from the `traffic_rules` table, read permissively.
#[derive(Debug, Clone, FromRow)]
pub struct TrafficRuleRow {
    pub id: Option<DbId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub target: Option<String>,
    pub app_type: Option<String>,
    pub protocol: Option<String>,
    pub status: Option<String>,
    pub priority: Option<i32>,
    pub dye_result: Option<String>,
    pub trace_info: Option<String>,
    pub report_data: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TrafficRuleRow {
    /// Normalize into a [`TrafficRule`]. Returns `None` without an id or name.
    pub fn into_rule(self) -> Option<TrafficRule> {
        let id = self.id?;
        let name = self.name.filter(|n| !n.trim().is_empty())?;

        Some(TrafficRule {
            id,
            name,
            description: self.description,
            target: self.target,
            app_type: AppType::normalize(self.app_type.as_deref()),
            protocol: Protocol::normalize(self.protocol.as_deref()),
            status: RuleStatus::normalize(self.status.as_deref()),
            priority: self.priority.unwrap_or(DEFAULT_PRIORITY),
            dye_result: self.dye_result,
            trace_info: parse_json_field::<TraceInfo>(self.trace_info.as_deref(), "traceInfo"),
            report_data: parse_json_field::<ReportData>(self.report_data.as_deref(), "reportData"),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DTO for creating a rule via `POST /api/v1/traffic-rules`.
///
/// Enum fields accept any string and are normalized before insert.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrafficRule {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub target: Option<String>,
    #[serde(default)]
    pub app_type: AppType,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub status: RuleStatus,
    pub priority: Option<i32>,
}

/// Query parameters for `GET /api/v1/traffic-rules`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficRuleListQuery {
    pub status: Option<String>,
    pub app_type: Option<String>,
}
