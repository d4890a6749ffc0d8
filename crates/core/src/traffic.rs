//! Traffic-dye rules: enum fields, trace and report payloads.

use serde::{Deserialize, Serialize};

use crate::normalize::define_normalized_enum;
use crate::types::{DbId, Timestamp};

/// Priority assigned when a rule has none.
pub const DEFAULT_PRIORITY: i32 = 50;

define_normalized_enum! {
    /// Kind of application whose traffic is dyed.
    AppType default Web {
        Web => "web",
        App => "app",
        Api => "api",
    }
}

define_normalized_enum! {
    /// Transport protocol matched by a rule.
    Protocol default Http {
        Http => "http",
        Https => "https",
        Tcp => "tcp",
        Udp => "udp",
    }
}

define_normalized_enum! {
    /// Rule activation status.
    RuleStatus default Active {
        Active => "active",
        Inactive => "inactive",
        Processing => "processing",
    }
}

define_normalized_enum! {
    /// Outcome of tracing dyed traffic through the network.
    TraceStatus default Processing {
        Success => "success",
        Failed => "failed",
        Processing => "processing",
    }
}

/// Path taken by dyed traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceInfo {
    #[serde(default)]
    pub path: Vec<String>,
    #[serde(default, alias = "current_node")]
    pub current_node: Option<String>,
    #[serde(default)]
    pub status: TraceStatus,
    #[serde(default)]
    pub latency: Option<f64>,
}

/// Aggregated statistics for one rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportData {
    #[serde(alias = "total_requests")]
    pub total_requests: u64,
    #[serde(alias = "dyed_requests")]
    pub dyed_requests: u64,
    #[serde(alias = "success_rate")]
    pub success_rate: f64,
    #[serde(alias = "avg_latency")]
    pub avg_latency: f64,
    #[serde(alias = "error_count")]
    pub error_count: u64,
    #[serde(alias = "peak_hours")]
    pub peak_hours: Vec<String>,
}

/// A normalized traffic-dye rule as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficRule {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub target: Option<String>,
    pub app_type: AppType,
    pub protocol: Protocol,
    pub status: RuleStatus,
    pub priority: i32,
    pub dye_result: Option<String>,
    pub trace_info: Option<TraceInfo>,
    pub report_data: Option<ReportData>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::parse_json_field;

    #[test]
    fn enum_defaults() {
        assert_eq!(AppType::normalize(Some("desktop")), AppType::Web);
        assert_eq!(Protocol::normalize(Some("quic")), Protocol::Http);
        assert_eq!(RuleStatus::normalize(Some("deleted")), RuleStatus::Active);
        assert_eq!(TraceStatus::normalize(None), TraceStatus::Processing);
    }

    #[test]
    fn declared_members_pass_through() {
        assert_eq!(AppType::normalize(Some("api")), AppType::Api);
        assert_eq!(Protocol::normalize(Some("udp")), Protocol::Udp);
        assert_eq!(RuleStatus::normalize(Some("inactive")), RuleStatus::Inactive);
    }

    #[test]
    fn trace_info_parses_and_normalizes_status() {
        let raw = r#"{"path":["edge","gw","svc"],"currentNode":"gw","status":"weird","latency":12.5}"#;
        let info: TraceInfo = parse_json_field(Some(raw), "traceInfo").unwrap();
        assert_eq!(info.path, vec!["edge", "gw", "svc"]);
        assert_eq!(info.current_node.as_deref(), Some("gw"));
        assert_eq!(info.status, TraceStatus::Processing);
        assert_eq!(info.latency, Some(12.5));
    }

    #[test]
    fn trace_info_accepts_snake_case_keys() {
        let raw = r#"{"current_node":"n1","status":"success"}"#;
        let info: TraceInfo = parse_json_field(Some(raw), "traceInfo").unwrap();
        assert_eq!(info.current_node.as_deref(), Some("n1"));
        assert_eq!(info.status, TraceStatus::Success);
        assert!(info.path.is_empty());
    }

    #[test]
    fn malformed_trace_info_is_none() {
        assert!(parse_json_field::<TraceInfo>(Some("not json"), "traceInfo").is_none());
        assert!(parse_json_field::<TraceInfo>(Some(r#"{"path":"a"}"#), "traceInfo").is_none());
    }

    #[test]
    fn report_data_fills_missing_fields() {
        let raw = r#"{"totalRequests":1000,"dyedRequests":250,"peakHours":["09:00","14:00"]}"#;
        let report: ReportData = parse_json_field(Some(raw), "reportData").unwrap();
        assert_eq!(report.total_requests, 1000);
        assert_eq!(report.dyed_requests, 250);
        assert_eq!(report.error_count, 0);
        assert_eq!(report.peak_hours.len(), 2);
    }
}
