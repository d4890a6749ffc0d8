//! Wire types for the external processor's JSON API.
//!
//! The processor wraps every response in the same envelope:
//!
//! ```json
//! { "code": 200, "success": true, "data": { ... }, "request_id": "...", "message": "ok" }
//! ```
//!
//! Field types are not reliable across processor versions (`code` and
//! `task_id` have both been seen as strings and numbers), so scalar fields
//! deserialize leniently.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// `code` values the processor uses to signal success.
pub const SUCCESS_CODES: &[i64] = &[0, 200];

/// Response envelope shared by all processor endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope<T> {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub code: Option<i64>,
    #[serde(default)]
    pub success: Option<bool>,
    pub data: Option<T>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub request_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// True when either the status code or the explicit flag says so.
    ///
    /// The processor has been observed setting only one of the two, so
    /// both are accepted.
    pub fn is_success(&self) -> bool {
        self.success == Some(true) || self.code.is_some_and(|c| SUCCESS_CODES.contains(&c))
    }

    /// The processor's message, or a placeholder naming the code.
    pub fn message_or_default(&self) -> String {
        match (&self.message, self.code) {
            (Some(m), _) if !m.trim().is_empty() => m.clone(),
            (_, Some(code)) => format!("processor returned code {code}"),
            _ => "processor returned an unsuccessful response".to_string(),
        }
    }
}

/// Body sent to the submit endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitRequest<'a> {
    pub task_type: &'a str,
    pub biz_id: &'a str,
    pub params: &'a Value,
}

/// `data` of a submit response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubmitData {
    #[serde(default, deserialize_with = "lenient_string")]
    pub task_id: Option<String>,
}

/// `data` of a status query response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TaskData {
    #[serde(default, deserialize_with = "lenient_string")]
    pub task_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub task_id: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub biz_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub task_type: Option<String>,
}

/// Full status query response.
pub type QueryResponse = Envelope<TaskData>;

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    /// Processor-assigned task identifier.
    pub task_id: String,
    /// The complete response body, kept for diagnostics.
    pub raw: Value,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
