//! REST client for the external processor.
//!
//! [`ExternalProcessor`] is the seam the rest of the system depends on;
//! [`ProcessorApi`] implements it over HTTP using [`reqwest`]. Every request
//! carries a timeout so a stalled processor surfaces as
//! [`ProcessorError::Timeout`] instead of hanging the caller.

use std::time::Duration;

use async_trait::async_trait;
use dyemark_core::record::RecordOperation;
use serde_json::Value;

use crate::messages::{Envelope, QueryResponse, SubmitData, SubmitOutcome, SubmitRequest};

/// Path of the submit endpoint, relative to the base URL.
pub const SUBMIT_PATH: &str = "/task/submit";

/// Path of the status query endpoint, relative to the base URL.
pub const QUERY_PATH: &str = "/task/query";

/// Errors from the processor client layer.
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// No response arrived within the configured timeout.
    #[error("Processor did not respond within {secs}s")]
    Timeout {
        /// The timeout that elapsed.
        secs: u64,
    },

    /// The processor returned a non-2xx status code.
    #[error("Processor API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The processor answered but reported failure in its envelope.
    #[error("{message}")]
    Rejected {
        /// The processor's `code`, if any.
        code: Option<i64>,
        /// The processor's message, verbatim.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("Malformed processor response: {0}")]
    MalformedResponse(String),
}

/// Operations the system needs from the external processor.
#[async_trait]
pub trait ExternalProcessor: Send + Sync {
    /// Submit a job. Returns the processor-assigned task id and raw body.
    async fn submit(
        &self,
        operation: RecordOperation,
        biz_id: &str,
        payload: &Value,
    ) -> Result<SubmitOutcome, ProcessorError>;

    /// Fetch the current status envelope for a task.
    ///
    /// Unsuccessful envelopes are returned as-is; interpreting them is the
    /// caller's job.
    async fn query(&self, task_id: &str) -> Result<QueryResponse, ProcessorError>;
}

/// Connection settings for [`ProcessorApi`].
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Base HTTP URL, e.g. `http://processor:8600`.
    pub base_url: String,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// HTTP client for the external processor.
pub struct ProcessorApi {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl ProcessorApi {
    /// Create a client with its own connection pool.
    pub fn new(config: ProcessorConfig) -> Result<Self, ProcessorError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    ///
    /// The configured timeout is still applied per request.
    pub fn with_client(client: reqwest::Client, config: ProcessorConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            timeout: config.timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.timeout(self.timeout);
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Send a request and return its JSON body, mapping transport failures.
    async fn send_json(&self, request: reqwest::RequestBuilder) -> Result<Value, ProcessorError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ProcessorError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                self.classify(e)
            } else {
                ProcessorError::MalformedResponse(e.to_string())
            }
        })
    }

    fn classify(&self, err: reqwest::Error) -> ProcessorError {
        if err.is_timeout() {
            ProcessorError::Timeout {
                secs: self.timeout.as_secs(),
            }
        } else {
            ProcessorError::Request(err)
        }
    }
}

#[async_trait]
impl ExternalProcessor for ProcessorApi {
    async fn submit(
        &self,
        operation: RecordOperation,
        biz_id: &str,
        payload: &Value,
    ) -> Result<SubmitOutcome, ProcessorError> {
        let body = SubmitRequest {
            task_type: operation.as_str(),
            biz_id,
            params: payload,
        };

        let raw = self
            .send_json(self.client.post(self.url(SUBMIT_PATH)).json(&body))
            .await?;

        let outcome = parse_submit(raw)?;
        tracing::debug!(task_id = %outcome.task_id, biz_id, %operation, "Processor accepted task");
        Ok(outcome)
    }

    async fn query(&self, task_id: &str) -> Result<QueryResponse, ProcessorError> {
        let raw = self
            .send_json(
                self.client
                    .get(self.url(QUERY_PATH))
                    .query(&[("task_id", task_id)]),
            )
            .await?;

        serde_json::from_value(raw).map_err(|e| ProcessorError::MalformedResponse(e.to_string()))
    }
}

/// Interpret a submit response body.
///
/// The envelope must report success and carry a non-empty `data.task_id`.
pub fn parse_submit(raw: Value) -> Result<SubmitOutcome, ProcessorError> {
    let envelope: Envelope<SubmitData> = serde_json::from_value(raw.clone())
        .map_err(|e| ProcessorError::MalformedResponse(e.to_string()))?;

    if !envelope.is_success() {
        return Err(ProcessorError::Rejected {
            code: envelope.code,
            message: envelope.message_or_default(),
        });
    }

    let task_id = envelope
        .data
        .and_then(|d| d.task_id)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| {
            ProcessorError::MalformedResponse("submit response has no data.task_id".to_string())
        })?;

    Ok(SubmitOutcome { task_id, raw })
}
