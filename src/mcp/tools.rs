//! Tool implementations behind `tools/call`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::alert::{AlertPayload, AlertSink, AlertStatus};
use crate::mcp::catalog::SEND_ALERT;
use crate::mcp::protocol::RpcError;

/// Content item in a tool call response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
        }
    }
}

/// A callable tool.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name under which the tool is declared in the catalog.
    fn name(&self) -> &'static str;

    /// Runs the tool with raw, not yet decoded, arguments.
    async fn call(&self, arguments: Value) -> Result<ToolCallResult, RpcError>;
}

/// Arguments accepted by `send_alert`.
#[derive(Debug, Clone, Deserialize)]
pub struct SendAlertArgs {
    /// Alert title (required, non-empty).
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Deduplication key (required, non-empty).
    pub deduplication_key: String,
    /// Status; `firing` when absent.
    #[serde(default)]
    pub status: Option<AlertStatus>,
    /// Open key/value metadata.
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl SendAlertArgs {
    /// Decodes and checks raw arguments.
    ///
    /// # Errors
    ///
    /// Returns an invalid-params error if the arguments do not fit the schema.
    pub fn decode(arguments: Value) -> Result<Self, RpcError> {
        let args: Self = serde_json::from_value(arguments).map_err(|e| {
            RpcError::invalid_params(format!("Invalid arguments for {SEND_ALERT}: {e}"))
        })?;

        if args.title.trim().is_empty() {
            return Err(RpcError::invalid_params(format!(
                "Invalid arguments for {SEND_ALERT}: title must not be empty"
            )));
        }
        if args.deduplication_key.trim().is_empty() {
            return Err(RpcError::invalid_params(format!(
                "Invalid arguments for {SEND_ALERT}: deduplication_key must not be empty"
            )));
        }

        Ok(args)
    }

    /// Converts into the sink payload, applying the default status.
    #[must_use]
    pub fn into_payload(self) -> AlertPayload {
        AlertPayload {
            title: self.title,
            description: self.description,
            deduplication_key: self.deduplication_key,
            status: self.status.unwrap_or_default(),
            metadata: self.metadata,
        }
    }
}

/// Delivers alerts through an [`AlertSink`].
pub struct SendAlertTool {
    sink: Arc<dyn AlertSink>,
}

impl SendAlertTool {
    /// Creates the tool around a sink.
    #[must_use]
    pub fn new(sink: Arc<dyn AlertSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl Tool for SendAlertTool {
    fn name(&self) -> &'static str {
        SEND_ALERT
    }

    async fn call(&self, arguments: Value) -> Result<ToolCallResult, RpcError> {
        let payload = SendAlertArgs::decode(arguments)?.into_payload();

        if let Err(e) = self.sink.send(&payload).await {
            tracing::error!(
                error = %e,
                deduplication_key = %payload.deduplication_key,
                "Failed to send alert"
            );
            return Err(RpcError::internal_error(format!("Failed to send alert: {e}")));
        }

        tracing::info!(
            title = %payload.title,
            deduplication_key = %payload.deduplication_key,
            status = %payload.status,
            "Alert sent"
        );

        Ok(ToolCallResult::text(format!(
            "Alert sent successfully: {} (key: {}, status: {})",
            payload.title, payload.deduplication_key, payload.status
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::error::AlertError;
    use crate::mcp::protocol::ErrorCode;

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<AlertPayload>>,
    }

    #[async_trait]
    impl AlertSink for RecordingSink {
        async fn send(&self, payload: &AlertPayload) -> Result<(), AlertError> {
            self.sent.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    struct RejectingSink;

    #[async_trait]
    impl AlertSink for RejectingSink {
        async fn send(&self, _payload: &AlertPayload) -> Result<(), AlertError> {
            Err(AlertError::UnexpectedStatus { status: 401 })
        }
    }

    #[test]
    fn tool_call_result_text() {
        let result = ToolCallResult::text("Hello, world!");
        assert_eq!(result.content.len(), 1);

        match &result.content[0] {
            ToolContent::Text { text } => assert_eq!(text, "Hello, world!"),
        }
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"content": [{"type": "text", "text": "Hello, world!"}]})
        );
    }

    #[test]
    fn decode_applies_default_status() {
        let args = SendAlertArgs::decode(json!({"title": "t", "deduplication_key": "k"})).unwrap();
        assert_eq!(args.into_payload().status, AlertStatus::Firing);
    }

    #[test]
    fn decode_rejects_blank_title() {
        let err = SendAlertArgs::decode(json!({"title": "  ", "deduplication_key": "k"}))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams.code());
        assert!(err.message.contains("title"));
    }

    #[test]
    fn decode_rejects_unknown_status() {
        let err = SendAlertArgs::decode(
            json!({"title": "t", "deduplication_key": "k", "status": "acknowledged"}),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams.code());
        assert!(err.message.contains("acknowledged"));
    }

    #[test]
    fn decode_rejects_non_object_metadata() {
        let err = SendAlertArgs::decode(
            json!({"title": "t", "deduplication_key": "k", "metadata": [1, 2]}),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams.code());
    }

    #[tokio::test]
    async fn send_alert_forwards_payload() {
        let sink = Arc::new(RecordingSink::default());
        let tool = SendAlertTool::new(sink.clone());

        let result = tool
            .call(json!({
                "title": "Disk full",
                "description": "/var at 100%",
                "deduplication_key": "disk-var",
                "status": "resolved",
                "metadata": {"host": "db-01", "pct": 100}
            }))
            .await
            .unwrap();

        let sent = sink.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].status, AlertStatus::Resolved);
        assert_eq!(sent[0].description.as_deref(), Some("/var at 100%"));
        assert_eq!(sent[0].metadata.as_ref().unwrap()["host"], "db-01");
        assert_eq!(
            result,
            ToolCallResult::text(
                "Alert sent successfully: Disk full (key: disk-var, status: resolved)"
            )
        );
    }

    #[tokio::test]
    async fn sink_failure_is_internal_error() {
        let tool = SendAlertTool::new(Arc::new(RejectingSink));

        let err = tool
            .call(json!({"title": "t", "deduplication_key": "k"}))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InternalError.code());
        assert_eq!(err.message, "Failed to send alert: unexpected status code: 401");
    }
}
