//! Alert payloads and the sink that delivers them.
//!
//! The MCP layer never talks HTTP directly. It hands a validated
//! [`AlertPayload`] to an [`AlertSink`] and maps any failure to a JSON-RPC
//! internal error. [`HttpAlertSink`] is the production sink; tests substitute
//! their own.

mod http;

pub use http::HttpAlertSink;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AlertError;

/// Lifecycle status of an alert as understood by incident.io.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// The condition is active.
    #[default]
    Firing,
    /// The condition has cleared.
    Resolved,
}

impl AlertStatus {
    /// All accepted wire values, in schema order.
    pub const VARIANTS: [&'static str; 2] = ["firing", "resolved"];

    /// Returns the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Firing => "firing",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The body posted to the alert webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertPayload {
    /// Short summary shown in incident.io.
    pub title: String,
    /// Longer free-form explanation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Key incident.io uses to collapse repeated alerts.
    pub deduplication_key: String,
    /// Firing or resolved.
    pub status: AlertStatus,
    /// Arbitrary caller-supplied attributes, in caller order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// Something that can deliver an alert.
///
/// Implementations make exactly one delivery attempt per call.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Delivers `payload`, returning the failure reason on error.
    async fn send(&self, payload: &AlertPayload) -> Result<(), AlertError>;
}
