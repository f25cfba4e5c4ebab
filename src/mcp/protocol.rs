//! JSON-RPC 2.0 message types for MCP protocol.
//!
//! This module defines the core message types used in the Model Context Protocol.
//! All messages follow the JSON-RPC 2.0 specification with MCP-specific extensions.
//!
//! # Message Types
//!
//! - **Call**: a [`Request`] with an `id`, answered by exactly one [`Response`]
//! - **Notification**: a [`Request`] whose `id` is absent or `null`, never answered
//!
//! Request IDs are echoed back exactly as received. Numeric IDs keep their
//! original textual form, so `7`, `-1`, `1.50` and integers wider than 64 bits
//! round-trip unchanged.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;
use thiserror::Error;

/// The MCP protocol version this implementation supports.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name for capability negotiation.
pub const SERVER_NAME: &str = "incidentio-alert-mcp";

/// The only accepted value of the `jsonrpc` member.
pub const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC 2.0 request ID.
///
/// Numeric IDs are kept as the raw JSON text they arrived as, so precision
/// and formatting (`1.50`, integers wider than 64 bits) survive the echo.
#[derive(Debug, Clone)]
pub enum RequestId {
    /// Numeric request ID, as written by the client.
    Number(Box<RawValue>),
    /// String request ID.
    String(String),
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        let text = n.to_string();
        match RawValue::from_string(text.clone()) {
            Ok(raw) => Self::Number(raw),
            // An integer's decimal form is always valid JSON.
            Err(_) => Self::String(text),
        }
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl PartialEq for RequestId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.get() == b.get(),
            (Self::String(a), Self::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for RequestId {}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(raw) => raw.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        match raw.get().as_bytes().first() {
            Some(b'"') => serde_json::from_str(raw.get())
                .map(Self::String)
                .map_err(de::Error::custom),
            Some(b'-' | b'0'..=b'9') => Ok(Self::Number(raw)),
            _ => Err(de::Error::custom(
                "request id must be a string or a number",
            )),
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(raw) => write!(f, "{}", raw.get()),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

/// An incoming JSON-RPC 2.0 message.
///
/// Calls and notifications share this shape; only the `id` tells them apart.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    /// Must be "2.0".
    pub jsonrpc: String,

    /// The method to invoke. Case-sensitive.
    pub method: String,

    /// Method parameters; `Value::Null` when omitted.
    #[serde(default)]
    pub params: Value,

    /// Request identifier; `None` for notifications.
    #[serde(default)]
    pub id: Option<RequestId>,
}

impl Request {
    /// Creates a call (a request that expects a response).
    #[must_use]
    pub fn call(id: impl Into<RequestId>, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id: Some(id.into()),
        }
    }

    /// Creates a notification (no response expected).
    #[must_use]
    pub fn notification(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id: None,
        }
    }

    /// Returns `true` if no response may be sent for this request.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Standard JSON-RPC 2.0 error codes used by this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Parameters could not be decoded at all.
    ParseError,
    /// The method (or tool) does not exist.
    MethodNotFound,
    /// Parameters decoded but do not fit the method or tool.
    InvalidParams,
    /// A known method or tool failed while executing.
    InternalError,
}

impl ErrorCode {
    /// Returns the numeric code for this error.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    /// The error code.
    pub code: i32,

    /// A short description of the error.
    pub message: String,
}

impl RpcError {
    /// Creates a new error with a custom message.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
        }
    }

    /// Parameters that are not decodable at all.
    #[must_use]
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, message)
    }

    /// An unknown top-level method.
    #[must_use]
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            ErrorCode::MethodNotFound,
            format!("Method not found: {method}"),
        )
    }

    /// A `tools/call` naming a tool that is not in the catalog.
    #[must_use]
    pub fn unknown_tool(name: &str) -> Self {
        Self::new(ErrorCode::MethodNotFound, format!("Unknown tool: {name}"))
    }

    /// Parameters or arguments of the wrong shape.
    #[must_use]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, message)
    }

    /// Failure while executing a known method or tool.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

/// A JSON-RPC 2.0 response carrying either a result or an error.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    /// Always "2.0".
    pub jsonrpc: &'static str,

    /// The request ID this response corresponds to.
    pub id: RequestId,

    /// The result of the method call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// The failure, if the call did not succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    /// Creates a new success response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Value is not const-compatible
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Creates a new error response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // RpcError contains String
    pub fn failure(id: RequestId, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Builds the response for `id` from a handler outcome.
    #[must_use]
    pub fn from_outcome(id: RequestId, outcome: Result<Value, RpcError>) -> Self {
        match outcome {
            Ok(result) => Self::success(id, result),
            Err(error) => Self::failure(id, error),
        }
    }
}

/// Raw input that is not a usable JSON-RPC request.
///
/// No ID can be trusted from such input, so it is logged and never answered.
#[derive(Debug, Error)]
pub enum MessageError {
    /// Not JSON, not an object, or missing required members.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The `jsonrpc` member is not "2.0".
    #[error("unsupported jsonrpc version: {0:?}")]
    UnsupportedVersion(String),
}

/// Parses a JSON string into a request.
///
/// # Errors
///
/// Returns a [`MessageError`] if the JSON is malformed or not a JSON-RPC 2.0 request.
pub fn parse_message(json: &str) -> Result<Request, MessageError> {
    let request: Request = serde_json::from_str(json)?;

    if request.jsonrpc != JSONRPC_VERSION {
        return Err(MessageError::UnsupportedVersion(request.jsonrpc));
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_valid_request() {
        let json = r#"{"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}"#;
        let req = parse_message(json).unwrap();

        assert_eq!(req.id, Some(RequestId::from(1_i64)));
        assert_eq!(req.method, "initialize");
        assert_eq!(req.params, json!({}));
    }

    #[test]
    fn parse_valid_notification() {
        let json = r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#;
        let req = parse_message(json).unwrap();

        assert!(req.is_notification());
        assert_eq!(req.method, "notifications/initialized");
        assert_eq!(req.params, Value::Null);
    }

    #[test]
    fn null_id_is_a_notification() {
        let json = r#"{"jsonrpc": "2.0", "id": null, "method": "tools/list"}"#;
        let req = parse_message(json).unwrap();
        assert!(req.is_notification());
    }

    #[test]
    fn parse_string_id() {
        let json = r#"{"jsonrpc": "2.0", "id": "abc-123", "method": "test"}"#;
        let req = parse_message(json).unwrap();
        assert_eq!(req.id, Some(RequestId::from("abc-123")));
    }

    #[test]
    fn numeric_ids_round_trip_verbatim() {
        for raw in [
            "2.5",
            "1.50",
            "-7",
            "1e3",
            "18446744073709551615",
            "123456789012345678901234567890",
        ] {
            let json = format!(r#"{{"jsonrpc": "2.0", "id": {raw}, "method": "ping"}}"#);
            let req = parse_message(&json).unwrap();
            let response = Response::success(req.id.unwrap(), json!({}));
            let out = serde_json::to_string(&response).unwrap();
            assert!(out.contains(&format!(r#""id":{raw}"#)), "{out}");
        }
    }

    #[test]
    fn parse_boolean_id_is_malformed() {
        let json = r#"{"jsonrpc": "2.0", "id": true, "method": "ping"}"#;
        assert!(matches!(
            parse_message(json).unwrap_err(),
            MessageError::Malformed(_)
        ));
    }

    #[test]
    fn escaped_string_id_is_decoded() {
        let json = r#"{"jsonrpc": "2.0", "id": "a\"b", "method": "ping"}"#;
        let req = parse_message(json).unwrap();
        assert_eq!(req.id, Some(RequestId::from("a\"b")));
    }

    #[test]
    fn parse_invalid_json() {
        let err = parse_message("not valid json").unwrap_err();
        assert!(matches!(err, MessageError::Malformed(_)));
    }

    #[test]
    fn parse_batch_is_malformed() {
        let json = r#"[{"jsonrpc": "2.0", "id": 1, "method": "ping"}]"#;
        assert!(matches!(
            parse_message(json).unwrap_err(),
            MessageError::Malformed(_)
        ));
    }

    #[test]
    fn parse_object_id_is_malformed() {
        let json = r#"{"jsonrpc": "2.0", "id": {"n": 1}, "method": "ping"}"#;
        assert!(parse_message(json).is_err());
    }

    #[test]
    fn parse_missing_jsonrpc() {
        let json = r#"{"id": 1, "method": "test"}"#;
        assert!(matches!(
            parse_message(json).unwrap_err(),
            MessageError::Malformed(_)
        ));
    }

    #[test]
    fn parse_wrong_jsonrpc_version() {
        let json = r#"{"jsonrpc": "1.0", "id": 1, "method": "test"}"#;
        let err = parse_message(json).unwrap_err();
        assert!(matches!(err, MessageError::UnsupportedVersion(v) if v == "1.0"));
    }

    #[test]
    fn serialise_success_response() {
        let response = Response::success(RequestId::from(1_i64), json!({"ok": true}));
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"jsonrpc":"2.0","id":1,"result":{"ok":true}}"#);
    }

    #[test]
    fn serialise_error_response() {
        let response = Response::failure(
            RequestId::from("req-9"),
            RpcError::method_not_found("unknown/method"),
        );
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""jsonrpc":"2.0""#));
        assert!(json.contains(r#""id":"req-9""#));
        assert!(json.contains(r#""code":-32601"#));
        assert!(json.contains("unknown/method"));
        assert!(!json.contains("result"));
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(ErrorCode::ParseError.code(), -32700);
        assert_eq!(ErrorCode::InvalidParams.code(), -32602);
        assert_eq!(ErrorCode::MethodNotFound.code(), -32601);
        assert_eq!(ErrorCode::InternalError.code(), -32603);
    }

    #[test]
    fn request_id_display() {
        assert_eq!(RequestId::from(42_i64).to_string(), "42");
        assert_eq!(RequestId::from(-42_i64), RequestId::from(-42_i64));
        assert_ne!(RequestId::from(42_i64), RequestId::from("42"));
        assert_eq!(RequestId::from("abc").to_string(), "abc");
    }
}
