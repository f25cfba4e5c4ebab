//! incidentio-alert-mcp: MCP server for raising incident.io alerts
//!
//! This library exposes a single `send_alert` tool to an AI assistant over the
//! Model Context Protocol. Alerts are posted to an incident.io HTTP alert
//! source; the assistant decides when to fire and when to resolve them.
//!
//! # Modules
//!
//! - [`alert`] — Alert payloads and delivery
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Error types
//! - [`mcp`] — MCP protocol implementation

pub mod alert;
pub mod config;
pub mod error;
pub mod mcp;
