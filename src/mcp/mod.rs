//! Model Context Protocol (MCP) server implementation.
//!
//! This module implements the MCP specification for exposing incident.io
//! alerting as a tool to AI assistants. The server communicates over stdio
//! transport using JSON-RPC 2.0 messages.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          MCP Server                          │
//! │                                                              │
//! │  ┌───────────┐   ┌────────────┐   ┌─────────┐   ┌─────────┐  │
//! │  │ Transport │──▶│ Dispatcher │──▶│  Tools  │──▶│  Alert  │  │
//! │  │  (stdio)  │   │  (routes)  │   │         │   │  Sink   │  │
//! │  └───────────┘   └────────────┘   └─────────┘   └─────────┘  │
//! │        ▲               │  │                                  │
//! │        │               ▼  ▼                                  │
//! │        │        ┌─────────┐ ┌─────────┐                      │
//! │        └────────│ Session │ │ Catalog │                      │
//! │    responses    └─────────┘ └─────────┘                      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod catalog;
pub mod dispatcher;
pub mod protocol;
pub mod server;
pub mod session;
pub mod tools;
pub mod transport;

pub use catalog::{ToolCatalog, ToolDescriptor};
pub use dispatcher::Dispatcher;
pub use protocol::{ErrorCode, Request, RequestId, Response, RpcError, MCP_PROTOCOL_VERSION};
pub use server::McpServer;
pub use session::{Session, SessionState};
pub use transport::{LineTransport, StdioTransport};
