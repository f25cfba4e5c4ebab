//! Session lifecycle for a single MCP client.
//!
//! ```text
//!  Uninitialized ──initialize──▶ Initialized
//!                                 │  ▲
//!                                 └──┘ initialize (re-runs negotiation)
//! ```
//!
//! Only `initialize` changes state. Other methods are served the same way
//! before and after the handshake.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mcp::protocol::{MCP_PROTOCOL_VERSION, SERVER_NAME};

/// Handshake progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for `initialize`.
    #[default]
    Uninitialized,
    /// `initialize` has been answered.
    Initialized,
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Client name.
    #[serde(default)]
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
///
/// Every member is optional; older clients send an empty object or nothing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    #[serde(default)]
    pub protocol_version: Option<String>,
    /// Client capabilities.
    #[serde(default)]
    pub capabilities: Value,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    pub tools: ToolCapabilities,
}

/// Tool-specific capabilities.
///
/// The catalog is fixed for the process lifetime, so `listChanged` is never set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolCapabilities {}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Result of the initialize request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Protocol version the server speaks.
    pub protocol_version: &'static str,
    /// Declared capabilities.
    pub capabilities: ServerCapabilities,
    /// Server identity.
    pub server_info: ServerInfo,
}

/// Per-connection session state.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    client: Option<ClientInfo>,
    acknowledged: bool,
}

impl Session {
    /// Creates a session awaiting the handshake.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the client that performed the most recent handshake.
    #[must_use]
    pub const fn client(&self) -> Option<&ClientInfo> {
        self.client.as_ref()
    }

    /// Returns `true` once the client has confirmed it finished its setup.
    #[must_use]
    pub const fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    /// Performs the handshake and returns the negotiation result.
    ///
    /// The server always answers with [`MCP_PROTOCOL_VERSION`]; a client that
    /// asked for something else decides for itself whether to continue.
    pub fn handshake(&mut self, params: InitializeParams) -> InitializeResult {
        if self.state == SessionState::Initialized {
            tracing::debug!("Repeated initialize, re-running negotiation");
        }

        let client = params.client_info.unwrap_or_default();
        tracing::info!(
            client = %client.name,
            client_version = client.version.as_deref().unwrap_or("unknown"),
            requested_version = params.protocol_version.as_deref().unwrap_or("unspecified"),
            "Client initialising"
        );
        if let Some(requested) = params.protocol_version.as_deref() {
            if requested != MCP_PROTOCOL_VERSION {
                tracing::warn!(
                    requested,
                    supported = MCP_PROTOCOL_VERSION,
                    "Client requested a different protocol version"
                );
            }
        }

        self.client = Some(client);
        self.state = SessionState::Initialized;

        InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION,
            capabilities: ServerCapabilities {
                tools: ToolCapabilities::default(),
            },
            server_info: ServerInfo::default(),
        }
    }

    /// Records the client's post-handshake acknowledgment.
    pub fn acknowledge(&mut self) {
        if self.state == SessionState::Uninitialized {
            tracing::warn!("Received initialized notification before initialize");
        } else {
            tracing::info!("Client initialised");
        }
        self.acknowledged = true;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn starts_uninitialized() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(session.client().is_none());
        assert!(!session.is_acknowledged());
    }

    #[test]
    fn handshake_transitions_and_reports_identity() {
        let mut session = Session::new();
        let params: InitializeParams = serde_json::from_value(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "test-client", "version": "1.0.0"}
        }))
        .unwrap();

        let result = session.handshake(params);

        assert_eq!(session.state(), SessionState::Initialized);
        assert_eq!(session.client().unwrap().name, "test-client");

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(value["serverInfo"]["name"], SERVER_NAME);
        assert_eq!(value["serverInfo"]["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(value["capabilities"], json!({"tools": {}}));
    }

    #[test]
    fn repeated_handshake_stays_initialized() {
        let mut session = Session::new();
        session.handshake(InitializeParams::default());
        session.handshake(InitializeParams::default());
        assert_eq!(session.state(), SessionState::Initialized);
    }

    #[test]
    fn acknowledge_is_tolerated_before_handshake() {
        let mut session = Session::new();
        session.acknowledge();
        assert!(session.is_acknowledged());
        assert_eq!(session.state(), SessionState::Uninitialized);
    }
}
