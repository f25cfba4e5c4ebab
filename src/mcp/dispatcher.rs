//! Method routing.
//!
//! The [`Dispatcher`] owns a table from JSON-RPC method name to handler. Every
//! handler receives the raw `params` and the session, and returns either a
//! result value or an [`RpcError`]. Turning that outcome into a [`Response`],
//! or into nothing for notifications, happens in one place: [`Dispatcher::dispatch`].

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::alert::AlertSink;
use crate::mcp::catalog::ToolCatalog;
use crate::mcp::protocol::{Request, Response, RpcError};
use crate::mcp::session::{InitializeParams, Session};
use crate::mcp::tools::{SendAlertTool, Tool};

/// Outcome of a single handler.
pub type HandlerResult = Result<Value, RpcError>;

/// Boxed future returned by a route.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'a>>;

/// A method handler.
pub type Route = for<'a> fn(&'a Dispatcher, &'a mut Session, Value) -> HandlerFuture<'a>;

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Routes requests to handlers and tools.
pub struct Dispatcher {
    routes: HashMap<&'static str, Route>,
    catalog: ToolCatalog,
    tools: HashMap<&'static str, Arc<dyn Tool>>,
    tools_list: Value,
}

impl Dispatcher {
    /// Builds the dispatcher with the builtin catalog and alert tool.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog is inconsistent or a tool has no
    /// matching catalog entry.
    pub fn new(sink: Arc<dyn AlertSink>) -> Result<Self, String> {
        let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(SendAlertTool::new(sink))];
        Self::with_tools(ToolCatalog::builtin(), tools)
    }

    /// Builds a dispatcher from an explicit catalog and tool set.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::new`].
    pub fn with_tools(catalog: ToolCatalog, tools: Vec<Arc<dyn Tool>>) -> Result<Self, String> {
        catalog.validate()?;

        let mut by_name = HashMap::new();
        for tool in tools {
            if !catalog.contains(tool.name()) {
                return Err(format!("tool '{}' is not declared in the catalog", tool.name()));
            }
            by_name.insert(tool.name(), tool);
        }

        let tools_list = json!({ "tools": catalog.descriptors() });

        let mut routes: HashMap<&'static str, Route> = HashMap::new();
        routes.insert("initialize", Self::initialize);
        routes.insert("notifications/initialized", Self::initialized);
        routes.insert("initialized", Self::initialized);
        routes.insert("ping", Self::ping);
        routes.insert("tools/list", Self::tools_list);
        routes.insert("tools/call", Self::tools_call);

        Ok(Self {
            routes,
            catalog,
            tools: by_name,
            tools_list,
        })
    }

    /// Returns the tool catalog.
    #[must_use]
    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Dispatches one request.
    ///
    /// Returns `None` for notifications, whatever the handler's outcome.
    pub async fn dispatch(&self, session: &mut Session, request: Request) -> Option<Response> {
        let Request {
            method, params, id, ..
        } = request;

        let outcome = match self.routes.get(method.as_str()) {
            Some(route) => route(self, session, params).await,
            None => Err(RpcError::method_not_found(&method)),
        };

        match id {
            Some(id) => {
                if let Err(e) = &outcome {
                    tracing::debug!(id = %id, method = %method, error = %e, "Request failed");
                }
                Some(Response::from_outcome(id, outcome))
            }
            None => {
                if let Err(e) = outcome {
                    tracing::warn!(method = %method, error = %e, "Notification failed");
                }
                None
            }
        }
    }

    fn initialize<'a>(_: &'a Self, session: &'a mut Session, params: Value) -> HandlerFuture<'a> {
        Box::pin(async move { Self::handle_initialize(session, params) })
    }

    fn initialized<'a>(_: &'a Self, session: &'a mut Session, _: Value) -> HandlerFuture<'a> {
        Box::pin(async move { Self::handle_initialized(session) })
    }

    fn ping<'a>(_: &'a Self, _: &'a mut Session, _: Value) -> HandlerFuture<'a> {
        Box::pin(async { Self::handle_ping() })
    }

    fn tools_list<'a>(this: &'a Self, _: &'a mut Session, _: Value) -> HandlerFuture<'a> {
        Box::pin(async move { this.handle_tools_list() })
    }

    fn tools_call<'a>(this: &'a Self, _: &'a mut Session, params: Value) -> HandlerFuture<'a> {
        Box::pin(this.handle_tools_call(params))
    }

    /// Handles the initialize request.
    fn handle_initialize(session: &mut Session, params: Value) -> HandlerResult {
        let params: InitializeParams = if params.is_null() {
            InitializeParams::default()
        } else {
            serde_json::from_value(params)
                .map_err(|e| RpcError::parse_error(format!("Invalid initialize params: {e}")))?
        };

        let result = session.handshake(params);
        to_value(&result)
    }

    /// Handles the post-handshake acknowledgment.
    fn handle_initialized(session: &mut Session) -> HandlerResult {
        session.acknowledge();
        Ok(json!({}))
    }

    /// Handles the ping request.
    fn handle_ping() -> HandlerResult {
        Ok(json!({}))
    }

    /// Handles the tools/list request.
    fn handle_tools_list(&self) -> HandlerResult {
        Ok(self.tools_list.clone())
    }

    /// Handles the tools/call request.
    async fn handle_tools_call(&self, params: Value) -> HandlerResult {
        if params.is_null() {
            return Err(RpcError::invalid_params("Missing tool call params"));
        }
        let params: ToolCallParams = decode(params, "Invalid tool call params")?;

        let tool = self
            .tools
            .get(params.name.as_str())
            .ok_or_else(|| RpcError::unknown_tool(&params.name))?;

        tracing::debug!(tool = %params.name, "Calling tool");
        let result = tool.call(params.arguments).await?;
        to_value(&result)
    }
}

fn decode<T: DeserializeOwned>(params: Value, context: &str) -> Result<T, RpcError> {
    serde_json::from_value(params).map_err(|e| RpcError::invalid_params(format!("{context}: {e}")))
}

fn to_value<T: serde::Serialize>(result: &T) -> HandlerResult {
    serde_json::to_value(result).map_err(|e| {
        tracing::error!(error = %e, "Failed to serialise result");
        RpcError::internal_error("Internal error: failed to serialise result")
    })
}
