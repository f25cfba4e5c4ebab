//! MCP server implementation for incident.io alerting.
//!
//! This module implements the MCP server lifecycle:
//!
//! 1. **Initialisation**: Capability negotiation and version agreement
//! 2. **Operation**: Handling tool calls and other requests
//! 3. **Shutdown**: End of input, or SIGINT/SIGTERM when run as a process
//!
//! Requests are handled strictly one at a time: a line is read, dispatched
//! and answered before the next line is read.

use std::future::Future;
use std::io;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::alert::AlertSink;
use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::protocol::parse_message;
use crate::mcp::session::{Session, SessionState};
use crate::mcp::transport::{LineTransport, StdioTransport};

/// The MCP server for incident.io alerting.
pub struct McpServer<R, W> {
    /// The transport layer.
    transport: LineTransport<R, W>,
    /// Method routing and tools.
    dispatcher: Dispatcher,
    /// Handshake state for the single client.
    session: Session,
}

impl McpServer<tokio::io::Stdin, tokio::io::Stdout> {
    /// Creates a server on stdin/stdout that delivers alerts through `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error if the builtin tool catalog is inconsistent.
    pub fn stdio(sink: Arc<dyn AlertSink>) -> Result<Self, String> {
        Ok(Self::new(StdioTransport::stdio(), Dispatcher::new(sink)?))
    }
}

impl<R, W> McpServer<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a server from a transport and dispatcher.
    pub fn new(transport: LineTransport<R, W>, dispatcher: Dispatcher) -> Self {
        Self {
            transport,
            dispatcher,
            session: Session::new(),
        }
    }

    /// Returns the current session state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Consumes the server, returning the transport.
    pub fn into_transport(self) -> LineTransport<R, W> {
        self.transport
    }

    /// Serves requests until the input reaches EOF.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn serve(&mut self) -> io::Result<()> {
        tracing::debug!(
            tools = self.dispatcher.catalog().descriptors().len(),
            "Serving requests"
        );
        while self.step().await? {}
        tracing::info!("Input closed, shutting down");
        Ok(())
    }

    /// Serves requests until EOF or until `shutdown` completes.
    ///
    /// `shutdown` is only observed while waiting for input, so a request that
    /// is being handled is answered before the server stops.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn serve_until<F>(&mut self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let line = tokio::select! {
                biased;

                () = &mut shutdown => {
                    tracing::info!("Shutdown requested, stopping");
                    return Ok(());
                }

                line = self.transport.read_line() => line?,
            };

            let Some(line) = line else {
                tracing::info!("Input closed, shutting down");
                return Ok(());
            };
            self.handle_line(&line).await?;
        }
    }

    /// Reads and handles one line.
    ///
    /// Returns `false` once the input is exhausted.
    async fn step(&mut self) -> io::Result<bool> {
        let Some(line) = self.transport.read_line().await? else {
            return Ok(false);
        };

        self.handle_line(&line).await?;
        Ok(true)
    }

    /// Handles a single line of input.
    async fn handle_line(&mut self, line: &str) -> io::Result<()> {
        if line.trim().is_empty() {
            return Ok(());
        }
        tracing::trace!(line, "Received");

        let request = match parse_message(line) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed message");
                return Ok(());
            }
        };

        tracing::debug!(method = %request.method, notification = request.is_notification(), "Handling request");

        if let Some(response) = self.dispatcher.dispatch(&mut self.session, request).await {
            self.transport.write_response(&response).await?;
        }
        Ok(())
    }
}

impl McpServer<tokio::io::Stdin, tokio::io::Stdout> {
    /// Runs the MCP server main loop with graceful shutdown handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> io::Result<()> {
        self.run_with_shutdown().await
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(io::Error::other)?;

        self.serve_until(async move {
            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                }

                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                }
            }
        })
        .await
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> io::Result<()> {
        self.serve_until(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received Ctrl+C, initiating graceful shutdown");
            }
        })
        .await
    }
}
