//! incidentio-alert-mcp: MCP server for raising incident.io alerts
//!
//! Reads JSON-RPC requests from stdin, writes responses to stdout and logs to
//! stderr. The webhook URL and token come from `INCIDENTIO_WEBHOOK_URL` and
//! `INCIDENTIO_API_TOKEN`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use incidentio_alert_mcp::alert::HttpAlertSink;
use incidentio_alert_mcp::config;
use incidentio_alert_mcp::mcp::server::McpServer;

/// MCP server for raising incident.io alerts.
///
/// Exposes a `send_alert` tool that posts alerts to an incident.io HTTP
/// alert source. Requires INCIDENTIO_WEBHOOK_URL and INCIDENTIO_API_TOKEN.
#[derive(Parser, Debug)]
#[command(name = "incidentio-alert-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to settings file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries protocol messages only.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the incidentio-alert-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration before anything can be served
    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            eprintln!(
                "\nSet {} and {} before starting the server.",
                config::WEBHOOK_URL_VAR,
                config::API_TOKEN_VAR
            );
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    // Display GPL license notice (required by GPLv3 Section 5d)
    eprintln!(
        "incidentio-alert-mcp {}  Copyright (C) 2026  The Embedded Society",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
    eprintln!();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting incidentio-alert-mcp server"
    );

    info!(
        host = cfg.webhook_url.host_str().unwrap_or(""),
        timeout_secs = cfg.sink.timeout_secs,
        "Alert webhook configured"
    );

    let sink = match HttpAlertSink::new(&cfg) {
        Ok(sink) => Arc::new(sink),
        Err(e) => {
            error!(error = %e, "Failed to create alert sink");
            return ExitCode::FAILURE;
        }
    };

    // Create MCP server
    let mut server = match McpServer::stdio(sink) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "Invalid tool catalog");
            return ExitCode::FAILURE;
        }
    };

    info!("MCP server ready, waiting for client connection...");

    // Run the server
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime");

    let result = runtime.block_on(server.run());

    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
