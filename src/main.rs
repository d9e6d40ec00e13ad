//! MSSQL tool adapter entry point.
//!
//! Serves MCP over stdio. Stdout carries the protocol, so every log line goes
//! to stderr.

use anyhow::Result;
use mssql_tool_adapter::shutdown::{install_signal_handlers, new_shutdown_controller};
use mssql_tool_adapter::{Config, MssqlAdapterServer};
use rmcp::ServiceExt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging to stderr (stdout is reserved for JSON-RPC)
    init_logging();

    info!(
        "MSSQL tool adapter v{} starting (transport: stdio)",
        env!("CARGO_PKG_VERSION")
    );

    // Missing or invalid settings end the process before any connection
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };
    info!(
        "Database configuration: {}",
        config.database.redacted_connection_string()
    );

    let shutdown_controller = new_shutdown_controller();
    install_signal_handlers(shutdown_controller.clone());

    let server = MssqlAdapterServer::new(config);

    let service = server.clone().serve(rmcp::transport::stdio()).await?;
    info!("Ready to accept requests");

    let mut shutdown_signal = shutdown_controller.signal();

    let signalled = tokio::select! {
        quit_reason = service.waiting() => {
            match quit_reason {
                Ok(reason) => info!("Service stopped: {:?}", reason),
                Err(e) => error!("Service error: {}", e),
            }
            false
        }
        _ = shutdown_signal.recv() => {
            info!("Shutdown signal received");
            true
        }
    };

    shutdown_controller.graceful_shutdown(&server).await;

    if signalled {
        // The stdin reader may still be blocked; don't wait for it
        std::process::exit(0);
    }

    Ok(())
}

/// Initialize tracing subscriber with stderr output.
///
/// Logs MUST go to stderr because stdout is used for JSON-RPC communication.
fn init_logging() {
    let filter = std::env::var("RUST_LOG")
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("warn,mssql_tool_adapter=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
