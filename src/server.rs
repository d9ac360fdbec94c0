//! Process lifecycle
//!
//! One bootstrap constructs the shared core (client, query engine, tool
//! dispatcher) and attaches the transport shells the configured mode asks
//! for. Configuration failures and the startup connectivity probe are the
//! only errors that terminate the process.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::config::{Config, ServerMode};
use crate::grafana::GrafanaClient;
use crate::tools::ToolDispatcher;
use crate::transport::{AppState, create_router, run_stdio};
use crate::{Error, Result};

/// The gateway server
pub struct Server {
    config: Config,
    dispatcher: Arc<ToolDispatcher>,
}

impl Server {
    /// Build the shared core and verify Grafana connectivity
    pub async fn new(config: Config) -> Result<Self> {
        let client = Arc::new(GrafanaClient::new(
            &config.grafana_url,
            &config.grafana_api_key,
        )?);

        client.test_connection().await?;
        info!(url = %config.grafana_url, "Connected to Grafana");

        Ok(Self {
            dispatcher: Arc::new(ToolDispatcher::new(client)),
            config,
        })
    }

    /// Run the configured transports until shutdown
    pub async fn run(self) -> Result<()> {
        match self.config.server_mode {
            ServerMode::Mcp => {
                tokio::select! {
                    result = run_stdio(Arc::clone(&self.dispatcher)) => result,
                    () = shutdown_signal() => Ok(()),
                }
            }
            ServerMode::Http => self.run_http().await,
            ServerMode::Both => {
                // The HTTP listener governs process lifetime; stdio may end
                // early (EOF or IO failure) without taking the gateway down,
                // but a failure must still reach the log.
                let stdio_dispatcher = Arc::clone(&self.dispatcher);
                let stdio = tokio::spawn(async move {
                    if let Err(e) = run_stdio(stdio_dispatcher).await {
                        error!(error = %e, "Stdio transport failed");
                    }
                });
                let result = self.run_http().await;
                stdio.abort();
                result
            }
        }
    }

    async fn run_http(&self) -> Result<()> {
        let addr = SocketAddr::new(
            self.config
                .host
                .parse()
                .map_err(|e| Error::Config(format!("Invalid host: {e}")))?,
            self.config.port,
        );

        let state = Arc::new(AppState {
            dispatcher: Arc::clone(&self.dispatcher),
        });
        let app = create_router(state);
        let listener = TcpListener::bind(addr).await?;

        info!(host = %self.config.host, port = self.config.port, "HTTP transport listening");
        info!("  GET  /health - liveness");
        info!("  GET  /docs - API documentation");
        info!("  POST /mcp - MCP JSON-RPC");
        info!("  POST /api/prometheus/query - execute Prometheus queries");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

/// Resolve on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
