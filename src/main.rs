//! Grafana MCP Gateway entry point

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use grafana_gateway::{cli::Cli, config::Config, server::Server, setup_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    // Load configuration and apply CLI overrides
    let config = match Config::load() {
        Ok(mut config) => {
            if let Some(ref host) = cli.host {
                config.host.clone_from(host);
            }
            if let Some(port) = cli.port {
                config.port = port;
            }
            if let Some(mode) = cli.mode {
                config.server_mode = mode;
            }
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = ?config.server_mode,
        grafana = %config.grafana_url,
        "Starting Grafana MCP Gateway"
    );

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Startup failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.run().await {
        error!("Server error: {e}");
        return ExitCode::FAILURE;
    }

    info!("Shutdown complete");
    ExitCode::SUCCESS
}
