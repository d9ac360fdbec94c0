//! Command-line interface

use clap::Parser;

use crate::config::ServerMode;

/// Grafana MCP Gateway - dashboards, datasources and Prometheus metrics
/// over stdio MCP and HTTP
#[derive(Parser, Debug)]
#[command(name = "grafana-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Host to bind the HTTP transport to
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port for the HTTP transport
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Transport mode
    #[arg(long, value_enum, env = "SERVER_MODE")]
    pub mode: Option<ServerMode>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "GRAFANA_GATEWAY_LOG_LEVEL")]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "GRAFANA_GATEWAY_LOG_FORMAT")]
    pub log_format: Option<String>,
}
