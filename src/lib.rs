//! Grafana MCP Gateway
//!
//! Exposes Grafana dashboards, datasources and Prometheus-backed metrics to
//! MCP clients (stdio JSON-RPC) and plain HTTP callers through one shared
//! tool surface.
//!
//! The core is the query pipeline in [`prometheus`]: instant/range
//! classification, lazy datasource resolution through Grafana's proxy, time
//! parameter normalization, and human-readable result summaries.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod error;
pub mod grafana;
pub mod prometheus;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
///
/// Diagnostics always go to stderr: stdout belongs to the stdio MCP
/// transport and must stay a clean protocol channel.
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => {
            subscriber
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            subscriber
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
