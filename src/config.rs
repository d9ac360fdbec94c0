//! Configuration management
//!
//! Environment-variable driven, matching the deployment surface:
//! `GRAFANA_URL`, `GRAFANA_API_KEY`, `HOST`, `PORT`, `SERVER_MODE`.
//! A `.env` file is loaded first when present.

use clap::ValueEnum;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Which transport shells to attach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    /// Stdio MCP transport only (default)
    Mcp,
    /// HTTP transport only
    Http,
    /// Both transports on one shared core
    Both,
}

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Grafana base URL
    pub grafana_url: String,
    /// Grafana API credential, sent as a bearer token
    pub grafana_api_key: String,
    /// Host to bind the HTTP transport to
    pub host: String,
    /// Port for the HTTP transport
    pub port: u16,
    /// Transport selection
    pub server_mode: ServerMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grafana_url: String::new(),
            grafana_api_key: String::new(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            server_mode: ServerMode::Mcp,
        }
    }
}

impl Config {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        // Not an error when absent; deployments may set real env vars.
        dotenvy::dotenv().ok();

        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::raw().only(&[
                "GRAFANA_URL",
                "GRAFANA_API_KEY",
                "HOST",
                "PORT",
                "SERVER_MODE",
            ]))
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Check required settings; fatal at startup when they are missing
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.grafana_url.is_empty() {
            missing.push("GRAFANA_URL");
        }
        if self.grafana_api_key.is_empty() {
            missing.push("GRAFANA_API_KEY");
        }
        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        Url::parse(&self.grafana_url)
            .map_err(|e| Error::Config(format!("Invalid GRAFANA_URL '{}': {e}", self.grafana_url)))?;

        Ok(())
    }
}
