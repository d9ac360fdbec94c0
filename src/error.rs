//! Error types for the Grafana gateway

use thiserror::Error;

/// Result type alias for the gateway
pub type Result<T> = std::result::Result<T, Error>;

/// Gateway errors
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential rejected by Grafana
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Grafana unreachable
    #[error("Cannot connect to Grafana: {0}")]
    Connectivity(String),

    /// No Prometheus-type datasource configured
    #[error("No Prometheus datasource configured in Grafana")]
    NoBackendConfigured,

    /// Panel id does not exist on the dashboard
    #[error("Panel {panel_id} not found in dashboard {dashboard_uid}")]
    PanelNotFound {
        /// Requested panel id
        panel_id: i64,
        /// Dashboard the panel was looked up on
        dashboard_uid: String,
    },

    /// Tool name not in the registry
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Tool arguments failed schema validation
    #[error("Invalid arguments: {0}")]
    Validation(String),

    /// Backend-reported query failure
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convert to a JSON-RPC error code
    #[must_use]
    pub fn to_rpc_code(&self) -> i32 {
        match self {
            Self::Json(_) => -32700,
            Self::UnknownTool(_) => -32601,
            Self::Validation(_) => -32602,
            Self::Authentication(_)
            | Self::Connectivity(_)
            | Self::NoBackendConfigured
            | Self::PanelNotFound { .. }
            | Self::QueryFailed(_)
            | Self::Http(_) => -32000,
            _ => -32603,
        }
    }
}
