//! Grafana API wire types
//!
//! Only the fields the gateway actually reads are modeled; everything else
//! Grafana returns is ignored on deserialization. The dashboard JSON itself
//! is kept opaque where the gateway just forwards it (snapshots).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A configured datasource, one row per backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Datasource {
    /// Numeric id, used for the proxy path
    pub id: i64,
    /// Stable uid
    #[serde(default)]
    pub uid: String,
    /// Display name
    pub name: String,
    /// Datasource type, e.g. "prometheus"
    #[serde(rename = "type")]
    pub ds_type: String,
    /// Whether this is the org default
    #[serde(rename = "isDefault", default)]
    pub is_default: bool,
    /// Backend URL as configured in Grafana
    #[serde(default)]
    pub url: String,
}

/// One row of a dashboard search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Numeric id
    pub id: i64,
    /// Stable uid
    pub uid: String,
    /// Dashboard title
    pub title: String,
    /// Web URL
    #[serde(default)]
    pub url: String,
    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Folder the dashboard lives in, if any
    #[serde(rename = "folderTitle", default, skip_serializing_if = "Option::is_none")]
    pub folder_title: Option<String>,
}

/// Full dashboard response from /api/dashboards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardDetails {
    /// Dashboard metadata (permissions, folder, versioning) - forwarded opaque
    #[serde(default)]
    pub meta: Value,
    /// The dashboard definition
    pub dashboard: Dashboard,
}

/// Dashboard definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    /// Numeric id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Stable uid
    #[serde(default)]
    pub uid: String,
    /// Title
    #[serde(default)]
    pub title: String,
    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Panels declared on the dashboard
    #[serde(default)]
    pub panels: Vec<Panel>,
    /// Everything else in the dashboard JSON, preserved for snapshot creation
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A dashboard panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Panel {
    /// Panel id, unique within the dashboard
    pub id: i64,
    /// Panel title
    #[serde(default)]
    pub title: String,
    /// Visualization type
    #[serde(rename = "type", default)]
    pub panel_type: String,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared query expressions
    #[serde(default)]
    pub targets: Vec<PanelTarget>,
    /// Remaining panel JSON, preserved for snapshot creation
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A panel query target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelTarget {
    /// Reference id ("A", "B", ...)
    #[serde(rename = "refId", default)]
    pub ref_id: String,
    /// PromQL expression (absent for non-Prometheus targets)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
    /// Remaining target JSON
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Snapshot descriptor returned by /api/snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot key
    pub key: String,
    /// Public URL
    pub url: String,
    /// Key to delete the snapshot
    #[serde(rename = "deleteKey")]
    pub delete_key: String,
    /// Delete URL
    #[serde(rename = "deleteUrl", default)]
    pub delete_url: String,
    /// Numeric id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}
