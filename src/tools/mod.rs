//! Tool registry and dispatch
//!
//! One static name→handler table shared by both transport shells. `invoke`
//! validates arguments against the declared schema, routes to the query
//! pipeline or a passthrough Grafana call, and converts every outcome into
//! a uniform success/error result. Nothing escapes this boundary as a panic.

mod validate;

pub use validate::validate_arguments;

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::grafana::{DashboardRef, GrafanaClient};
use crate::prometheus::{QueryEngine, QueryRequest, format};
use crate::protocol::{Tool, ToolsCallResult};
use crate::{Error, Result};

/// Default number of dashboards returned by `list_dashboards`
const DEFAULT_SEARCH_LIMIT: u64 = 10;
/// Default snapshot lifetime in seconds
const DEFAULT_SNAPSHOT_EXPIRES: u64 = 3600;
/// Default panel-data time range
const DEFAULT_PANEL_FROM: &str = "now-1h";
const DEFAULT_PANEL_TO: &str = "now";

/// The tool dispatcher: descriptor table plus routing
pub struct ToolDispatcher {
    engine: Arc<QueryEngine>,
    tools: Vec<Tool>,
}

impl ToolDispatcher {
    /// Build the dispatcher over a shared Grafana client
    #[must_use]
    pub fn new(client: Arc<GrafanaClient>) -> Self {
        Self {
            engine: Arc::new(QueryEngine::new(client)),
            tools: descriptors(),
        }
    }

    /// The query engine behind the query-shaped tools
    #[must_use]
    pub fn engine(&self) -> &Arc<QueryEngine> {
        &self.engine
    }

    /// Enumerate the static descriptor table
    #[must_use]
    pub fn list(&self) -> &[Tool] {
        &self.tools
    }

    /// Invoke a tool by name
    ///
    /// Always returns a result; validation failures, unknown names and
    /// upstream errors all come back as error results.
    pub async fn invoke(&self, name: &str, arguments: &Value) -> ToolsCallResult {
        let Some(tool) = self.tools.iter().find(|t| t.name == name) else {
            warn!(tool = name, "Unknown tool requested");
            return ToolsCallResult::error(Error::UnknownTool(name.to_string()).to_string());
        };

        let args = match validate_arguments(arguments, &tool.input_schema) {
            Ok(coerced) => coerced,
            Err(message) => {
                debug!(tool = name, %message, "Argument validation failed");
                return ToolsCallResult::error(
                    Error::Validation(format!("{name}: {message}")).to_string(),
                );
            }
        };

        match self.dispatch(name, &args).await {
            Ok(text) => ToolsCallResult::text(text),
            Err(e) => {
                warn!(tool = name, error = %e, "Tool invocation failed");
                ToolsCallResult::error(e.to_string())
            }
        }
    }

    async fn dispatch(&self, name: &str, args: &Value) -> Result<String> {
        match name {
            "query_prometheus" => self.query_prometheus(args).await,
            "get_dashboard" => self.get_dashboard(args).await,
            "list_dashboards" => self.list_dashboards(args).await,
            "get_panel_data" => self.get_panel_data(args).await,
            "get_datasources" => self.get_datasources().await,
            "create_snapshot" => self.create_snapshot(args).await,
            other => Err(Error::UnknownTool(other.to_string())),
        }
    }

    async fn query_prometheus(&self, args: &Value) -> Result<String> {
        let request: QueryRequest = serde_json::from_value(args.clone())?;
        let result = self.engine.execute(&request).await?;

        let result_type = result
            .data
            .as_ref()
            .map_or("unknown", |d| d.result_type());
        Ok(format!(
            "Prometheus Query Result:\nQuery: {}\nStatus: {}\nResult Type: {}\nSummary: {}\nData: {}",
            request.query,
            match result.status {
                crate::prometheus::QueryStatus::Success => "success",
                crate::prometheus::QueryStatus::Error => "error",
            },
            result_type,
            format::summarize(&result, None),
            serde_json::to_string_pretty(&result)?,
        ))
    }

    async fn get_dashboard(&self, args: &Value) -> Result<String> {
        let identifier = required_str(args, "identifier")?;
        let dashboard = match args.get("type").and_then(Value::as_str) {
            Some("id") => DashboardRef::Id(identifier),
            _ => DashboardRef::Uid(identifier),
        };
        let details = self.engine.client().get_dashboard(dashboard).await?;
        let dash = &details.dashboard;

        let mut out = format!(
            "Dashboard: {}\nUID: {}\nDescription: {}\nTags: {}\nPanels: {}",
            dash.title,
            dash.uid,
            dash.description.as_deref().unwrap_or("No description"),
            if dash.tags.is_empty() {
                "None".to_string()
            } else {
                dash.tags.join(", ")
            },
            dash.panels.len(),
        );
        for panel in &dash.panels {
            out.push_str(&format!(
                "\n- [{}] {} ({})",
                panel.id, panel.title, panel.panel_type
            ));
        }
        Ok(out)
    }

    async fn list_dashboards(&self, args: &Value) -> Result<String> {
        let query = args.get("query").and_then(Value::as_str);
        let limit = args
            .get("limit")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_SEARCH_LIMIT);
        let dashboards = self.engine.client().search_dashboards(query, limit).await?;

        let mut out = format!("Found {} dashboards:", dashboards.len());
        for d in &dashboards {
            out.push_str(&format!("\n- {} (UID: {})", d.title, d.uid));
        }
        Ok(out)
    }

    async fn get_panel_data(&self, args: &Value) -> Result<String> {
        let dashboard_uid = required_str(args, "dashboardUid")?;
        let panel_id = args
            .get("panelId")
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::Validation("missing required parameter 'panelId'".into()))?;
        let from = args
            .get("from")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PANEL_FROM);
        let to = args
            .get("to")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PANEL_TO);

        let data = self
            .engine
            .panel_data(dashboard_uid, panel_id, from, to)
            .await?;
        Ok(serde_json::to_string_pretty(&data)?)
    }

    async fn get_datasources(&self) -> Result<String> {
        let datasources = self.engine.client().get_datasources().await?;
        let mut out = format!("Found {} datasources:", datasources.len());
        for ds in &datasources {
            out.push_str(&format!(
                "\n- {} (type: {}, id: {}{})",
                ds.name,
                ds.ds_type,
                ds.id,
                if ds.is_default { ", default" } else { "" }
            ));
        }
        Ok(out)
    }

    async fn create_snapshot(&self, args: &Value) -> Result<String> {
        let dashboard_uid = required_str(args, "dashboardUid")?;
        let expires = args
            .get("expires")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_SNAPSHOT_EXPIRES);

        let snapshot = self
            .engine
            .client()
            .create_snapshot(dashboard_uid, expires)
            .await?;
        Ok(format!(
            "Snapshot created:\nURL: {}\nKey: {}\nDelete key: {}",
            snapshot.url, snapshot.key, snapshot.delete_key
        ))
    }
}

fn required_str<'a>(args: &'a Value, name: &str) -> Result<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Validation(format!("missing required parameter '{name}'")))
}

/// The static tool descriptor table, defined once at process start
#[must_use]
pub fn descriptors() -> Vec<Tool> {
    vec![
        Tool {
            name: "query_prometheus".to_string(),
            description: Some(
                "Execute a PromQL query through the configured Prometheus datasource. \
                 Providing both start and end makes it a range query."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "PromQL query to execute"},
                    "time": {"type": "string", "description": "Timestamp for instant query (ISO format)"},
                    "start": {"type": "string", "description": "Start time for range query (ISO format)"},
                    "end": {"type": "string", "description": "End time for range query (ISO format)"},
                    "step": {"type": "string", "description": "Step for range query (e.g. '1m', '5m'; default 60s)"}
                },
                "required": ["query"]
            }),
        },
        Tool {
            name: "get_dashboard".to_string(),
            description: Some("Fetch dashboard metadata and its panel list".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "identifier": {"type": "string", "description": "Dashboard ID or UID"},
                    "type": {"type": "string", "enum": ["id", "uid"], "description": "Whether identifier is an ID or UID (default uid)"}
                },
                "required": ["identifier"]
            }),
        },
        Tool {
            name: "list_dashboards".to_string(),
            description: Some("Search dashboards by title".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Search text"},
                    "limit": {"type": "integer", "minimum": 1, "maximum": 100, "description": "Maximum number of dashboards to return (default 10)"}
                }
            }),
        },
        Tool {
            name: "get_panel_data".to_string(),
            description: Some(
                "Run the queries a dashboard panel declares and return per-target results"
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "dashboardUid": {"type": "string", "description": "Dashboard UID"},
                    "panelId": {"type": "integer", "description": "Panel id within the dashboard"},
                    "from": {"type": "string", "description": "Range start (default now-1h)"},
                    "to": {"type": "string", "description": "Range end (default now)"}
                },
                "required": ["dashboardUid", "panelId"]
            }),
        },
        Tool {
            name: "get_datasources".to_string(),
            description: Some("List configured Grafana datasources".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        Tool {
            name: "create_snapshot".to_string(),
            description: Some("Create a snapshot of a dashboard".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "dashboardUid": {"type": "string", "description": "Dashboard UID"},
                    "expires": {"type": "integer", "minimum": 0, "description": "Snapshot lifetime in seconds (default 3600)"}
                },
                "required": ["dashboardUid"]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_table_covers_the_tool_surface() {
        let names: Vec<String> = descriptors().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "query_prometheus",
                "get_dashboard",
                "list_dashboards",
                "get_panel_data",
                "get_datasources",
                "create_snapshot",
            ]
        );
    }

    #[test]
    fn every_descriptor_declares_an_object_schema() {
        for tool in descriptors() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            assert!(tool.description.is_some(), "{}", tool.name);
        }
    }
}
