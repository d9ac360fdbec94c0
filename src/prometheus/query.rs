//! Query dispatch
//!
//! Resolves the backend handle, normalizes parameters, and issues exactly one
//! GET to the instant or range endpoint. The JSON envelope is returned as-is;
//! shaping it for humans is the formatter's job, not this layer's.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::resolver::DatasourceResolver;
use super::result::QueryResult;
use super::time::{self, NormalizedQuery};
use crate::grafana::{DashboardRef, GrafanaClient};
use crate::{Error, Result};

/// A metrics query as callers submit it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// PromQL expression
    pub query: String,
    /// Anchor for an instant query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Range start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// Range end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Range resolution step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
}

impl QueryRequest {
    /// An instant query with no explicit anchor
    #[must_use]
    pub fn instant(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            time: None,
            start: None,
            end: None,
            step: None,
        }
    }

    /// A range query over [from, to]
    #[must_use]
    pub fn range(query: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            time: None,
            start: Some(from.into()),
            end: Some(to.into()),
            step: None,
        }
    }
}

/// Per-target result of a panel data fetch, keyed by the target's refId
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetResult {
    /// Reference id the dashboard declares for this target
    #[serde(rename = "refId")]
    pub ref_id: String,
    /// The PromQL expression that was run
    pub query: String,
    /// The structured result
    pub data: QueryResult,
}

/// Identity of the panel a data fetch was made against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelInfo {
    /// Panel id
    pub id: i64,
    /// Panel title
    pub title: String,
    /// Visualization type
    #[serde(rename = "type")]
    pub panel_type: String,
    /// Description, included when the panel has no queries to run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Result of a panel data fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelData {
    /// The panel queried
    pub panel: PanelInfo,
    /// Time range the targets were evaluated over
    #[serde(rename = "timeRange", default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    /// One entry per Prometheus-typed target
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<TargetResult>,
    /// Set instead of `results` when the panel declares no queries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A from/to pair as passed by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRange {
    /// Range start
    pub from: String,
    /// Range end
    pub to: String,
}

/// The query pipeline: one per process, threaded through both transports
pub struct QueryEngine {
    client: Arc<GrafanaClient>,
    resolver: DatasourceResolver,
}

impl QueryEngine {
    /// Build an engine over a shared Grafana client
    #[must_use]
    pub fn new(client: Arc<GrafanaClient>) -> Self {
        Self {
            client,
            resolver: DatasourceResolver::new(),
        }
    }

    /// Execute a query, classified as instant or range
    pub async fn execute(&self, request: &QueryRequest) -> Result<QueryResult> {
        let handle = self.resolver.resolve(&self.client).await?;

        let outcome = match time::normalize(request) {
            NormalizedQuery::Instant { time } => {
                let mut params = vec![("query", request.query.clone())];
                if let Some(t) = time {
                    params.push(("time", t));
                }
                debug!(query = %request.query, "Dispatching instant query");
                self.client
                    .proxy_get(&handle.proxy_base, "/api/v1/query", &params)
                    .await
            }
            NormalizedQuery::Range { start, end, step } => {
                let params = vec![
                    ("query", request.query.clone()),
                    ("start", start),
                    ("end", end),
                    ("step", step),
                ];
                debug!(query = %request.query, "Dispatching range query");
                self.client
                    .proxy_get(&handle.proxy_base, "/api/v1/query_range", &params)
                    .await
            }
        };

        outcome.map_err(wrap_query_error)
    }

    /// Fetch a panel's declared queries and run each through the pipeline
    ///
    /// Fails fast: the first failing target aborts the whole fetch rather
    /// than returning a partial result set.
    pub async fn panel_data(
        &self,
        dashboard_uid: &str,
        panel_id: i64,
        from: &str,
        to: &str,
    ) -> Result<PanelData> {
        let details = self
            .client
            .get_dashboard(DashboardRef::Uid(dashboard_uid))
            .await?;

        let panel = details
            .dashboard
            .panels
            .iter()
            .find(|p| p.id == panel_id)
            .ok_or_else(|| Error::PanelNotFound {
                panel_id,
                dashboard_uid: dashboard_uid.to_string(),
            })?;

        let expressions: Vec<(&str, &str)> = panel
            .targets
            .iter()
            .filter_map(|t| t.expr.as_deref().map(|expr| (t.ref_id.as_str(), expr)))
            .collect();

        if expressions.is_empty() {
            return Ok(PanelData {
                panel: PanelInfo {
                    id: panel.id,
                    title: panel.title.clone(),
                    panel_type: panel.panel_type.clone(),
                    description: panel.description.clone(),
                },
                time_range: None,
                results: Vec::new(),
                message: Some("Panel has no queries configured".to_string()),
            });
        }

        let mut results = Vec::with_capacity(expressions.len());
        for (ref_id, expr) in expressions {
            let data = self.execute(&QueryRequest::range(expr, from, to)).await?;
            results.push(TargetResult {
                ref_id: ref_id.to_string(),
                query: expr.to_string(),
                data,
            });
        }

        Ok(PanelData {
            panel: PanelInfo {
                id: panel.id,
                title: panel.title.clone(),
                panel_type: panel.panel_type.clone(),
                description: None,
            },
            time_range: Some(TimeRange {
                from: from.to_string(),
                to: to.to_string(),
            }),
            results,
            message: None,
        })
    }

    /// The Grafana client this engine dispatches through
    #[must_use]
    pub fn client(&self) -> &Arc<GrafanaClient> {
        &self.client
    }
}

/// Wrap upstream failures as query-execution errors; resolution and
/// credential failures keep their own identity.
fn wrap_query_error(e: Error) -> Error {
    match e {
        Error::Authentication(_)
        | Error::Connectivity(_)
        | Error::NoBackendConfigured
        | Error::QueryFailed(_) => e,
        other => Error::QueryFailed(other.to_string()),
    }
}
