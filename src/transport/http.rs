//! HTTP transport
//!
//! Mirrors the MCP tool surface over plain HTTP JSON for callers like n8n:
//! `POST /mcp` speaks the same JSON-RPC as the stdio shell, while
//! `POST /api/prometheus/query` is a REST shortcut for the query pipeline.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use super::handle_rpc;
use crate::prometheus::{QueryRequest, QueryResult, format};
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::tools::ToolDispatcher;

/// Shared application state
pub struct AppState {
    /// The tool dispatcher both endpoints route through
    pub dispatcher: Arc<ToolDispatcher>,
}

/// Create the HTTP router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/docs", get(docs_handler))
        .route("/mcp", post(mcp_handler))
        .route("/api/prometheus/query", post(prometheus_query_handler))
        .layer(CatchPanicLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Body of `POST /api/prometheus/query`
#[derive(Debug, Deserialize)]
struct PrometheusQueryBody {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
    #[serde(default)]
    step: Option<String>,
    /// Free-text hint steering the human-readable summary
    #[serde(default)]
    description: Option<String>,
}

/// Response of `POST /api/prometheus/query`
#[derive(Debug, Serialize)]
struct PrometheusQueryResponse {
    success: bool,
    query: String,
    result_type: &'static str,
    human_readable: String,
    data: Option<QueryResult>,
    execution_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn root_handler() -> Json<Value> {
    Json(json!({
        "service": "Grafana MCP Gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "mcp": "/mcp",
            "prometheus": "/api/prometheus/query",
            "health": "/health",
            "docs": "/docs"
        }
    }))
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "Grafana MCP Gateway",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Machine-readable capability description for HTTP callers
async fn docs_handler() -> Json<Value> {
    Json(json!({
        "title": "Grafana MCP Gateway API",
        "endpoints": {
            "POST /api/prometheus/query": {
                "description": "Execute Prometheus queries",
                "body": {
                    "query": "string (required) - PromQL query",
                    "time": "string (optional) - Timestamp for instant query",
                    "start": "string (optional) - Start time for range query",
                    "end": "string (optional) - End time for range query",
                    "step": "string (optional) - Step for range query (default: 60s)",
                    "description": "string (optional) - Human description for context"
                },
                "examples": [
                    {
                        "name": "Memory Usage",
                        "query": "(1 - (node_memory_MemAvailable_bytes / node_memory_MemTotal_bytes)) * 100",
                        "description": "Current memory usage percentage"
                    },
                    {
                        "name": "Service Status",
                        "query": "up",
                        "description": "Check if services are up"
                    }
                ]
            },
            "POST /mcp": {
                "description": "MCP JSON-RPC endpoint (initialize, tools/list, tools/call, ping)"
            }
        }
    }))
}

/// MCP JSON-RPC over HTTP
async fn mcp_handler(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> Json<Value> {
    let request: JsonRpcRequest = match serde_json::from_value(body) {
        Ok(r) => r,
        Err(e) => {
            let resp = JsonRpcResponse::error(None, -32600, format!("Invalid request: {e}"));
            return Json(serde_json::to_value(resp).unwrap_or_default());
        }
    };
    let response = handle_rpc(&state.dispatcher, request).await;
    Json(serde_json::to_value(response).unwrap_or_default())
}

/// REST shortcut into the query pipeline
async fn prometheus_query_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PrometheusQueryBody>,
) -> impl IntoResponse {
    let started = Instant::now();

    let Some(query) = body.query.filter(|q| !q.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": "Query parameter is required",
                "example": {"query": "up", "description": "Check service status"}
            })),
        )
            .into_response();
    };

    let request = QueryRequest {
        query: query.clone(),
        time: body.time,
        start: body.start,
        end: body.end,
        step: body.step,
    };
    let result_type = if request.start.is_some() && request.end.is_some() {
        "range"
    } else {
        "instant"
    };
    debug!(%query, result_type, "HTTP Prometheus query");

    match state.dispatcher.engine().execute(&request).await {
        Ok(result) => {
            let response = PrometheusQueryResponse {
                success: true,
                query,
                result_type,
                human_readable: format::summarize(&result, body.description.as_deref()),
                data: Some(result),
                execution_time: format!("{}ms", started.elapsed().as_millis()),
                error: None,
            };
            Json(response).into_response()
        }
        Err(e) => {
            let response = PrometheusQueryResponse {
                success: false,
                query,
                result_type,
                human_readable: "Query failed to execute".to_string(),
                data: None,
                execution_time: format!("{}ms", started.elapsed().as_millis()),
                error: Some(e.to_string()),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}
