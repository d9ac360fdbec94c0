//! End-to-end tests against a stub Grafana
//!
//! A small axum app stands in for Grafana on a loopback port, serving
//! canned datasource, dashboard and proxy-query responses and counting
//! the calls it sees.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use grafana_gateway::Error;
use grafana_gateway::grafana::GrafanaClient;
use grafana_gateway::prometheus::{QueryEngine, QueryRequest};
use grafana_gateway::tools::ToolDispatcher;

/// Call counters shared between the stub and assertions
#[derive(Default)]
struct StubState {
    datasource_hits: AtomicUsize,
    instant_hits: AtomicUsize,
    range_hits: AtomicUsize,
}

async fn stub_datasources(State(state): State<Arc<StubState>>) -> Json<Value> {
    state.datasource_hits.fetch_add(1, Ordering::SeqCst);
    Json(json!([
        {"id": 7, "uid": "loki-uid", "name": "Loki", "type": "loki", "isDefault": false, "url": ""},
        {"id": 42, "uid": "prom-uid", "name": "Prometheus", "type": "prometheus", "isDefault": true, "url": "http://prometheus:9090"}
    ]))
}

async fn stub_instant(
    State(state): State<Arc<StubState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<Value> {
    state.instant_hits.fetch_add(1, Ordering::SeqCst);
    assert!(params.iter().any(|(k, _)| k == "query"));
    Json(json!({
        "status": "success",
        "data": {
            "resultType": "vector",
            "result": [
                {"metric": {"instance": "web-1"}, "value": [1705276800.0, "1"]}
            ]
        }
    }))
}

async fn stub_range(
    State(state): State<Arc<StubState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<Value> {
    state.range_hits.fetch_add(1, Ordering::SeqCst);
    for key in ["query", "start", "end", "step"] {
        assert!(params.iter().any(|(k, _)| k == key), "missing {key}");
    }
    Json(json!({
        "status": "success",
        "data": {
            "resultType": "matrix",
            "result": [
                {"metric": {"instance": "web-1"}, "values": [[1705276800.0, "1"], [1705276860.0, "1"]]}
            ]
        }
    }))
}

async fn stub_dashboard(Path(uid): Path<String>) -> (StatusCode, Json<Value>) {
    if uid != "host-overview" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Dashboard not found"})),
        );
    }
    let body = json!({
        "meta": {"folderTitle": "Infra"},
        "dashboard": {
            "id": 12,
            "uid": "host-overview",
            "title": "Host overview",
            "tags": ["infra"],
            "panels": [
                {
                    "id": 1,
                    "title": "Service up",
                    "type": "stat",
                    "targets": [{"refId": "A", "expr": "up"}]
                },
                {
                    "id": 2,
                    "title": "Notes",
                    "type": "text",
                    "description": "Operator notes",
                    "targets": []
                }
            ],
            "schemaVersion": 39
        }
    });
    (StatusCode::OK, Json(body))
}

async fn stub_search() -> Json<Value> {
    Json(json!([
        {"id": 12, "uid": "host-overview", "title": "Host overview", "url": "/d/host-overview", "tags": ["infra"]}
    ]))
}

async fn stub_snapshot(Json(body): Json<Value>) -> Json<Value> {
    assert_eq!(body["name"], "Snapshot of Host overview");
    assert!(body["dashboard"]["panels"].is_array());
    Json(json!({
        "key": "snap-key",
        "url": "http://grafana/dashboard/snapshot/snap-key",
        "deleteKey": "del-key",
        "deleteUrl": "http://grafana/api/snapshots-delete/del-key",
        "id": 99
    }))
}

/// Spawn the stub and return its base URL plus the shared counters
async fn spawn_stub_grafana() -> (String, Arc<StubState>) {
    let state = Arc::new(StubState::default());
    let app = Router::new()
        .route("/api/org", get(|| async { Json(json!({"id": 1})) }))
        .route("/api/datasources", get(stub_datasources))
        .route("/api/datasources/proxy/42/api/v1/query", get(stub_instant))
        .route(
            "/api/datasources/proxy/42/api/v1/query_range",
            get(stub_range),
        )
        .route("/api/dashboards/uid/{uid}", get(stub_dashboard))
        .route("/api/search", get(stub_search))
        .route("/api/snapshots", post(stub_snapshot))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), state)
}

fn engine_for(base_url: &str) -> QueryEngine {
    let client = GrafanaClient::new(base_url, "test-key").unwrap();
    QueryEngine::new(Arc::new(client))
}

#[tokio::test]
async fn datasource_is_resolved_once_across_queries() {
    let (url, state) = spawn_stub_grafana().await;
    let engine = engine_for(&url);

    engine.execute(&QueryRequest::instant("up")).await.unwrap();
    engine
        .execute(&QueryRequest::instant("node_load1"))
        .await
        .unwrap();
    engine
        .execute(&QueryRequest::range("up", "now-1h", "now"))
        .await
        .unwrap();

    assert_eq!(state.datasource_hits.load(Ordering::SeqCst), 1);
    assert_eq!(state.instant_hits.load(Ordering::SeqCst), 2);
    assert_eq!(state.range_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn start_and_end_select_the_range_endpoint() {
    let (url, state) = spawn_stub_grafana().await;
    let engine = engine_for(&url);

    let result = engine
        .execute(&QueryRequest::range("up", "now-1h", "now"))
        .await
        .unwrap();
    assert_eq!(
        result.data.as_ref().map(|d| d.result_type()),
        Some("matrix")
    );
    assert_eq!(state.instant_hits.load(Ordering::SeqCst), 0);
    assert_eq!(state.range_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn start_alone_stays_an_instant_query() {
    let (url, state) = spawn_stub_grafana().await;
    let engine = engine_for(&url);

    let mut request = QueryRequest::instant("up");
    request.start = Some("now-1h".to_string());
    engine.execute(&request).await.unwrap();

    assert_eq!(state.instant_hits.load(Ordering::SeqCst), 1);
    assert_eq!(state.range_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_panel_fails_without_touching_the_backend() {
    let (url, state) = spawn_stub_grafana().await;
    let engine = engine_for(&url);

    let err = engine
        .panel_data("host-overview", 99, "now-1h", "now")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::PanelNotFound { panel_id: 99, .. }
    ));
    assert_eq!(state.instant_hits.load(Ordering::SeqCst), 0);
    assert_eq!(state.range_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn panel_without_queries_reports_a_message_only() {
    let (url, state) = spawn_stub_grafana().await;
    let engine = engine_for(&url);

    let data = engine
        .panel_data("host-overview", 2, "now-1h", "now")
        .await
        .unwrap();
    assert_eq!(data.message.as_deref(), Some("Panel has no queries configured"));
    assert!(data.results.is_empty());
    assert_eq!(data.panel.description.as_deref(), Some("Operator notes"));
    assert_eq!(state.range_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn panel_targets_run_as_range_queries_keyed_by_ref_id() {
    let (url, state) = spawn_stub_grafana().await;
    let engine = engine_for(&url);

    let data = engine
        .panel_data("host-overview", 1, "now-6h", "now")
        .await
        .unwrap();
    assert_eq!(data.results.len(), 1);
    assert_eq!(data.results[0].ref_id, "A");
    assert_eq!(data.results[0].query, "up");
    assert_eq!(data.time_range.as_ref().unwrap().from, "now-6h");
    assert_eq!(state.range_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_dashboard_surfaces_grafana_message() {
    let (url, _state) = spawn_stub_grafana().await;
    let engine = engine_for(&url);

    let err = engine
        .panel_data("missing-uid", 1, "now-1h", "now")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::QueryFailed(ref m) if m.contains("Dashboard not found")));
}

// ── Tool surface over the stub ────────────────────────────────────────────

fn dispatcher_for(base_url: &str) -> ToolDispatcher {
    let client = GrafanaClient::new(base_url, "test-key").unwrap();
    ToolDispatcher::new(Arc::new(client))
}

#[tokio::test]
async fn query_prometheus_tool_returns_summary_and_data() {
    let (url, _state) = spawn_stub_grafana().await;
    let dispatcher = dispatcher_for(&url);

    let result = dispatcher
        .invoke("query_prometheus", &json!({"query": "up"}))
        .await;
    assert!(!result.is_error);
    let text = result.first_text().unwrap();
    assert!(text.contains("Status: success"), "{text}");
    assert!(text.contains("Result Type: vector"), "{text}");
    assert!(text.contains("Summary: 1"), "{text}");
}

#[tokio::test]
async fn get_dashboard_tool_lists_panels() {
    let (url, _state) = spawn_stub_grafana().await;
    let dispatcher = dispatcher_for(&url);

    let result = dispatcher
        .invoke("get_dashboard", &json!({"identifier": "host-overview"}))
        .await;
    assert!(!result.is_error);
    let text = result.first_text().unwrap();
    assert!(text.contains("Dashboard: Host overview"), "{text}");
    assert!(text.contains("[1] Service up (stat)"), "{text}");
    assert!(text.contains("[2] Notes (text)"), "{text}");
}

#[tokio::test]
async fn list_dashboards_tool_reports_matches() {
    let (url, _state) = spawn_stub_grafana().await;
    let dispatcher = dispatcher_for(&url);

    let result = dispatcher
        .invoke("list_dashboards", &json!({"query": "host"}))
        .await;
    assert!(!result.is_error);
    let text = result.first_text().unwrap();
    assert!(text.contains("Found 1 dashboards"), "{text}");
    assert!(text.contains("Host overview (UID: host-overview)"), "{text}");
}

#[tokio::test]
async fn get_datasources_tool_marks_the_default() {
    let (url, _state) = spawn_stub_grafana().await;
    let dispatcher = dispatcher_for(&url);

    let result = dispatcher.invoke("get_datasources", &json!({})).await;
    assert!(!result.is_error);
    let text = result.first_text().unwrap();
    assert!(text.contains("Found 2 datasources"), "{text}");
    assert!(
        text.contains("Prometheus (type: prometheus, id: 42, default)"),
        "{text}"
    );
}

#[tokio::test]
async fn create_snapshot_tool_returns_keys() {
    let (url, _state) = spawn_stub_grafana().await;
    let dispatcher = dispatcher_for(&url);

    let result = dispatcher
        .invoke("create_snapshot", &json!({"dashboardUid": "host-overview"}))
        .await;
    assert!(!result.is_error);
    let text = result.first_text().unwrap();
    assert!(text.contains("snap-key"), "{text}");
    assert!(text.contains("Delete key: del-key"), "{text}");
}

#[tokio::test]
async fn startup_probe_accepts_the_stub() {
    let (url, _state) = spawn_stub_grafana().await;
    let client = GrafanaClient::new(&url, "test-key").unwrap();
    client.test_connection().await.unwrap();
}
