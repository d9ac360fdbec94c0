//! HTTP client for the Grafana API
//!
//! All requests carry the bearer credential as given and a fixed 30 second
//! deadline. No retries: a failed upstream call surfaces immediately.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use super::types::{DashboardDetails, DashboardSummary, Datasource, Snapshot};
use crate::{Error, Result};

/// Per-call deadline for every Grafana request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How a dashboard is addressed in a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardRef<'a> {
    /// By stable uid (`/api/dashboards/uid/{uid}`)
    Uid(&'a str),
    /// By legacy slug/id (`/api/dashboards/db/{id}`)
    Id(&'a str),
}

/// Typed client for the Grafana HTTP API
pub struct GrafanaClient {
    http: reqwest::Client,
    base_url: String,
}

impl GrafanaClient {
    /// Build a client for the given base URL and API credential
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL this client talks to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Verify the URL and credential by hitting /api/org
    pub async fn test_connection(&self) -> Result<()> {
        let url = format!("{}/api/org", self.base_url);
        let response = self.http.get(&url).send().await.map_err(request_error)?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(Error::Authentication(
                "API key rejected by Grafana".to_string(),
            )),
            status if status.is_success() => Ok(()),
            status => Err(Error::Connectivity(format!(
                "unexpected status {status} from {url}"
            ))),
        }
    }

    /// List configured datasources
    pub async fn get_datasources(&self) -> Result<Vec<Datasource>> {
        self.get_json("/api/datasources", &[]).await
    }

    /// Search dashboards, optionally filtered by text
    pub async fn search_dashboards(
        &self,
        query: Option<&str>,
        limit: u64,
    ) -> Result<Vec<DashboardSummary>> {
        let mut params = vec![
            ("type", "dash-db".to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(q) = query {
            params.push(("query", q.to_string()));
        }
        self.get_json("/api/search", &params).await
    }

    /// Fetch a dashboard by uid or id
    pub async fn get_dashboard(&self, dashboard: DashboardRef<'_>) -> Result<DashboardDetails> {
        let path = match dashboard {
            DashboardRef::Uid(uid) => format!("/api/dashboards/uid/{uid}"),
            DashboardRef::Id(id) => format!("/api/dashboards/db/{id}"),
        };
        self.get_json(&path, &[]).await
    }

    /// Create a snapshot of a dashboard, expiring after `expires` seconds
    pub async fn create_snapshot(&self, dashboard_uid: &str, expires: u64) -> Result<Snapshot> {
        let details = self.get_dashboard(DashboardRef::Uid(dashboard_uid)).await?;
        let body = json!({
            "dashboard": details.dashboard,
            "name": format!("Snapshot of {}", details.dashboard.title),
            "expires": expires,
        });
        self.post_json("/api/snapshots", &body).await
    }

    /// GET a path relative to a datasource proxy prefix
    ///
    /// `proxy_base` is the `/api/datasources/proxy/{id}` prefix produced by
    /// the datasource resolver.
    pub async fn proxy_get<T: DeserializeOwned>(
        &self,
        proxy_base: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.get_json(&format!("{proxy_base}{path}"), query).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(request_error)?;
        Self::decode(path, response).await
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "POST");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(request_error)?;
        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication(
                "API key rejected by Grafana".to_string(),
            ));
        }
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .get("message")
                .or_else(|| body.get("error"))
                .and_then(Value::as_str)
                .unwrap_or("no error detail");
            return Err(Error::QueryFailed(format!("{path}: {status}: {message}")));
        }
        Ok(response.json().await?)
    }
}

/// Map a reqwest transport error into the gateway taxonomy
fn request_error(e: reqwest::Error) -> Error {
    if e.is_connect() {
        Error::Connectivity(e.to_string())
    } else if e.is_timeout() {
        Error::QueryFailed(format!("request timed out after 30s: {e}"))
    } else {
        Error::Http(e)
    }
}
