//! Prometheus datasource resolution
//!
//! Discovers which datasource proxied queries should hit and memoizes the
//! selection for the life of the client. No invalidation on datasource
//! reconfiguration: a restarted process re-resolves, a running one does not.

use tokio::sync::OnceCell;
use tracing::info;

use crate::grafana::{Datasource, GrafanaClient};
use crate::{Error, Result};

/// A resolved backend handle: the proxy path prefix queries are issued under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrometheusHandle {
    /// Path prefix, `/api/datasources/proxy/{id}`
    pub proxy_base: String,
    /// Display name of the selected datasource
    pub name: String,
}

/// One-shot datasource resolver
///
/// The cell guarantees a single discovery network call even under concurrent
/// first requests; later calls return the cached handle without I/O.
#[derive(Default)]
pub struct DatasourceResolver {
    handle: OnceCell<PrometheusHandle>,
}

impl DatasourceResolver {
    /// Create an unresolved resolver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the Prometheus backend, fetching the datasource list on first use
    pub async fn resolve(&self, client: &GrafanaClient) -> Result<&PrometheusHandle> {
        self.handle
            .get_or_try_init(|| async {
                let datasources = client.get_datasources().await?;
                let picked = select_prometheus(&datasources)?;
                info!(
                    datasource = %picked.name,
                    id = picked.id,
                    default = picked.is_default,
                    "Resolved Prometheus datasource"
                );
                Ok(PrometheusHandle {
                    proxy_base: format!("/api/datasources/proxy/{}", picked.id),
                    name: picked.name.clone(),
                })
            })
            .await
    }
}

/// Pick the Prometheus datasource: the default one if marked, otherwise the
/// first Prometheus-typed entry.
pub fn select_prometheus(datasources: &[Datasource]) -> Result<&Datasource> {
    let mut prometheus = datasources.iter().filter(|ds| ds.ds_type == "prometheus");
    let first = prometheus.next().ok_or(Error::NoBackendConfigured)?;
    Ok(prometheus
        .fold(
            (first, first.is_default),
            |(best, found_default), candidate| {
                if found_default || !candidate.is_default {
                    (best, found_default)
                } else {
                    (candidate, true)
                }
            },
        )
        .0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ds(id: i64, ds_type: &str, is_default: bool) -> Datasource {
        Datasource {
            id,
            uid: format!("uid-{id}"),
            name: format!("ds-{id}"),
            ds_type: ds_type.to_string(),
            is_default,
            url: String::new(),
        }
    }

    #[test]
    fn empty_list_is_no_backend() {
        assert!(matches!(
            select_prometheus(&[]),
            Err(Error::NoBackendConfigured)
        ));
    }

    #[test]
    fn non_prometheus_only_is_no_backend() {
        let list = [ds(1, "loki", true), ds(2, "influxdb", false)];
        assert!(matches!(
            select_prometheus(&list),
            Err(Error::NoBackendConfigured)
        ));
    }

    #[test]
    fn single_non_default_prometheus_is_selected() {
        let list = [ds(1, "loki", true), ds(2, "prometheus", false)];
        assert_eq!(select_prometheus(&list).unwrap().id, 2);
    }

    #[test]
    fn default_prometheus_preferred_over_earlier_entry() {
        let list = [
            ds(1, "prometheus", false),
            ds(2, "prometheus", true),
            ds(3, "prometheus", false),
        ];
        assert_eq!(select_prometheus(&list).unwrap().id, 2);
    }

    #[test]
    fn default_of_other_type_does_not_win() {
        let list = [ds(1, "influxdb", true), ds(2, "prometheus", false)];
        assert_eq!(select_prometheus(&list).unwrap().id, 2);
    }
}
