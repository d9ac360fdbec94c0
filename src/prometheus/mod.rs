//! Prometheus query pipeline
//!
//! The decision logic of the gateway: datasource resolution, instant/range
//! classification, time-parameter normalization, dispatch through Grafana's
//! datasource proxy, and human-readable summarization of results.

pub mod format;
mod query;
mod resolver;
mod result;
pub mod time;

pub use query::{PanelData, PanelInfo, QueryEngine, QueryRequest, TargetResult, TimeRange};
pub use resolver::{DatasourceResolver, PrometheusHandle, select_prometheus};
pub use result::{InstantSeries, QueryData, QueryResult, QueryStatus, RangeSeries, Sample};
pub use time::{DEFAULT_STEP, NormalizedQuery};
