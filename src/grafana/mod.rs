//! Grafana API client and data model

mod client;
mod types;

pub use client::{DashboardRef, GrafanaClient};
pub use types::{
    Dashboard, DashboardDetails, DashboardSummary, Datasource, Panel, PanelTarget, Snapshot,
};
