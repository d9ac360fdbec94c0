//! Time-parameter normalization
//!
//! Classifies a request as instant vs. range and converts time expressions
//! into what the Prometheus API expects: ISO-8601 timestamps become epoch
//! seconds, opaque relative expressions ("now-1h") pass through untouched.

use chrono::DateTime;

use super::query::QueryRequest;

/// Step substituted when a range query omits one
pub const DEFAULT_STEP: &str = "60s";

/// A classified, wire-ready set of query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedQuery {
    /// Evaluated at a single point in time
    Instant {
        /// Anchor timestamp; `None` lets the backend evaluate at "now"
        time: Option<String>,
    },
    /// Evaluated across [start, end] at `step` intervals
    Range {
        /// Range start
        start: String,
        /// Range end
        end: String,
        /// Resolution step
        step: String,
    },
}

/// Normalize a request into instant or range parameters
///
/// A request is a range query iff both `start` and `end` are present; `step`
/// alone never promotes it. `end < start` is deliberately not validated
/// here: values pass through and the backend's error is surfaced unmodified.
#[must_use]
pub fn normalize(request: &QueryRequest) -> NormalizedQuery {
    match (&request.start, &request.end) {
        (Some(start), Some(end)) => NormalizedQuery::Range {
            start: to_epoch(start),
            end: to_epoch(end),
            step: request
                .step
                .clone()
                .unwrap_or_else(|| DEFAULT_STEP.to_string()),
        },
        _ => NormalizedQuery::Instant {
            time: request.time.as_deref().map(to_epoch),
        },
    }
}

/// Convert an ISO-8601 timestamp to epoch seconds; pass anything else through
fn to_epoch(value: &str) -> String {
    match DateTime::parse_from_rfc3339(value) {
        Ok(ts) => ts.timestamp().to_string(),
        Err(_) => value.to_string(),
    }
}
