//! Typed Prometheus response envelope
//!
//! The raw JSON passthrough of the Prometheus API is modeled as tagged
//! variants per result type, so the formatter gets exhaustive handling
//! instead of an untyped blob. Serialization reproduces the wire shape
//! bit-for-bit, so the structured result stays the source of truth.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level Prometheus API envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// "success" or "error"
    pub status: QueryStatus,
    /// Result payload (present on success)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<QueryData>,
    /// Error class reported by Prometheus
    #[serde(rename = "errorType", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Error detail reported by Prometheus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Non-fatal warnings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Query status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    /// Query evaluated
    Success,
    /// Backend-reported failure
    Error,
}

/// Result payload, tagged by Prometheus result type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "resultType", content = "result", rename_all = "lowercase")]
pub enum QueryData {
    /// Instant query: one sample per matched series
    Vector(Vec<InstantSeries>),
    /// Range query: an ordered sample sequence per matched series
    Matrix(Vec<RangeSeries>),
    /// Single number
    Scalar(Sample),
    /// Single string
    String(Sample),
}

impl QueryData {
    /// Result type name as Prometheus spells it
    #[must_use]
    pub fn result_type(&self) -> &'static str {
        match self {
            Self::Vector(_) => "vector",
            Self::Matrix(_) => "matrix",
            Self::Scalar(_) => "scalar",
            Self::String(_) => "string",
        }
    }

    /// Number of series in the result set
    ///
    /// Scalar and string results count as a single series.
    #[must_use]
    pub fn series_count(&self) -> usize {
        match self {
            Self::Vector(series) => series.len(),
            Self::Matrix(series) => series.len(),
            Self::Scalar(_) | Self::String(_) => 1,
        }
    }

    /// Instantaneous value of each series, in result order
    ///
    /// Matrix series carry no instantaneous `value` field, only `values`;
    /// they yield `None` here rather than an arbitrarily chosen point.
    #[must_use]
    pub fn instant_values(&self) -> Vec<Option<&str>> {
        match self {
            Self::Vector(series) => series.iter().map(|s| Some(s.value.1.as_str())).collect(),
            Self::Matrix(series) => series.iter().map(|_| None).collect(),
            Self::Scalar(sample) | Self::String(sample) => vec![Some(sample.1.as_str())],
        }
    }
}

/// One series of an instant result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstantSeries {
    /// Label set identifying the series
    #[serde(default)]
    pub metric: BTreeMap<String, String>,
    /// The single (timestamp, value) pair
    pub value: Sample,
}

/// One series of a range result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSeries {
    /// Label set identifying the series
    #[serde(default)]
    pub metric: BTreeMap<String, String>,
    /// Samples ordered by time
    pub values: Vec<Sample>,
}

/// A (timestamp, value) pair as Prometheus encodes it: `[1700000000, "1.5"]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample(pub f64, pub String);
