//! Human-readable result summaries
//!
//! Best-effort, intentionally lossy formatting of a query result into one
//! line of text. The structured [`QueryResult`] returned alongside remains
//! the source of truth; this never fails and never performs I/O.

use super::result::QueryResult;

/// Fixed message for an empty result set
pub const NO_DATA: &str = "No data found for this query";

const GIB: f64 = 1_073_741_824.0;
const MIB: f64 = 1_048_576.0;

/// Summarize a query result, optionally steered by a free-text hint
///
/// - zero series: the fixed no-data message
/// - one series: its instantaneous value; a hint containing "memory" turns on
///   magnitude-based unit scaling (GB / MB / percent)
/// - several series: a count plus the comma-joined raw values, unscaled
///
/// Range series have no single instantaneous value and render as "N/A";
/// callers wanting range-wide summaries must not rely on this picking a point.
#[must_use]
pub fn summarize(result: &QueryResult, hint: Option<&str>) -> String {
    let Some(data) = &result.data else {
        return NO_DATA.to_string();
    };
    if data.series_count() == 0 {
        return NO_DATA.to_string();
    }

    let values = data.instant_values();
    if let [value] = values.as_slice() {
        return format_single(value.unwrap_or("N/A"), hint);
    }

    let joined: Vec<&str> = values.iter().map(|v| v.unwrap_or("N/A")).collect();
    format!("Found {} results: {}", values.len(), joined.join(", "))
}

fn format_single(value: &str, hint: Option<&str>) -> String {
    if let Some(hint) = hint {
        if hint.to_lowercase().contains("memory") {
            if let Ok(v) = value.parse::<f64>() {
                if v > GIB {
                    return format!("{:.2}GB", v / GIB);
                }
                if v > MIB {
                    return format!("{:.2}MB", v / MIB);
                }
                if v > 0.0 && v < 100.0 {
                    return format!("{v:.2}%");
                }
            }
        }
        return format!("{value} ({hint})");
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prometheus::result::{InstantSeries, QueryData, QueryStatus, RangeSeries, Sample};
    use std::collections::BTreeMap;

    fn vector(values: &[&str]) -> QueryResult {
        QueryResult {
            status: QueryStatus::Success,
            data: Some(QueryData::Vector(
                values
                    .iter()
                    .map(|v| InstantSeries {
                        metric: BTreeMap::new(),
                        value: Sample(1_700_000_000.0, (*v).to_string()),
                    })
                    .collect(),
            )),
            error_type: None,
            error: None,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn empty_series_set_is_the_fixed_no_data_string() {
        assert_eq!(summarize(&vector(&[]), None), NO_DATA);
        assert_eq!(summarize(&vector(&[]), Some("memory usage")), NO_DATA);
    }

    #[test]
    fn missing_data_is_no_data_too() {
        let result = QueryResult {
            status: QueryStatus::Error,
            data: None,
            error_type: Some("bad_data".to_string()),
            error: Some("boom".to_string()),
            warnings: Vec::new(),
        };
        assert_eq!(summarize(&result, None), NO_DATA);
    }

    #[test]
    fn two_gigabytes_with_memory_hint_scales_to_gb() {
        assert_eq!(
            summarize(&vector(&["2147483648"]), Some("Memory used")),
            "2.00GB"
        );
    }

    #[test]
    fn megabyte_range_with_memory_hint_scales_to_mb() {
        assert_eq!(
            summarize(&vector(&["52428800"]), Some("memory available")),
            "50.00MB"
        );
    }

    #[test]
    fn small_value_with_memory_hint_renders_as_percent() {
        assert_eq!(summarize(&vector(&["50"]), Some("memory usage")), "50.00%");
    }

    #[test]
    fn hint_without_memory_annotates_in_parentheses() {
        assert_eq!(
            summarize(&vector(&["1"]), Some("service status")),
            "1 (service status)"
        );
    }

    #[test]
    fn no_hint_renders_raw_value() {
        assert_eq!(summarize(&vector(&["0.75"]), None), "0.75");
    }

    #[test]
    fn multiple_series_list_raw_values_without_scaling() {
        let text = summarize(&vector(&["1", "2"]), Some("memory"));
        assert!(text.contains("Found 2 results"));
        assert!(text.contains('1'));
        assert!(text.contains('2'));
        assert!(!text.contains('%'));
    }

    #[test]
    fn single_range_series_renders_na_rather_than_picking_a_point() {
        let result = QueryResult {
            status: QueryStatus::Success,
            data: Some(QueryData::Matrix(vec![RangeSeries {
                metric: BTreeMap::new(),
                values: vec![
                    Sample(1_700_000_000.0, "1".to_string()),
                    Sample(1_700_000_060.0, "2".to_string()),
                ],
            }])),
            error_type: None,
            error: None,
            warnings: Vec::new(),
        };
        assert_eq!(summarize(&result, None), "N/A");
    }

    #[test]
    fn summarize_is_pure_across_repeated_calls() {
        let result = vector(&["50"]);
        let first = summarize(&result, Some("memory"));
        let second = summarize(&result, Some("memory"));
        assert_eq!(first, second);
    }
}
