//! Materialized query results

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::anomaly::AnomalyDetector;
use super::value::{DataType, Value};

/// Outcome of running a check's query once
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names
    pub columns: Vec<String>,
    /// Column type descriptors, aligned with `columns`
    #[serde(default)]
    pub column_types: Vec<DataType>,
    /// Result rows, each aligned positionally with `columns`
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
    /// Error reported by the data source
    #[serde(default)]
    pub error: Option<String>,
    /// Whether the query was cut off by the data source
    #[serde(default)]
    pub timed_out: bool,
}

/// Result of the anomaly operation: `verdict` is `None` when no decision
/// could be made, and `message` always carries the diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyOutcome {
    pub verdict: Option<bool>,
    pub message: String,
}

impl AnomalyOutcome {
    fn undecided(message: impl Into<String>) -> Self {
        Self {
            verdict: None,
            message: message.into(),
        }
    }
}

impl QueryResult {
    /// Build a successful result, inferring column types from the first
    /// non-null value of each column
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let column_types = (0..columns.len())
            .map(|idx| {
                rows.iter()
                    .filter_map(|row| row.get(idx))
                    .find(|v| !v.is_null())
                    .map(DataType::from_value)
                    .unwrap_or(DataType::Null)
            })
            .collect();

        Self {
            columns,
            column_types,
            rows,
            error: None,
            timed_out: false,
        }
    }

    /// Build a failed result
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Build a timed-out result
    pub fn timeout(error: Option<String>) -> Self {
        Self {
            error,
            timed_out: true,
            ..Default::default()
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }

    /// First `limit` rows
    pub fn sample_rows(&self, limit: usize) -> &[Vec<Value>] {
        &self.rows[..self.rows.len().min(limit)]
    }

    /// Zip a row with the column names. A repeated column name keeps the
    /// last value.
    pub fn row_map(&self, row: &[Value]) -> BTreeMap<String, Value> {
        self.columns
            .iter()
            .zip(row.iter())
            .map(|(col, value)| (col.clone(), value.clone()))
            .collect()
    }

    /// Run anomaly detection over every value column.
    ///
    /// The first column is the time axis and each remaining column is one
    /// series, in row order. Null points are skipped.
    pub fn detect_anomaly(&self, detector: &dyn AnomalyDetector) -> AnomalyOutcome {
        if self.rows.is_empty() {
            return AnomalyOutcome::undecided("No data");
        }
        if self.columns.len() < 2 {
            return AnomalyOutcome::undecided("Bad format");
        }

        let mut series = Vec::with_capacity(self.columns.len() - 1);
        for (offset, name) in self.columns.iter().enumerate().skip(1) {
            let mut points = Vec::with_capacity(self.rows.len());
            for row in &self.rows {
                match row.get(offset) {
                    None | Some(Value::Null) => continue,
                    Some(value) => match value.as_f64() {
                        Some(v) => points.push(v),
                        None => return AnomalyOutcome::undecided("Bad format"),
                    },
                }
            }
            series.push((name.as_str(), points));
        }

        let mut anomalies = Vec::new();
        for (name, points) in &series {
            match detector.is_anomaly(points) {
                Ok(true) => anomalies.push(*name),
                Ok(false) => {}
                Err(e) => {
                    tracing::debug!(
                        detector = detector.name(),
                        series = %name,
                        error = %e,
                        "Anomaly detection failed"
                    );
                    return AnomalyOutcome::undecided(format!("{}: {}", name, e));
                }
            }
        }

        let message = match anomalies.len() {
            0 => "No anomalies detected".to_string(),
            1 => format!("Anomaly detected in {}", anomalies[0]),
            _ => format!("Anomalies detected in {}", to_sentence(&anomalies)),
        };

        AnomalyOutcome {
            verdict: Some(!anomalies.is_empty()),
            message,
        }
    }
}

fn to_sentence(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [one] => one.to_string(),
        [a, b] => format!("{} and {}", a, b),
        [head @ .., last] => format!("{}, and {}", head.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::anomaly::{DetectorError, ZScoreDetector};

    /// Flags any series whose last point is negative
    struct NegativeDetector;

    impl AnomalyDetector for NegativeDetector {
        fn name(&self) -> &str {
            "negative"
        }

        fn is_anomaly(&self, series: &[f64]) -> Result<bool, DetectorError> {
            series
                .last()
                .map(|v| *v < 0.0)
                .ok_or(DetectorError::NotEnoughData { needed: 1, got: 0 })
        }
    }

    fn series_result(columns: Vec<&str>, rows: Vec<Vec<Value>>) -> QueryResult {
        QueryResult::new(columns.into_iter().map(String::from).collect(), rows)
    }

    #[test]
    fn test_column_type_inference() {
        let result = series_result(
            vec!["a", "b"],
            vec![
                vec![Value::Null, Value::from("x")],
                vec![Value::Int64(1), Value::from("y")],
            ],
        );
        assert_eq!(result.column_types, vec![DataType::Int64, DataType::String]);
    }

    #[test]
    fn test_row_map_and_sample() {
        let rows = (0..15).map(|i| vec![Value::Int64(i), Value::from("u")]).collect();
        let result = series_result(vec!["id", "user_uuid"], rows);
        assert_eq!(result.sample_rows(10).len(), 10);

        let map = result.row_map(&result.rows[3]);
        assert_eq!(map["id"], Value::Int64(3));
        assert_eq!(map["user_uuid"], Value::from("u"));
    }

    #[test]
    fn test_detect_no_data() {
        let result = series_result(vec!["day", "count"], vec![]);
        let outcome = result.detect_anomaly(&ZScoreDetector::default());
        assert_eq!(outcome, AnomalyOutcome::undecided("No data"));
    }

    #[test]
    fn test_detect_bad_format() {
        let single = series_result(vec!["count"], vec![vec![Value::Int64(1)]]);
        assert_eq!(single.detect_anomaly(&NegativeDetector).message, "Bad format");

        let text = series_result(
            vec!["day", "count"],
            vec![vec![Value::from("2024-01-01"), Value::from("many")]],
        );
        let outcome = text.detect_anomaly(&NegativeDetector);
        assert_eq!(outcome.verdict, None);
        assert_eq!(outcome.message, "Bad format");
    }

    #[test]
    fn test_detect_verdicts() {
        let calm = series_result(
            vec!["day", "signups"],
            vec![
                vec![Value::from("2024-01-01"), Value::Int64(4)],
                vec![Value::from("2024-01-02"), Value::Int64(5)],
            ],
        );
        let outcome = calm.detect_anomaly(&NegativeDetector);
        assert_eq!(outcome.verdict, Some(false));
        assert_eq!(outcome.message, "No anomalies detected");

        let multi = series_result(
            vec!["day", "a", "b", "c"],
            vec![vec![
                Value::from("2024-01-01"),
                Value::Int64(-1),
                Value::Int64(-2),
                Value::Int64(-3),
            ]],
        );
        let outcome = multi.detect_anomaly(&NegativeDetector);
        assert_eq!(outcome.verdict, Some(true));
        assert_eq!(outcome.message, "Anomalies detected in a, b, and c");

        let one = series_result(
            vec!["day", "a", "b"],
            vec![vec![Value::from("d"), Value::Int64(1), Value::Int64(-2)]],
        );
        assert_eq!(one.detect_anomaly(&NegativeDetector).message, "Anomaly detected in b");
    }

    #[test]
    fn test_detector_failure_names_series() {
        let result = series_result(
            vec!["day", "revenue"],
            vec![vec![Value::from("2024-01-01"), Value::Float64(3.0)]],
        );
        let outcome = result.detect_anomaly(&ZScoreDetector::default());
        assert_eq!(outcome.verdict, None);
        assert_eq!(outcome.message, "revenue: Not enough data");
    }

    #[test]
    fn test_to_sentence() {
        assert_eq!(to_sentence(&["a", "b"]), "a and b");
        assert_eq!(to_sentence(&["a"]), "a");
    }
}
