//! Result classification

use std::sync::Arc;

use crate::checks::{CheckKind, CheckState};
use crate::data::{AnomalyDetector, QueryResult, ZScoreDetector};

/// State and message computed from one result
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub state: CheckState,
    pub message: Option<String>,
}

/// Maps a query result to a check state. Never fails: source errors,
/// timeouts and undecided anomaly checks are ordinary states.
#[derive(Clone)]
pub struct ResultEvaluator {
    detector: Arc<dyn AnomalyDetector>,
}

impl ResultEvaluator {
    pub fn new(detector: Arc<dyn AnomalyDetector>) -> Self {
        Self { detector }
    }

    /// First match wins: timeout, source error, then the kind's own rule.
    pub fn evaluate(&self, kind: CheckKind, result: &QueryResult) -> Verdict {
        let message = result.error.clone();

        if result.timed_out {
            return Verdict {
                state: CheckState::TimedOut,
                message,
            };
        }
        if result.error.is_some() {
            return Verdict {
                state: CheckState::Error,
                message,
            };
        }

        let state = match kind {
            CheckKind::Anomaly => {
                let outcome = result.detect_anomaly(self.detector.as_ref());
                let state = match outcome.verdict {
                    None => CheckState::Error,
                    Some(true) => CheckState::Failing,
                    Some(false) => CheckState::Passing,
                };
                return Verdict {
                    state,
                    message: Some(outcome.message),
                };
            }
            CheckKind::AlertFanout if result.has_rows() => CheckState::RowsFound,
            CheckKind::AlertFanout => CheckState::NoRows,
            CheckKind::MissingData if result.has_rows() => CheckState::Passing,
            CheckKind::MissingData => CheckState::Failing,
            CheckKind::BadData if result.has_rows() => CheckState::Failing,
            CheckKind::BadData => CheckState::Passing,
        };

        Verdict { state, message }
    }
}

impl Default for ResultEvaluator {
    fn default() -> Self {
        Self::new(Arc::new(ZScoreDetector::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DetectorError, Value};

    /// Returns the same verdict for every series
    struct FixedDetector(Result<bool, DetectorError>);

    impl AnomalyDetector for FixedDetector {
        fn name(&self) -> &str {
            "fixed"
        }

        fn is_anomaly(&self, _series: &[f64]) -> Result<bool, DetectorError> {
            self.0.clone()
        }
    }

    fn with_rows(n: usize) -> QueryResult {
        let rows = (0..n)
            .map(|i| vec![Value::from("2024-01-01"), Value::Int64(i as i64)])
            .collect();
        QueryResult::new(vec!["day".into(), "count".into()], rows)
    }

    fn evaluator(verdict: Result<bool, DetectorError>) -> ResultEvaluator {
        ResultEvaluator::new(Arc::new(FixedDetector(verdict)))
    }

    #[test]
    fn test_precedence_table() {
        let timed_out = QueryResult::timeout(Some("canceling statement".into()));
        let errored = QueryResult::failed("relation does not exist");
        let kinds = [
            CheckKind::BadData,
            CheckKind::MissingData,
            CheckKind::Anomaly,
            CheckKind::AlertFanout,
        ];

        let eval = evaluator(Ok(true));
        for kind in kinds {
            let verdict = eval.evaluate(kind, &timed_out);
            assert_eq!(verdict.state, CheckState::TimedOut, "{kind}");
            assert_eq!(verdict.message.as_deref(), Some("canceling statement"));

            let verdict = eval.evaluate(kind, &errored);
            assert_eq!(verdict.state, CheckState::Error, "{kind}");
            assert_eq!(verdict.message.as_deref(), Some("relation does not exist"));
        }
    }

    #[test]
    fn test_timeout_without_message() {
        let verdict = ResultEvaluator::default().evaluate(CheckKind::BadData, &QueryResult::timeout(None));
        assert_eq!(verdict.state, CheckState::TimedOut);
        assert_eq!(verdict.message, None);
    }

    #[test]
    fn test_generic_kinds() {
        let eval = ResultEvaluator::default();
        let cases = [
            (CheckKind::BadData, 2, CheckState::Failing),
            (CheckKind::BadData, 0, CheckState::Passing),
            (CheckKind::MissingData, 2, CheckState::Passing),
            (CheckKind::MissingData, 0, CheckState::Failing),
            (CheckKind::AlertFanout, 1, CheckState::RowsFound),
            (CheckKind::AlertFanout, 0, CheckState::NoRows),
        ];

        for (kind, rows, expected) in cases {
            let verdict = eval.evaluate(kind, &with_rows(rows));
            assert_eq!(verdict.state, expected, "{kind} with {rows} rows");
            assert_eq!(verdict.message, None);
        }
    }

    #[test]
    fn test_anomaly_verdicts() {
        let result = with_rows(3);

        let verdict = evaluator(Ok(true)).evaluate(CheckKind::Anomaly, &result);
        assert_eq!(verdict.state, CheckState::Failing);
        assert_eq!(verdict.message.as_deref(), Some("Anomaly detected in count"));

        let verdict = evaluator(Ok(false)).evaluate(CheckKind::Anomaly, &result);
        assert_eq!(verdict.state, CheckState::Passing);
        assert_eq!(verdict.message.as_deref(), Some("No anomalies detected"));
    }

    #[test]
    fn test_anomaly_no_verdict_is_error() {
        let failing = evaluator(Err(DetectorError::NotEnoughData { needed: 9, got: 3 }));
        let verdict = failing.evaluate(CheckKind::Anomaly, &with_rows(3));
        assert_eq!(verdict.state, CheckState::Error);
        assert_eq!(verdict.message.as_deref(), Some("count: Not enough data"));

        let verdict = evaluator(Ok(true)).evaluate(CheckKind::Anomaly, &with_rows(0));
        assert_eq!(verdict.state, CheckState::Error);
        assert_eq!(verdict.message.as_deref(), Some("No data"));
    }
}
