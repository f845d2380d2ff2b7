//! Series anomaly detectors

/// Decides whether the most recent point of a series is anomalous
pub trait AnomalyDetector: Send + Sync {
    /// Detector name, used in logs
    fn name(&self) -> &str;

    /// Inspect a series ordered oldest to newest
    fn is_anomaly(&self, series: &[f64]) -> Result<bool, DetectorError>;
}

/// Detector failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DetectorError {
    #[error("Not enough data")]
    NotEnoughData { needed: usize, got: usize },

    #[error("Non-finite value in series")]
    NonFinite,
}

/// Flags the last point when its z-score against the preceding history
/// exceeds `threshold`.
#[derive(Debug, Clone)]
pub struct ZScoreDetector {
    pub threshold: f64,
    pub min_history: usize,
}

impl ZScoreDetector {
    pub fn new(threshold: f64, min_history: usize) -> Self {
        Self {
            threshold,
            min_history,
        }
    }
}

impl Default for ZScoreDetector {
    fn default() -> Self {
        Self::new(3.0, 8)
    }
}

impl AnomalyDetector for ZScoreDetector {
    fn name(&self) -> &str {
        "zscore"
    }

    fn is_anomaly(&self, series: &[f64]) -> Result<bool, DetectorError> {
        if series.iter().any(|v| !v.is_finite()) {
            return Err(DetectorError::NonFinite);
        }

        let Some((last, history)) = series.split_last() else {
            return Err(DetectorError::NotEnoughData {
                needed: self.min_history + 1,
                got: 0,
            });
        };
        if history.len() < self.min_history.max(1) {
            return Err(DetectorError::NotEnoughData {
                needed: self.min_history.max(1) + 1,
                got: series.len(),
            });
        }

        let n = history.len() as f64;
        let mean = history.iter().sum::<f64>() / n;
        let variance = history.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let stddev = variance.sqrt();

        if stddev == 0.0 {
            return Ok((*last - mean).abs() > f64::EPSILON);
        }

        Ok(((*last - mean) / stddev).abs() > self.threshold)
    }
}
