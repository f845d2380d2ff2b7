//! Evaluation settings

use serde::{Deserialize, Serialize};

use super::router::DEFAULT_SAMPLE_ROWS;
use super::timeout::DEFAULT_TIMEOUT_THRESHOLD;

/// Settings injected into the coordinator at construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Whether chat channels are resolved for reports
    pub chat_enabled: bool,
    /// Consecutive timeouts before a check is disabled
    pub timeout_threshold: u32,
    /// Rows included in a report
    pub sample_rows: usize,
}

impl EvaluatorConfig {
    pub fn with_chat(mut self, enabled: bool) -> Self {
        self.chat_enabled = enabled;
        self
    }

    /// Parses a timeout threshold setting. Only positive integers are accepted.
    pub fn parse_timeout_threshold(raw: &str) -> Option<u32> {
        raw.trim().parse().ok().filter(|threshold: &u32| *threshold > 0)
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            chat_enabled: false,
            timeout_threshold: DEFAULT_TIMEOUT_THRESHOLD,
            sample_rows: DEFAULT_SAMPLE_ROWS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timeout_threshold() {
        assert_eq!(EvaluatorConfig::parse_timeout_threshold("5"), Some(5));
        assert_eq!(EvaluatorConfig::parse_timeout_threshold(" 1 "), Some(1));
        assert_eq!(EvaluatorConfig::parse_timeout_threshold("0"), None);
        assert_eq!(EvaluatorConfig::parse_timeout_threshold("-2"), None);
        assert_eq!(EvaluatorConfig::parse_timeout_threshold("three"), None);
    }
}
