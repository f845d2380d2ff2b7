//! Check evaluation: classify a result, track timeouts, fan out per-user
//! alerts or route a state change report, and save the outcome.

pub mod config;
pub mod coordinator;
pub mod evaluator;
pub mod fanout;
pub mod router;
pub mod timeout;

pub use config::EvaluatorConfig;
pub use coordinator::{CheckEvaluator, EvaluateError, Evaluation, Sinks};
pub use evaluator::{ResultEvaluator, Verdict};
pub use fanout::{AlertAggregator, FanoutOutcome, LAST_RUN_PARAM, USER_COLUMN};
pub use router::{NotificationRouter, ReportPlan, DEFAULT_SAMPLE_ROWS};
pub use timeout::{TimeoutTracker, DEFAULT_TIMEOUT_THRESHOLD};
