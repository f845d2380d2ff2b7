//! Checkwatch: Query Check Evaluation
//!
//! Applies the result of a periodically executed query to a check, decides
//! whether the check's health changed, saves the new state and fires
//! deduplicated notifications.
//!
//! # Features
//!
//! - **Check kinds**: bad data, missing data, anomaly and per-user alert fanout
//! - **Timeout tracking**: checks are disabled after consecutive timeouts
//! - **Report routing**: email and chat reports on meaningful state changes
//! - **Alert fanout**: one event per distinct user found by the query
//! - **Change detection**: checks are only saved when something changed
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use checkwatch::checks::CheckRecord;
//! use checkwatch::data::{QueryResult, Value};
//! use checkwatch::evaluate::{CheckEvaluator, EvaluatorConfig, Sinks};
//! use checkwatch::notify::RecordingSink;
//! use checkwatch::store::{CheckStore, MemoryStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let sink = RecordingSink::new();
//! let evaluator = CheckEvaluator::new(
//!     EvaluatorConfig::default(),
//!     store.clone(),
//!     Sinks::shared(sink.clone()),
//! );
//!
//! let mut check = store.insert_check(CheckRecord::new(0, 1)).await?;
//! let result = QueryResult::new(vec!["id".into()], vec![vec![Value::Int64(1)]]);
//! let evaluation = evaluator.evaluate(&mut check, &result).await?;
//! println!("{} -> {}", evaluation.previous_state, evaluation.state);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod checks;
pub mod data;
pub mod evaluate;
pub mod notify;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use checks::{CheckKind, CheckRecord, CheckState};
pub use data::{QueryResult, Value};
pub use evaluate::{CheckEvaluator, EvaluateError, Evaluation};
