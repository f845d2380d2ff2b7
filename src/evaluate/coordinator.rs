//! Check evaluation cycle

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::config::EvaluatorConfig;
use super::evaluator::ResultEvaluator;
use super::fanout::AlertAggregator;
use super::router::NotificationRouter;
use super::timeout::TimeoutTracker;
use crate::checks::{CheckRecord, CheckState};
use crate::data::{AnomalyDetector, QueryResult};
use crate::notify::{ChatSink, Dispatch, EmailSink, EventPublisher, SinkError};
use crate::store::{CheckStore, StoreError};

/// Outbound notification sinks
#[derive(Clone)]
pub struct Sinks {
    pub email: Arc<dyn EmailSink>,
    pub chat: Arc<dyn ChatSink>,
    pub events: Arc<dyn EventPublisher>,
}

impl Sinks {
    /// Use one value for all three sinks
    pub fn shared<S>(sink: S) -> Self
    where
        S: EmailSink + ChatSink + EventPublisher + 'static,
    {
        let sink = Arc::new(sink);
        Self {
            email: sink.clone(),
            chat: sink.clone(),
            events: sink,
        }
    }
}

/// What one evaluation did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub previous_state: CheckState,
    pub state: CheckState,
    /// Whether the check was saved
    pub changed: bool,
    pub notified_users: usize,
    /// Sink calls in the order they were made
    pub dispatches: Vec<Dispatch>,
}

/// Evaluation errors
#[derive(Debug, thiserror::Error)]
pub enum EvaluateError {
    #[error("Failed to save check: {0}")]
    Store(#[from] StoreError),

    #[error("Notification failures: {0:?}")]
    Notify(Vec<SinkError>),
}

/// Applies query results to checks: classify, track timeouts, fan out or
/// report, then save when anything observable changed.
///
/// Callers must not evaluate the same check concurrently.
pub struct CheckEvaluator {
    store: Arc<dyn CheckStore>,
    sinks: Sinks,
    evaluator: ResultEvaluator,
    timeouts: TimeoutTracker,
    router: NotificationRouter,
}

impl CheckEvaluator {
    pub fn new(config: EvaluatorConfig, store: Arc<dyn CheckStore>, sinks: Sinks) -> Self {
        Self {
            store,
            sinks,
            evaluator: ResultEvaluator::default(),
            timeouts: TimeoutTracker::new(config.timeout_threshold),
            router: NotificationRouter::new(config.sample_rows, config.chat_enabled),
        }
    }

    pub fn with_detector(mut self, detector: Arc<dyn AnomalyDetector>) -> Self {
        self.evaluator = ResultEvaluator::new(detector);
        self
    }

    /// Evaluate with the current time as the finish time
    pub async fn evaluate(
        &self,
        check: &mut CheckRecord,
        result: &QueryResult,
    ) -> Result<Evaluation, EvaluateError> {
        self.evaluate_at(check, result, Utc::now()).await
    }

    /// Evaluate `result` into `check`.
    ///
    /// `finished_at` is used for the run timestamp, the fanout parameter and
    /// every event of this cycle. The check is saved before any sink is
    /// called, so a failing sink cannot lose the new state; sink failures
    /// are returned after every planned call was attempted.
    pub async fn evaluate_at(
        &self,
        check: &mut CheckRecord,
        result: &QueryResult,
        finished_at: DateTime<Utc>,
    ) -> Result<Evaluation, EvaluateError> {
        let before = check.snapshot();
        let previous_state = check.state;
        let kind = check.resolve_kind();

        let verdict = self.evaluator.evaluate(kind, result);
        let (timeouts, state) = self
            .timeouts
            .apply(check.timeouts, result.timed_out, verdict.state);
        check.state = state;
        check.message = verdict.message;
        check.timeouts = timeouts;
        check.last_run_at = Some(finished_at);

        let mut plan = Vec::new();
        let mut notified_users = 0;

        if AlertAggregator::applies(kind, check.state) {
            let outcome = AlertAggregator::aggregate(check, result, finished_at);
            check.state = outcome.state;
            notified_users = outcome.events.len();
            plan.extend(outcome.events.into_iter().map(|event| Dispatch::Event { event }));
        } else if let Some(report) = self.router.route(check, kind, previous_state, result) {
            if let Some(recipients) = report.recipients {
                plan.push(Dispatch::Email {
                    recipients,
                    change: report.change.clone(),
                });
            }
            plan.push(Dispatch::Chat {
                channels: report.channels,
                notice: report.change.chat_notice(),
            });
        }

        let changed = check.snapshot() != before;
        if changed {
            self.store.save_check(check).await?;
            tracing::info!(
                check_id = check.id,
                kind = %kind,
                previous = %previous_state,
                state = %check.state,
                "Check updated"
            );
        } else {
            tracing::debug!(check_id = check.id, state = %check.state, "Check unchanged");
        }

        let errors = self.dispatch(check.id, &plan).await;

        let evaluation = Evaluation {
            previous_state,
            state: check.state,
            changed,
            notified_users,
            dispatches: plan,
        };

        if errors.is_empty() {
            Ok(evaluation)
        } else {
            Err(EvaluateError::Notify(errors))
        }
    }

    /// Call every sink in plan order, collecting failures
    async fn dispatch(&self, check_id: u64, plan: &[Dispatch]) -> Vec<SinkError> {
        let mut errors = Vec::new();

        for call in plan {
            let sent = match call {
                Dispatch::Email { recipients, change } => {
                    self.sinks.email.send_state_change(recipients, change).await
                }
                Dispatch::Chat { channels, notice } => {
                    self.sinks.chat.send_state_change(channels, notice).await
                }
                Dispatch::Event { event } => self.sinks.events.publish(event).await,
            };

            if let Err(e) = sent {
                tracing::error!(
                    check_id = check_id,
                    error = %e,
                    "Failed to send notification"
                );
                errors.push(e);
            }
        }

        errors
    }
}
