//! Report notification routing

use crate::checks::{CheckKind, CheckRecord, CheckState};
use crate::data::QueryResult;
use crate::notify::StateChange;

/// Rows included in a report
pub const DEFAULT_SAMPLE_ROWS: usize = 10;

/// A report and where it goes
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPlan {
    pub change: StateChange,
    /// `None` when the check has no recipients
    pub recipients: Option<Vec<String>>,
    pub channels: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NotificationRouter {
    sample_rows: usize,
    chat_enabled: bool,
}

impl NotificationRouter {
    pub fn new(sample_rows: usize, chat_enabled: bool) -> Self {
        Self {
            sample_rows,
            chat_enabled,
        }
    }

    /// A first run that passes is not worth a report; otherwise report
    /// every change of state.
    pub fn should_notify(previous: CheckState, current: CheckState) -> bool {
        let quiet_first_pass = previous == CheckState::New && current == CheckState::Passing;
        !quiet_first_pass && previous != current
    }

    /// Build the report for an evaluated check, if one is due
    pub fn route(
        &self,
        check: &CheckRecord,
        kind: CheckKind,
        previous: CheckState,
        result: &QueryResult,
    ) -> Option<ReportPlan> {
        if !Self::should_notify(previous, check.state) {
            return None;
        }

        let change = StateChange {
            check_id: check.id,
            query_id: check.query_id,
            state: check.state,
            previous_state: previous,
            row_count: result.row_count(),
            message: check.message.clone(),
            columns: result.columns.clone(),
            sample_rows: result.sample_rows(self.sample_rows).to_vec(),
            column_types: result.column_types.clone(),
            kind,
        };

        let emails = check.split_emails();
        Some(ReportPlan {
            change,
            recipients: (!emails.is_empty()).then_some(emails),
            channels: check.split_chat_channels(self.chat_enabled),
        })
    }
}

impl Default for NotificationRouter {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_ROWS, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;

    fn rows(n: usize) -> QueryResult {
        let rows = (0..n).map(|i| vec![Value::Int64(i as i64)]).collect();
        QueryResult::new(vec!["id".into()], rows)
    }

    #[test]
    fn test_should_notify() {
        assert!(!NotificationRouter::should_notify(CheckState::New, CheckState::Passing));
        assert!(NotificationRouter::should_notify(CheckState::New, CheckState::Failing));
        assert!(NotificationRouter::should_notify(CheckState::Failing, CheckState::Passing));
        assert!(!NotificationRouter::should_notify(CheckState::Failing, CheckState::Failing));
        assert!(NotificationRouter::should_notify(CheckState::UsersNotified(2), CheckState::NoRows));
    }

    #[test]
    fn test_route_caps_samples() {
        let mut check = CheckRecord::new(1, 2).with_emails("ops@x.com");
        check.state = CheckState::Failing;
        let router = NotificationRouter::new(DEFAULT_SAMPLE_ROWS, true);

        let plan = router
            .route(&check, CheckKind::BadData, CheckState::Passing, &rows(25))
            .unwrap();
        assert_eq!(plan.change.row_count, 25);
        assert_eq!(plan.change.sample_rows.len(), 10);
        assert_eq!(plan.change.previous_state, CheckState::Passing);
        assert_eq!(plan.recipients, Some(vec!["ops@x.com".to_string()]));
        assert!(plan.channels.is_empty());
    }

    #[test]
    fn test_route_without_recipients() {
        let mut check = CheckRecord::new(1, 2).with_slack_channels("#alerts");
        check.state = CheckState::Error;
        let router = NotificationRouter::new(DEFAULT_SAMPLE_ROWS, false);

        let plan = router
            .route(&check, CheckKind::Anomaly, CheckState::Passing, &rows(0))
            .unwrap();
        assert_eq!(plan.recipients, None);
        // chat disabled
        assert!(plan.channels.is_empty());
        assert_eq!(plan.change.kind, CheckKind::Anomaly);
    }

    #[test]
    fn test_route_suppressed() {
        let mut check = CheckRecord::new(1, 2);
        check.state = CheckState::Passing;
        let router = NotificationRouter::default();
        assert!(router
            .route(&check, CheckKind::BadData, CheckState::New, &rows(0))
            .is_none());
    }
}
