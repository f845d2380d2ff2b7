//! Per-user alert fanout

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::checks::{CheckKind, CheckRecord, CheckState};
use crate::data::{QueryResult, Value};
use crate::notify::{UserAlertEvent, TRIGGER_USER_ALERT};

/// Column identifying the user a row alerts
pub const USER_COLUMN: &str = "user_uuid";

/// Parameter key holding the last fanout time
pub const LAST_RUN_PARAM: &str = "last_run_at";

/// Events to publish and the state to record
#[derive(Debug, Clone, PartialEq)]
pub struct FanoutOutcome {
    pub state: CheckState,
    pub events: Vec<UserAlertEvent>,
}

/// Turns rows of an alert fanout check into one event per distinct user
pub struct AlertAggregator;

impl AlertAggregator {
    /// Only fanout checks that found rows are aggregated; every other
    /// state goes through report routing.
    pub fn applies(kind: CheckKind, state: CheckState) -> bool {
        kind == CheckKind::AlertFanout && state == CheckState::RowsFound
    }

    /// Stamp `finished_at` into the check params and build events in
    /// first-occurrence order of each user. Rows for an already seen user
    /// are skipped. A row without a user column counts as a null user.
    pub fn aggregate(
        check: &mut CheckRecord,
        result: &QueryResult,
        finished_at: DateTime<Utc>,
    ) -> FanoutOutcome {
        check.check_params.insert(
            LAST_RUN_PARAM.to_string(),
            serde_json::Value::String(finished_at.to_rfc3339()),
        );

        let mut seen: HashSet<Value> = HashSet::new();
        let mut events = Vec::new();

        for row in &result.rows {
            let fields = result.row_map(row);
            let user = fields.get(USER_COLUMN).cloned().unwrap_or(Value::Null);

            if !seen.insert(user.clone()) {
                continue;
            }

            events.push(UserAlertEvent {
                utc_time: finished_at,
                action: TRIGGER_USER_ALERT.to_string(),
                user_uuid: user,
                event_object: check.object_ref(),
                event_object_data: fields,
            });
        }

        tracing::debug!(
            check_id = check.id,
            rows = result.row_count(),
            users = events.len(),
            "Aggregated alert rows"
        );

        FanoutOutcome {
            state: CheckState::UsersNotified(events.len()),
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert_rows(users: &[&str]) -> QueryResult {
        let rows = users
            .iter()
            .enumerate()
            .map(|(i, u)| vec![Value::Int64(i as i64), Value::from(*u)])
            .collect();
        QueryResult::new(vec!["order_id".into(), USER_COLUMN.into()], rows)
    }

    fn finished() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-10T08:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_applies() {
        assert!(AlertAggregator::applies(CheckKind::AlertFanout, CheckState::RowsFound));
        assert!(!AlertAggregator::applies(CheckKind::AlertFanout, CheckState::NoRows));
        assert!(!AlertAggregator::applies(CheckKind::AlertFanout, CheckState::Disabled));
        assert!(!AlertAggregator::applies(CheckKind::BadData, CheckState::RowsFound));
    }

    #[test]
    fn test_dedup_first_occurrence() {
        let mut check = CheckRecord::new(5, 1).with_kind(CheckKind::AlertFanout);
        let outcome = AlertAggregator::aggregate(&mut check, &alert_rows(&["A", "A", "B"]), finished());

        assert_eq!(outcome.state, CheckState::UsersNotified(2));
        let users: Vec<Value> = outcome.events.iter().map(|e| e.user_uuid.clone()).collect();
        assert_eq!(users, vec![Value::from("A"), Value::from("B")]);

        // first A row wins
        assert_eq!(outcome.events[0].event_object_data["order_id"], Value::Int64(0));
        assert_eq!(outcome.events[1].event_object_data["order_id"], Value::Int64(2));
        assert!(outcome.events.iter().all(|e| e.utc_time == finished()));
        assert!(outcome.events.iter().all(|e| e.event_object == "Check/5"));
        assert!(outcome.events.iter().all(|e| e.action == TRIGGER_USER_ALERT));
    }

    #[test]
    fn test_stamps_last_run() {
        let mut check = CheckRecord::new(5, 1).with_kind(CheckKind::AlertFanout);
        AlertAggregator::aggregate(&mut check, &alert_rows(&["A"]), finished());
        assert_eq!(
            check.check_params[LAST_RUN_PARAM],
            serde_json::json!(finished().to_rfc3339())
        );
    }

    #[test]
    fn test_missing_user_column() {
        let mut check = CheckRecord::new(5, 1).with_kind(CheckKind::AlertFanout);
        let result = QueryResult::new(
            vec!["order_id".into()],
            vec![vec![Value::Int64(1)], vec![Value::Int64(2)]],
        );
        let outcome = AlertAggregator::aggregate(&mut check, &result, finished());
        assert_eq!(outcome.events.len(), 1);
        assert!(outcome.events[0].user_uuid.is_null());
    }
}
