//! Notification payloads

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checks::{CheckKind, CheckState};
use crate::data::{DataType, Value};

/// Action identifier carried by per-user alert events
pub const TRIGGER_USER_ALERT: &str = "trigger_user_alert_notification";

/// Report sent when a check changes state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub check_id: u64,
    pub query_id: u64,
    pub state: CheckState,
    pub previous_state: CheckState,
    pub row_count: usize,
    pub message: Option<String>,
    pub columns: Vec<String>,
    pub sample_rows: Vec<Vec<Value>>,
    pub column_types: Vec<DataType>,
    pub kind: CheckKind,
}

impl StateChange {
    /// The subset of the report delivered to chat
    pub fn chat_notice(&self) -> ChatNotice {
        ChatNotice {
            check_id: self.check_id,
            query_id: self.query_id,
            state: self.state,
            previous_state: self.previous_state,
            row_count: self.row_count,
            message: self.message.clone(),
            kind: self.kind,
        }
    }

    pub fn subject(&self) -> String {
        format!("Check {}: Query #{}", self.state.titleize(), self.query_id)
    }
}

/// State change summary for chat channels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatNotice {
    pub check_id: u64,
    pub query_id: u64,
    pub state: CheckState,
    pub previous_state: CheckState,
    pub row_count: usize,
    pub message: Option<String>,
    pub kind: CheckKind,
}

impl ChatNotice {
    /// Line shown under the title: the message, else the row count
    pub fn summary(&self) -> String {
        match &self.message {
            Some(message) if !message.is_empty() => message.clone(),
            _ if self.row_count == 1 => "1 row".to_string(),
            _ => format!("{} rows", self.row_count),
        }
    }
}

/// Event published once per distinct user of an alert fanout check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAlertEvent {
    pub utc_time: DateTime<Utc>,
    pub action: String,
    pub user_uuid: Value,
    /// Record type and id, e.g. `Check/12`
    pub event_object: String,
    pub event_object_data: BTreeMap<String, Value>,
}

/// One sink invocation made during an evaluation, in call order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "sink", rename_all = "snake_case")]
pub enum Dispatch {
    Email {
        recipients: Vec<String>,
        change: StateChange,
    },
    Chat {
        channels: Vec<String>,
        notice: ChatNotice,
    },
    Event {
        event: UserAlertEvent,
    },
}
