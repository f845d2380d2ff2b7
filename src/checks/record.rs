//! Check records

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::query::QueryDefinition;
use super::state::CheckState;

/// Parameter bag carried by a check
pub type CheckParams = serde_json::Map<String, serde_json::Value>;

/// Evaluation semantics of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Rows present is the bad case
    BadData,
    /// Rows absent is the bad case
    MissingData,
    /// Rows are a time series checked for anomalies
    Anomaly,
    /// Each row is a per-user alert to fan out
    AlertFanout,
}

impl CheckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::BadData => "bad_data",
            CheckKind::MissingData => "missing_data",
            CheckKind::Anomaly => "anomaly",
            CheckKind::AlertFanout => "alert_fanout",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A monitored query with alerting configuration and current health state.
///
/// `check_type`, `invert` and `timeouts` are optional capabilities: older
/// records carry only `invert`, some carry neither, and only records with
/// `timeouts` take part in timeout tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub id: u64,
    pub query_id: u64,
    #[serde(default)]
    pub creator_id: Option<u64>,
    /// Comma-separated recipient addresses
    #[serde(default)]
    pub emails: String,
    /// Comma-separated chat channels
    #[serde(default)]
    pub slack_channels: String,
    #[serde(default)]
    pub check_type: Option<CheckKind>,
    #[serde(default)]
    pub invert: Option<bool>,
    #[serde(default)]
    pub state: CheckState,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub last_run_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub timeouts: Option<u32>,
    #[serde(default)]
    pub check_params: CheckParams,
}

/// Fields whose change warrants a save
#[derive(Debug, Clone, PartialEq)]
pub struct CheckSnapshot {
    pub state: CheckState,
    pub message: Option<String>,
    pub timeouts: Option<u32>,
    pub check_params: CheckParams,
}

impl CheckRecord {
    /// Create a check in the `new` state with a zeroed timeout counter
    pub fn new(id: u64, query_id: u64) -> Self {
        Self {
            id,
            query_id,
            creator_id: None,
            emails: String::new(),
            slack_channels: String::new(),
            check_type: None,
            invert: None,
            state: CheckState::New,
            message: None,
            last_run_at: None,
            timeouts: Some(0),
            check_params: CheckParams::new(),
        }
    }

    pub fn with_kind(mut self, kind: CheckKind) -> Self {
        self.check_type = Some(kind);
        self
    }

    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = Some(invert);
        self
    }

    pub fn with_emails(mut self, emails: impl Into<String>) -> Self {
        self.emails = emails.into();
        self
    }

    pub fn with_slack_channels(mut self, channels: impl Into<String>) -> Self {
        self.slack_channels = channels.into();
        self
    }

    /// Drop timeout tracking for this record
    pub fn without_timeouts(mut self) -> Self {
        self.timeouts = None;
        self
    }

    /// Normalize the kind: an explicit kind wins, then the legacy invert
    /// flag, then bad-data semantics.
    pub fn resolve_kind(&self) -> CheckKind {
        match (self.check_type, self.invert) {
            (Some(kind), _) => kind,
            (None, Some(true)) => CheckKind::MissingData,
            (None, Some(false)) | (None, None) => CheckKind::BadData,
        }
    }

    /// Type name and id, used as the event object reference
    pub fn object_ref(&self) -> String {
        format!("Check/{}", self.id)
    }

    pub fn snapshot(&self) -> CheckSnapshot {
        CheckSnapshot {
            state: self.state,
            message: self.message.clone(),
            timeouts: self.timeouts,
            check_params: self.check_params.clone(),
        }
    }

    /// Normalize user input before validation
    pub fn prepare(&mut self) {
        self.emails = normalize_emails(&self.emails);
    }

    pub fn split_emails(&self) -> Vec<String> {
        split_list(&self.emails)
    }

    /// Chat channels, empty when chat integration is off
    pub fn split_chat_channels(&self, chat_enabled: bool) -> Vec<String> {
        if chat_enabled {
            split_list(&self.slack_channels)
        } else {
            Vec::new()
        }
    }

    /// Validate the record against its query. Variable checks only run
    /// when the query reference changed.
    pub fn validate(
        &self,
        query: &QueryDefinition,
        query_changed: bool,
    ) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        if !self.split_emails().iter().all(|e| is_valid_email(e)) {
            errors.push("Invalid emails".to_string());
        }

        if query_changed
            && query.has_variables()
            && self.resolve_kind() != CheckKind::AlertFanout
        {
            errors.push("Query can't have variables".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { errors })
        }
    }
}

/// Aggregate validation failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Validation failed: {}", .errors.join(", "))]
pub struct ValidationError {
    pub errors: Vec<String>,
}

/// Turn `;` and whitespace separators into `, ` and lower-case the list
pub fn normalize_emails(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    trimmed
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join(", ")
}

fn split_list(raw: &str) -> Vec<String> {
    raw.to_lowercase()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern is valid"));

fn is_valid_email(address: &str) -> bool {
    EMAIL_RE.is_match(address)
}
