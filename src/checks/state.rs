//! Check health states

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Health state of a check, serialised as its label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CheckState {
    /// Never evaluated
    #[default]
    New,
    Passing,
    Failing,
    Error,
    TimedOut,
    /// Reached after too many consecutive timeouts
    Disabled,
    /// Alert fanout check found nothing
    NoRows,
    /// Alert fanout check found rows, before users were counted
    RowsFound,
    /// Alert fanout check notified this many distinct users
    UsersNotified(usize),
}

impl CheckState {
    /// Label with words capitalised, for notification subjects
    pub fn titleize(&self) -> String {
        self.to_string()
            .split(|c: char| c == ' ' || c == '_')
            .filter(|w| !w.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckState::New => write!(f, "new"),
            CheckState::Passing => write!(f, "passing"),
            CheckState::Failing => write!(f, "failing"),
            CheckState::Error => write!(f, "error"),
            CheckState::TimedOut => write!(f, "timed out"),
            CheckState::Disabled => write!(f, "disabled"),
            CheckState::NoRows => write!(f, "none"),
            CheckState::RowsFound => write!(f, "rows_found"),
            CheckState::UsersNotified(n) => write!(f, "{}_rows_found", n),
        }
    }
}

/// Unrecognised state label
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown check state: {0}")]
pub struct UnknownState(pub String);

impl FromStr for CheckState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(CheckState::New),
            "passing" => Ok(CheckState::Passing),
            "failing" => Ok(CheckState::Failing),
            "error" => Ok(CheckState::Error),
            "timed out" => Ok(CheckState::TimedOut),
            "disabled" => Ok(CheckState::Disabled),
            "none" => Ok(CheckState::NoRows),
            "rows_found" => Ok(CheckState::RowsFound),
            other => other
                .strip_suffix("_rows_found")
                .and_then(|n| n.parse().ok())
                .map(CheckState::UsersNotified)
                .ok_or_else(|| UnknownState(other.to_string())),
        }
    }
}

impl From<CheckState> for String {
    fn from(state: CheckState) -> Self {
        state.to_string()
    }
}

impl TryFrom<String> for CheckState {
    type Error = UnknownState;

    fn try_from(s: String) -> Result<Self, UnknownState> {
        s.parse()
    }
}
