//! Check records, health states and save-time validation

pub mod query;
pub mod record;
pub mod state;

pub use query::QueryDefinition;
pub use record::{
    normalize_emails, CheckKind, CheckParams, CheckRecord, CheckSnapshot, ValidationError,
};
pub use state::{CheckState, UnknownState};
