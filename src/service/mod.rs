//! Check management and result intake

pub mod checks;

pub use checks::{CheckInput, CheckService, ServiceError};
