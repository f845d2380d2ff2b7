//! Check and query persistence

pub mod memory;

use async_trait::async_trait;

use crate::checks::{CheckRecord, QueryDefinition};

pub use memory::MemoryStore;

/// Storage for checks and the queries they reference
#[async_trait]
pub trait CheckStore: Send + Sync {
    async fn get_check(&self, id: u64) -> Result<Option<CheckRecord>, StoreError>;

    async fn list_checks(&self) -> Result<Vec<CheckRecord>, StoreError>;

    /// Insert a new check, assigning its id
    async fn insert_check(&self, check: CheckRecord) -> Result<CheckRecord, StoreError>;

    /// Overwrite an existing check
    async fn save_check(&self, check: &CheckRecord) -> Result<(), StoreError>;

    async fn delete_check(&self, id: u64) -> Result<Option<CheckRecord>, StoreError>;

    async fn get_query(&self, id: u64) -> Result<Option<QueryDefinition>, StoreError>;

    /// Insert a new query, assigning its id
    async fn insert_query(&self, query: QueryDefinition) -> Result<QueryDefinition, StoreError>;
}

/// Storage errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Check not found: {0}")]
    CheckNotFound(u64),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
