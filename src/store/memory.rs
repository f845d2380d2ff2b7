//! In-memory store

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{CheckStore, StoreError};
use crate::checks::{CheckRecord, QueryDefinition};

/// Store backed by hash maps, with a save counter for tests
pub struct MemoryStore {
    checks: RwLock<HashMap<u64, CheckRecord>>,
    queries: RwLock<HashMap<u64, QueryDefinition>>,
    next_check_id: AtomicU64,
    next_query_id: AtomicU64,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            checks: RwLock::new(HashMap::new()),
            queries: RwLock::new(HashMap::new()),
            next_check_id: AtomicU64::new(1),
            next_query_id: AtomicU64::new(1),
            saves: AtomicUsize::new(0),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Number of `save_check` calls that reached the store
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    /// Make subsequent saves fail
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::Relaxed);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CheckStore for MemoryStore {
    async fn get_check(&self, id: u64) -> Result<Option<CheckRecord>, StoreError> {
        Ok(self.checks.read().get(&id).cloned())
    }

    async fn list_checks(&self) -> Result<Vec<CheckRecord>, StoreError> {
        let mut checks: Vec<CheckRecord> = self.checks.read().values().cloned().collect();
        checks.sort_by_key(|c| c.id);
        Ok(checks)
    }

    async fn insert_check(&self, mut check: CheckRecord) -> Result<CheckRecord, StoreError> {
        check.id = self.next_check_id.fetch_add(1, Ordering::Relaxed);
        self.checks.write().insert(check.id, check.clone());
        Ok(check)
    }

    async fn save_check(&self, check: &CheckRecord) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::Relaxed);
        if self.fail_saves.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }

        let mut checks = self.checks.write();
        match checks.get_mut(&check.id) {
            Some(existing) => {
                *existing = check.clone();
                Ok(())
            }
            None => Err(StoreError::CheckNotFound(check.id)),
        }
    }

    async fn delete_check(&self, id: u64) -> Result<Option<CheckRecord>, StoreError> {
        Ok(self.checks.write().remove(&id))
    }

    async fn get_query(&self, id: u64) -> Result<Option<QueryDefinition>, StoreError> {
        Ok(self.queries.read().get(&id).cloned())
    }

    async fn insert_query(
        &self,
        mut query: QueryDefinition,
    ) -> Result<QueryDefinition, StoreError> {
        query.id = self.next_query_id.fetch_add(1, Ordering::Relaxed);
        self.queries.write().insert(query.id, query.clone());
        Ok(query)
    }
}
