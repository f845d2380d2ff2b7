use std::sync::Arc;

use dashmap::DashMap;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::checks::{CheckKind, CheckRecord, QueryDefinition, ValidationError};
use crate::data::QueryResult;
use crate::evaluate::{CheckEvaluator, EvaluateError, Evaluation};
use crate::store::{CheckStore, StoreError};

/// Editable fields of a check
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckInput {
    pub query_id: u64,
    #[serde(default)]
    pub creator_id: Option<u64>,
    #[serde(default)]
    pub emails: String,
    #[serde(default)]
    pub slack_channels: String,
    #[serde(default)]
    pub check_type: Option<CheckKind>,
    #[serde(default)]
    pub invert: Option<bool>,
}

impl CheckInput {
    fn apply_to(self, check: &mut CheckRecord) {
        check.query_id = self.query_id;
        check.creator_id = self.creator_id;
        check.emails = self.emails;
        check.slack_channels = self.slack_channels;
        check.check_type = self.check_type;
        check.invert = self.invert;
    }
}

/// Service errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Check not found: {0}")]
    CheckNotFound(u64),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Evaluate(#[from] EvaluateError),
}

/// Owns the store and evaluator. Evaluations and edits of one check are
/// serialized; different checks proceed in parallel.
pub struct CheckService {
    store: Arc<dyn CheckStore>,
    evaluator: CheckEvaluator,
    locks: DashMap<u64, Arc<Mutex<()>>>,
}

impl CheckService {
    pub fn new(store: Arc<dyn CheckStore>, evaluator: CheckEvaluator) -> Self {
        Self {
            store,
            evaluator,
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, id: u64) -> Arc<Mutex<()>> {
        self.locks.entry(id).or_default().clone()
    }

    /// Loads a check while its lock is held. Lock entries for unknown ids
    /// are dropped again so lookups of missing checks leave no trace.
    async fn load_locked(&self, id: u64) -> Result<CheckRecord, ServiceError> {
        match self.get_check(id).await {
            Err(ServiceError::CheckNotFound(id)) => {
                self.locks.remove(&id);
                Err(ServiceError::CheckNotFound(id))
            }
            other => other,
        }
    }

    pub async fn create_query(
        &self,
        name: impl Into<String>,
        statement: impl Into<String>,
    ) -> Result<QueryDefinition, ServiceError> {
        let query = self
            .store
            .insert_query(QueryDefinition::new(0, name, statement))
            .await?;
        tracing::info!(query_id = query.id, "Query registered");
        Ok(query)
    }

    pub async fn get_check(&self, id: u64) -> Result<CheckRecord, ServiceError> {
        self.store
            .get_check(id)
            .await?
            .ok_or(ServiceError::CheckNotFound(id))
    }

    pub async fn list_checks(&self) -> Result<Vec<CheckRecord>, ServiceError> {
        Ok(self.store.list_checks().await?)
    }

    pub async fn create_check(&self, input: CheckInput) -> Result<CheckRecord, ServiceError> {
        let mut check = CheckRecord::new(0, input.query_id);
        input.apply_to(&mut check);
        self.validate(&mut check, true).await?;

        let check = self.store.insert_check(check).await?;
        tracing::info!(check_id = check.id, query_id = check.query_id, "Check created");
        Ok(check)
    }

    pub async fn update_check(
        &self,
        id: u64,
        input: CheckInput,
    ) -> Result<CheckRecord, ServiceError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        let mut check = self.load_locked(id).await?;
        let query_changed = check.query_id != input.query_id;
        input.apply_to(&mut check);
        self.validate(&mut check, query_changed).await?;

        self.store.save_check(&check).await?;
        tracing::info!(check_id = id, query_changed, "Check updated");
        Ok(check)
    }

    pub async fn delete_check(&self, id: u64) -> Result<CheckRecord, ServiceError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        let deleted = self.store.delete_check(id).await;
        self.locks.remove(&id);
        let check = deleted?.ok_or(ServiceError::CheckNotFound(id))?;
        tracing::info!(check_id = id, "Check deleted");
        Ok(check)
    }

    /// Evaluate a result produced by an external runner
    pub async fn submit_result(
        &self,
        id: u64,
        result: &QueryResult,
    ) -> Result<(CheckRecord, Evaluation), ServiceError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        let mut check = self.load_locked(id).await?;
        let evaluation = self.evaluator.evaluate(&mut check, result).await?;
        Ok((check, evaluation))
    }

    async fn validate(
        &self,
        check: &mut CheckRecord,
        query_changed: bool,
    ) -> Result<(), ServiceError> {
        check.prepare();
        let Some(query) = self.store.get_query(check.query_id).await? else {
            return Err(ValidationError {
                errors: vec!["Query must exist".to_string()],
            }
            .into());
        };
        check.validate(&query, query_changed)?;
        Ok(())
    }
}
