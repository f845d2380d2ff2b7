use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::checks::{CheckRecord, QueryDefinition};
use crate::data::QueryResult;
use crate::evaluate::{EvaluateError, Evaluation};
use crate::service::{CheckInput, CheckService, ServiceError};

/// Application state shared across handlers
pub struct AppState {
    pub service: Arc<CheckService>,
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Queries
// ============================================================================

#[derive(Deserialize)]
pub struct CreateQueryRequest {
    pub name: String,
    pub statement: String,
}

#[derive(Serialize)]
pub struct QueryResponse {
    #[serde(flatten)]
    pub query: QueryDefinition,
    pub variables: Vec<String>,
}

pub async fn create_query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateQueryRequest>,
) -> Result<(StatusCode, Json<QueryResponse>), ApiError> {
    let query = state
        .service
        .create_query(request.name, request.statement)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(QueryResponse {
            variables: query.variables(),
            query,
        }),
    ))
}

// ============================================================================
// Checks
// ============================================================================

#[derive(Serialize)]
pub struct ChecksResponse {
    pub checks: Vec<CheckRecord>,
}

pub async fn list_checks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChecksResponse>, ApiError> {
    let checks = state.service.list_checks().await?;
    Ok(Json(ChecksResponse { checks }))
}

pub async fn get_check(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<CheckRecord>, ApiError> {
    Ok(Json(state.service.get_check(id).await?))
}

pub async fn create_check(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CheckInput>,
) -> Result<(StatusCode, Json<CheckRecord>), ApiError> {
    let check = state.service.create_check(input).await?;
    Ok((StatusCode::CREATED, Json(check)))
}

pub async fn update_check(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(input): Json<CheckInput>,
) -> Result<Json<CheckRecord>, ApiError> {
    Ok(Json(state.service.update_check(id, input).await?))
}

pub async fn delete_check(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let check = state.service.delete_check(id).await?;
    Ok(Json(serde_json::json!({ "deleted": check.id })))
}

// ============================================================================
// Results
// ============================================================================

#[derive(Serialize)]
pub struct EvaluationResponse {
    pub check: CheckRecord,
    pub evaluation: Evaluation,
}

pub async fn submit_result(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(result): Json<QueryResult>,
) -> Result<Json<EvaluationResponse>, ApiError> {
    let (check, evaluation) = state.service.submit_result(id, &result).await?;
    Ok(Json(EvaluationResponse { check, evaluation }))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Validation(Vec<String>),
    Upstream(String),
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::CheckNotFound(id) => ApiError::NotFound(format!("Check {} not found", id)),
            ServiceError::Validation(e) => ApiError::Validation(e.errors),
            ServiceError::Evaluate(e @ EvaluateError::Notify(_)) => ApiError::Upstream(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, serde_json::json!({ "error": msg })),
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!({ "error": "Validation failed", "errors": errors }),
            ),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, serde_json::json!({ "error": msg })),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": msg }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
