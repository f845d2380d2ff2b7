use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_check, create_query, delete_check, get_check, health_check, list_checks,
    submit_result, update_check, AppState,
};
use crate::evaluate::{CheckEvaluator, EvaluatorConfig, Sinks};
use crate::notify::{EventPublisher, LogEventPublisher, LogMailer, SlackNotifier, WebhookEventPublisher};
use crate::service::CheckService;
use crate::store::{CheckStore, MemoryStore};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub notify: NotifyConfig,
    pub evaluator: EvaluatorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            notify: NotifyConfig::default(),
            evaluator: EvaluatorConfig::default(),
        }
    }
}

/// Notification endpoints
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Slack incoming webhook; chat is disabled without it
    pub slack_webhook_url: Option<String>,
    /// Endpoint receiving per-user alert events; logged when unset
    pub event_webhook_url: Option<String>,
    /// Base URL used for links in notifications
    pub base_url: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            slack_webhook_url: None,
            event_webhook_url: None,
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl NotifyConfig {
    pub fn chat_enabled(&self) -> bool {
        self.slack_webhook_url.is_some()
    }

    /// Build the sinks these endpoints describe
    pub fn sinks(&self) -> Sinks {
        let events: Arc<dyn EventPublisher> = match &self.event_webhook_url {
            Some(url) => Arc::new(WebhookEventPublisher::new(url.clone())),
            None => Arc::new(LogEventPublisher),
        };

        Sinks {
            email: Arc::new(LogMailer::new()),
            chat: Arc::new(SlackNotifier::new(
                self.slack_webhook_url.clone(),
                self.base_url.clone(),
            )),
            events,
        }
    }
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/queries", post(create_query))
        .route("/checks", get(list_checks).post(create_check))
        .route(
            "/checks/:id",
            get(get_check).put(update_check).delete(delete_check),
        )
        .route("/checks/:id/results", post(submit_result))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Wire the store, sinks and evaluator into a service
pub fn build_service(config: &ServerConfig) -> CheckService {
    let store: Arc<dyn CheckStore> = Arc::new(MemoryStore::new());
    let evaluator_config = config
        .evaluator
        .clone()
        .with_chat(config.notify.chat_enabled());
    let evaluator = CheckEvaluator::new(evaluator_config, store.clone(), config.notify.sinks());
    CheckService::new(store, evaluator)
}

/// Run the HTTP server
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState {
        service: Arc::new(build_service(&config)),
    });

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Starting checkwatch server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("checkwatch server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
