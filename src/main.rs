//! Checkwatch Server
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - CHECKWATCH_HOST: Bind address (default: 0.0.0.0)
//! - CHECKWATCH_PORT: Port number (default: 8080)
//! - CHECKWATCH_SLACK_WEBHOOK_URL: Slack incoming webhook; chat is off when unset
//! - CHECKWATCH_EVENT_WEBHOOK_URL: Endpoint for per-user alert events; logged when unset
//! - CHECKWATCH_BASE_URL: Base URL for links in notifications (default: http://localhost:8080)
//! - CHECKWATCH_TIMEOUT_THRESHOLD: Consecutive timeouts before a check is disabled (default: 3)
//! - RUST_LOG: Log level (default: info)

use checkwatch::api::{run_server, NotifyConfig, ServerConfig};
use checkwatch::evaluate::EvaluatorConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn env_url(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "checkwatch=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let host = std::env::var("CHECKWATCH_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("CHECKWATCH_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let notify = NotifyConfig {
        slack_webhook_url: env_url("CHECKWATCH_SLACK_WEBHOOK_URL"),
        event_webhook_url: env_url("CHECKWATCH_EVENT_WEBHOOK_URL"),
        base_url: env_url("CHECKWATCH_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port)),
    };

    let mut evaluator = EvaluatorConfig::default();
    if let Ok(raw) = std::env::var("CHECKWATCH_TIMEOUT_THRESHOLD") {
        match EvaluatorConfig::parse_timeout_threshold(&raw) {
            Some(threshold) => evaluator.timeout_threshold = threshold,
            None => tracing::warn!(
                value = %raw,
                default = evaluator.timeout_threshold,
                "Ignoring CHECKWATCH_TIMEOUT_THRESHOLD, expected a positive integer"
            ),
        }
    }

    let config = ServerConfig {
        host,
        port,
        notify,
        evaluator,
    };

    tracing::info!("Checkwatch configuration:");
    tracing::info!("  Host: {}:{}", config.host, config.port);
    tracing::info!(
        "  Chat notifications: {}",
        if config.notify.chat_enabled() { "enabled" } else { "disabled" }
    );
    tracing::info!(
        "  Event delivery: {}",
        config.notify.event_webhook_url.as_deref().unwrap_or("log")
    );
    tracing::info!(
        "  Disable after {} consecutive timeouts",
        config.evaluator.timeout_threshold
    );

    run_server(config).await
}
