//! Event publishers for per-user alerts

use async_trait::async_trait;

use super::payload::UserAlertEvent;
use super::sink::{EventPublisher, SinkError};

/// POSTs each event as JSON to a fixed endpoint
pub struct WebhookEventPublisher {
    client: reqwest::Client,
    url: String,
}

impl WebhookEventPublisher {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl EventPublisher for WebhookEventPublisher {
    async fn publish(&self, event: &UserAlertEvent) -> Result<(), SinkError> {
        let response = self
            .client
            .post(self.url.as_str())
            .json(event)
            .send()
            .await
            .map_err(|e| SinkError::Event(format!("Failed to publish event: {}", e)))?;

        if !response.status().is_success() {
            return Err(SinkError::Event(format!(
                "Event endpoint returned status {}",
                response.status()
            )));
        }

        tracing::debug!(
            event_object = %event.event_object,
            user_uuid = %event.user_uuid,
            "User alert event published"
        );
        Ok(())
    }
}

/// Writes events to the log
#[derive(Debug, Clone, Default)]
pub struct LogEventPublisher;

#[async_trait]
impl EventPublisher for LogEventPublisher {
    async fn publish(&self, event: &UserAlertEvent) -> Result<(), SinkError> {
        tracing::info!(
            action = %event.action,
            event_object = %event.event_object,
            user_uuid = %event.user_uuid,
            utc_time = %event.utc_time.to_rfc3339(),
            "User alert event"
        );
        Ok(())
    }
}
