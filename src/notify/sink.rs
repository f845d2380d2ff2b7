//! Outbound notification sinks

use async_trait::async_trait;

use super::payload::{ChatNotice, StateChange, UserAlertEvent};

/// Delivers state change reports by email
#[async_trait]
pub trait EmailSink: Send + Sync {
    async fn send_state_change(
        &self,
        recipients: &[String],
        change: &StateChange,
    ) -> Result<(), SinkError>;
}

/// Posts state change summaries to chat channels. Implementations decide
/// what to do when chat integration is off or no channels are given.
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn send_state_change(
        &self,
        channels: &[String],
        notice: &ChatNotice,
    ) -> Result<(), SinkError>;
}

/// Publishes per-user alert events
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &UserAlertEvent) -> Result<(), SinkError>;
}

/// Sink errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SinkError {
    #[error("Email error: {0}")]
    Email(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("Event publish error: {0}")]
    Event(String),
}
