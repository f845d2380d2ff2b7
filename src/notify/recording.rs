//! In-memory sinks that record every call, for tests and dry runs

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::payload::{ChatNotice, Dispatch, StateChange, UserAlertEvent};
use super::sink::{ChatSink, EmailSink, EventPublisher, SinkError};

/// Email, chat and event sink sharing one ordered call log. Clones share
/// the log.
#[derive(Clone, Default)]
pub struct RecordingSink {
    calls: Arc<Mutex<Vec<Dispatch>>>,
    fail_email: bool,
    fail_chat: bool,
    fail_events: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record email calls, then fail them
    pub fn failing_email(mut self) -> Self {
        self.fail_email = true;
        self
    }

    pub fn failing_chat(mut self) -> Self {
        self.fail_chat = true;
        self
    }

    pub fn failing_events(mut self) -> Self {
        self.fail_events = true;
        self
    }

    pub fn calls(&self) -> Vec<Dispatch> {
        self.calls.lock().clone()
    }

    pub fn emails(&self) -> Vec<StateChange> {
        self.calls
            .lock()
            .iter()
            .filter_map(|d| match d {
                Dispatch::Email { change, .. } => Some(change.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn chats(&self) -> Vec<ChatNotice> {
        self.calls
            .lock()
            .iter()
            .filter_map(|d| match d {
                Dispatch::Chat { notice, .. } => Some(notice.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn events(&self) -> Vec<UserAlertEvent> {
        self.calls
            .lock()
            .iter()
            .filter_map(|d| match d {
                Dispatch::Event { event } => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl EmailSink for RecordingSink {
    async fn send_state_change(
        &self,
        recipients: &[String],
        change: &StateChange,
    ) -> Result<(), SinkError> {
        self.calls.lock().push(Dispatch::Email {
            recipients: recipients.to_vec(),
            change: change.clone(),
        });
        if self.fail_email {
            return Err(SinkError::Email("mail server unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatSink for RecordingSink {
    async fn send_state_change(
        &self,
        channels: &[String],
        notice: &ChatNotice,
    ) -> Result<(), SinkError> {
        self.calls.lock().push(Dispatch::Chat {
            channels: channels.to_vec(),
            notice: notice.clone(),
        });
        if self.fail_chat {
            return Err(SinkError::Chat("chat unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for RecordingSink {
    async fn publish(&self, event: &UserAlertEvent) -> Result<(), SinkError> {
        self.calls.lock().push(Dispatch::Event {
            event: event.clone(),
        });
        if self.fail_events {
            return Err(SinkError::Event("broker unavailable".to_string()));
        }
        Ok(())
    }
}
