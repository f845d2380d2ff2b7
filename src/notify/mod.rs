//! Notification payloads and the sinks that deliver them

pub mod events;
pub mod mailer;
pub mod payload;
pub mod recording;
pub mod sink;
pub mod slack;

pub use events::{LogEventPublisher, WebhookEventPublisher};
pub use mailer::LogMailer;
pub use payload::{ChatNotice, Dispatch, StateChange, UserAlertEvent, TRIGGER_USER_ALERT};
pub use recording::RecordingSink;
pub use sink::{ChatSink, EmailSink, EventPublisher, SinkError};
pub use slack::SlackNotifier;
