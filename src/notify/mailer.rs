//! Email delivery

use async_trait::async_trait;

use super::payload::StateChange;
use super::sink::{EmailSink, SinkError};

/// Renders state change mails and hands them to the log. Mail transport
/// lives outside this crate.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }

    /// Plain-text body: message, then a bounded preview of the rows
    pub fn render_body(change: &StateChange) -> String {
        let mut body = String::new();
        if let Some(message) = &change.message {
            body.push_str(message);
            body.push('\n');
        }
        body.push_str(&format!(
            "State changed from {} to {} ({} rows)\n",
            change.previous_state, change.state, change.row_count
        ));
        if !change.columns.is_empty() {
            body.push_str(&change.columns.join("\t"));
            body.push('\n');
            for row in &change.sample_rows {
                let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                body.push_str(&cells.join("\t"));
                body.push('\n');
            }
        }
        body
    }
}

#[async_trait]
impl EmailSink for LogMailer {
    async fn send_state_change(
        &self,
        recipients: &[String],
        change: &StateChange,
    ) -> Result<(), SinkError> {
        if recipients.is_empty() {
            return Err(SinkError::Email("no recipients".to_string()));
        }

        tracing::info!(
            check_id = change.check_id,
            recipients = ?recipients,
            subject = %change.subject(),
            "Sending state change email"
        );
        tracing::debug!(check_id = change.check_id, body = %Self::render_body(change));

        Ok(())
    }
}
