//! Slack incoming-webhook notifier

use async_trait::async_trait;

use super::payload::ChatNotice;
use super::sink::{ChatSink, SinkError};
use crate::checks::CheckState;

/// Posts one message per channel to a Slack incoming webhook. Without a
/// webhook URL the notifier is disabled and every call is a no-op.
pub struct SlackNotifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
    base_url: String,
}

impl SlackNotifier {
    pub fn new(webhook_url: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
            base_url: base_url.into(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, "")
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    fn color(state: &CheckState) -> &'static str {
        match state {
            CheckState::Passing => "good",
            _ => "danger",
        }
    }

    /// Message body for one channel
    pub fn payload(&self, channel: &str, notice: &ChatNotice) -> serde_json::Value {
        let link = format!(
            "<{}/queries/{}|Query #{}>",
            self.base_url.trim_end_matches('/'),
            notice.query_id,
            notice.query_id
        );
        serde_json::json!({
            "channel": channel,
            "attachments": [{
                "title": format!("Check {}: {}", notice.state.titleize(), link),
                "text": notice.summary(),
                "color": Self::color(&notice.state),
            }]
        })
    }
}

#[async_trait]
impl ChatSink for SlackNotifier {
    async fn send_state_change(
        &self,
        channels: &[String],
        notice: &ChatNotice,
    ) -> Result<(), SinkError> {
        let Some(url) = &self.webhook_url else {
            return Ok(());
        };

        for channel in channels {
            let response = self
                .client
                .post(url.as_str())
                .json(&self.payload(channel, notice))
                .send()
                .await
                .map_err(|e| SinkError::Chat(format!("Failed to post to {}: {}", channel, e)))?;

            if !response.status().is_success() {
                return Err(SinkError::Chat(format!(
                    "Slack returned status {} for {}",
                    response.status(),
                    channel
                )));
            }

            tracing::debug!(
                check_id = notice.check_id,
                channel = %channel,
                "Slack notification sent"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::CheckKind;

    fn notice(state: CheckState) -> ChatNotice {
        ChatNotice {
            check_id: 1,
            query_id: 42,
            state,
            previous_state: CheckState::New,
            row_count: 3,
            message: None,
            kind: CheckKind::BadData,
        }
    }

    #[test]
    fn test_payload() {
        let notifier = SlackNotifier::new(None, "https://bi.example.com/");
        let payload = notifier.payload("#ops", &notice(CheckState::Failing));
        assert_eq!(payload["channel"], "#ops");
        assert_eq!(
            payload["attachments"][0]["title"],
            "Check Failing: <https://bi.example.com/queries/42|Query #42>"
        );
        assert_eq!(payload["attachments"][0]["text"], "3 rows");
        assert_eq!(payload["attachments"][0]["color"], "danger");

        let payload = notifier.payload("#ops", &notice(CheckState::Passing));
        assert_eq!(payload["attachments"][0]["color"], "good");
    }

    #[tokio::test]
    async fn test_disabled_is_noop() {
        let notifier = SlackNotifier::disabled();
        assert!(!notifier.is_enabled());
        let result = notifier
            .send_state_change(&["#ops".to_string()], &notice(CheckState::Failing))
            .await;
        assert!(result.is_ok());
    }
}
