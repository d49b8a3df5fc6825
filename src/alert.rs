//! Chat-webhook alert channel
//!
//! Fire-and-forget: delivery failures are logged and swallowed, they must
//! never affect the caller's control flow.

use serde_json::json;
use tracing::error;

/// Posts messages to a chat webhook
pub struct WebhookAlerter {
    http: reqwest::Client,
    webhook_url: String,
    /// User id to mention in `alert` messages
    mention_id: Option<String>,
}

impl WebhookAlerter {
    pub fn new(webhook_url: impl Into<String>, mention_id: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            webhook_url: webhook_url.into(),
            mention_id,
        }
    }

    /// Post a plain message
    pub async fn log(&self, message: &str) {
        self.post(message.to_string()).await;
    }

    /// Post a message prefixed with a mention so it pings someone
    pub async fn alert(&self, message: &str) {
        let content = match &self.mention_id {
            Some(id) => format!("<@{}> \n {}", id, message),
            None => message.to_string(),
        };
        self.post(content).await;
    }

    async fn post(&self, content: String) {
        let result = self
            .http
            .post(&self.webhook_url)
            .json(&json!({ "content": content }))
            .send()
            .await;
        if let Err(e) = result {
            error!("failed to deliver webhook alert: {}", e);
        }
    }
}
