use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::secrets::{SLACK_WEBHOOK_URL, SecretError, SecretStore};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error(transparent)]
    Secret(#[from] SecretError),
    #[error("slack request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("slack returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Chat-style notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn post(&self, text: &str) -> Result<(), NotifyError>;
}

/// Slack message announcing a freshly composed prompt.
pub fn format_prompt_message(prompt: &str) -> String {
    format!("*Prompt*:\n> {prompt}")
}

/// Where a [`SlackNotifier`] finds its incoming-webhook URL.
#[derive(Clone)]
pub enum WebhookTarget {
    /// Resolved through the secret store on every post.
    Secret(Arc<dyn SecretStore>),
    Fixed(String),
}

/// Posts `{"text": ...}` to a Slack incoming webhook.
#[derive(Clone)]
pub struct SlackNotifier {
    client: reqwest::Client,
    target: WebhookTarget,
}

impl SlackNotifier {
    pub fn new(client: reqwest::Client, target: WebhookTarget) -> Self {
        Self { client, target }
    }

    async fn webhook_url(&self) -> Result<String, SecretError> {
        match &self.target {
            WebhookTarget::Secret(secrets) => secrets.get(SLACK_WEBHOOK_URL).await,
            WebhookTarget::Fixed(url) => Ok(url.clone()),
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn post(&self, text: &str) -> Result<(), NotifyError> {
        let url = self.webhook_url().await?;
        let response = self
            .client
            .post(url)
            .json(&json!({ "text": text }))
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Slack webhook returned non-success status");
            return Err(NotifyError::Status(response.status()));
        }
        Ok(())
    }
}
