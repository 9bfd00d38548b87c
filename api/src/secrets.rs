use async_trait::async_trait;

/// Name of the shared secret Typeform signs deliveries with.
pub const TYPEFORM_SECRET: &str = "TYPEFORM_SECRET";
/// Name of the Slack incoming-webhook URL prompts are posted to.
pub const SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";

#[derive(Debug, thiserror::Error)]
#[error("secret {name} is not configured")]
pub struct SecretError {
    pub name: String,
}

/// Named secret lookup. Implementations fail loudly when a secret is absent.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<String, SecretError>;
}

/// Reads secrets from the process environment (populated from `.env` in dev).
#[derive(Debug, Clone, Default)]
pub struct EnvSecretStore;

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn get(&self, name: &str) -> Result<String, SecretError> {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| SecretError {
                name: name.to_string(),
            })
    }
}
