/// Non-secret runtime settings, read once at startup.
///
/// Secrets (`TYPEFORM_SECRET`, `SLACK_WEBHOOK_URL`) are not held here; they are
/// fetched through the [`SecretStore`](crate::secrets::SecretStore) on each use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub database_url: String,
    pub port: u16,
    pub require_https: bool,
    /// Where alerts go. `None` means the prompt channel is reused.
    pub alert_webhook_url: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is not valid: {value}")]
    Invalid { name: &'static str, value: String },
}

impl WebhookConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let database_url = non_empty("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = match non_empty("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            None => 3000,
        };

        let require_https = non_empty("INTAKE_REQUIRE_HTTPS")
            .map(|v| v == "true")
            .unwrap_or(false);

        Ok(Self {
            database_url,
            port,
            require_https,
            alert_webhook_url: non_empty("SLACK_ALERT_WEBHOOK_URL"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config =
            WebhookConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/intake")]))
                .unwrap();
        assert_eq!(config.port, 3000);
        assert!(!config.require_https);
        assert_eq!(config.alert_webhook_url, None);
    }

    #[test]
    fn database_url_is_required() {
        let err = WebhookConfig::from_lookup(lookup(&[("DATABASE_URL", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn reads_all_settings() {
        let config = WebhookConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/intake"),
            ("PORT", "8080"),
            ("INTAKE_REQUIRE_HTTPS", "true"),
            ("SLACK_ALERT_WEBHOOK_URL", "https://hooks.slack.com/services/T/B/alerts"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.require_https);
        assert_eq!(
            config.alert_webhook_url.as_deref(),
            Some("https://hooks.slack.com/services/T/B/alerts")
        );
    }

    #[test]
    fn rejects_bad_port() {
        let err = WebhookConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/intake"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }
}
