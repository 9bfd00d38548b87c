use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;

/// Event name the workout generator listens for.
pub const TYPEFORM_PROCESSED: &str = "typeform.processed";

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("queue error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to encode signal: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Tells the downstream workflow that a user's intake is ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedSignal {
    pub user_id: String,
    pub event: String,
}

impl ProcessedSignal {
    pub fn typeform_processed(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            event: TYPEFORM_PROCESSED.to_string(),
        }
    }
}

#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn publish(&self, signal: &ProcessedSignal) -> Result<(), QueueError>;
}

/// Enqueues signals as rows of `background_jobs`, picked up by the worker.
#[derive(Clone)]
pub struct PgJobQueue {
    pool: PgPool,
}

impl PgJobQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobQueue for PgJobQueue {
    async fn publish(&self, signal: &ProcessedSignal) -> Result<(), QueueError> {
        let payload = serde_json::to_value(signal)?;
        sqlx::query(
            r#"
            INSERT INTO background_jobs (user_id, job_type, payload, max_retries)
            VALUES ($1, $2, $3, 3)
            "#,
        )
        .bind(&signal.user_id)
        .bind(&signal.event)
        .bind(&payload)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn signal_serializes_camel_case() {
        let value = serde_json::to_value(ProcessedSignal::typeform_processed("u-1")).unwrap();
        assert_eq!(value, json!({"userId": "u-1", "event": "typeform.processed"}));
    }
}
