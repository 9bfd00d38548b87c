use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use intake_core::profile::PersonName;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("user {0} not found")]
    NotFound(String),
    #[error("identity store error: {0}")]
    Backend(#[from] sqlx::Error),
}

/// Marks a user as having completed the onboarding form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeformCompletion {
    pub form_id: String,
    pub response_token: String,
    pub trial_start_date: DateTime<Utc>,
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn get_user(&self, user_id: &str) -> Result<PersonName, IdentityError>;

    async fn update_user(
        &self,
        user_id: &str,
        completion: &TypeformCompletion,
    ) -> Result<(), IdentityError>;
}

/// Identity store backed by the `users` table.
#[derive(Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserNameRow {
    given_name: Option<String>,
    family_name: Option<String>,
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn get_user(&self, user_id: &str) -> Result<PersonName, IdentityError> {
        let row = sqlx::query_as::<_, UserNameRow>(
            "SELECT given_name, family_name FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| IdentityError::NotFound(user_id.to_string()))?;

        Ok(PersonName {
            given_name: row.given_name,
            family_name: row.family_name,
        })
    }

    async fn update_user(
        &self,
        user_id: &str,
        completion: &TypeformCompletion,
    ) -> Result<(), IdentityError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET typeform_form_id = $2,
                typeform_response_id = $3,
                trial_start_date = $4,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(&completion.form_id)
        .bind(&completion.response_token)
        .bind(completion.trial_start_date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::NotFound(user_id.to_string()));
        }
        Ok(())
    }
}
