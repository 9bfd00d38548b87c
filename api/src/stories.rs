use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Sort key of the onboarding story. Sorts above every timestamped chat
/// record of the same user, so a descending read returns it first.
pub const STORY_SORT_KEY: &str = "9999";
const STORY_ENTITY: &str = "story";
const STORY_CHAT_ROLE: &str = "user";

#[derive(Debug, thiserror::Error)]
#[error("story store error: {0}")]
pub struct StoreError(#[from] pub sqlx::Error);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryRecord {
    pub id: Uuid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    pub user_id: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
    pub sort_key: String,
}

impl NewStory {
    pub fn onboarding(user_id: &str, prompt: String, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            prompt,
            created_at,
            sort_key: STORY_SORT_KEY.to_string(),
        }
    }
}

/// Whether an insert created the record or found one already there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    AlreadyExists,
}

#[async_trait]
pub trait StoryStore: Send + Sync {
    async fn find_story(&self, user_id: &str) -> Result<Option<StoryRecord>, StoreError>;

    /// Insert unless the user already has a story. The first record wins.
    async fn insert_story(&self, story: &NewStory) -> Result<InsertOutcome, StoreError>;
}

/// Persist a story once per user.
pub async fn save_story(
    store: &dyn StoryStore,
    story: &NewStory,
) -> Result<InsertOutcome, StoreError> {
    if let Some(existing) = store.find_story(&story.user_id).await? {
        tracing::info!(
            user_id = %existing.user_id,
            story_id = %existing.id,
            created_at = %existing.created_at,
            "User already has a story"
        );
        return Ok(InsertOutcome::AlreadyExists);
    }
    let outcome = store.insert_story(story).await?;
    if outcome == InsertOutcome::AlreadyExists {
        tracing::info!(user_id = %story.user_id, "Story was written concurrently, keeping the first one");
    }
    Ok(outcome)
}

#[derive(Clone)]
pub struct PgStoryStore {
    pool: PgPool,
}

impl PgStoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct StoryRow {
    id: Uuid,
    user_id: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl StoryStore for PgStoryStore {
    async fn find_story(&self, user_id: &str) -> Result<Option<StoryRecord>, StoreError> {
        let row = sqlx::query_as::<_, StoryRow>(
            r#"
            SELECT id, user_id, created_at
            FROM stories
            WHERE user_id = $1 AND entity = $2
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(STORY_ENTITY)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| StoryRecord {
            id: r.id,
            user_id: r.user_id,
            created_at: r.created_at,
        }))
    }

    async fn insert_story(&self, story: &NewStory) -> Result<InsertOutcome, StoreError> {
        // The partial unique index on (user_id) WHERE entity = 'story' closes the
        // window between find_story and this insert.
        let result = sqlx::query(
            r#"
            INSERT INTO stories (id, user_id, sort_key, entity, chat_role, prompt, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) WHERE entity = 'story' DO NOTHING
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&story.user_id)
        .bind(&story.sort_key)
        .bind(STORY_ENTITY)
        .bind(STORY_CHAT_ROLE)
        .bind(&story.prompt)
        .bind(story.created_at)
        .execute(&self.pool)
        .await?;

        Ok(if result.rows_affected() == 0 {
            InsertOutcome::AlreadyExists
        } else {
            InsertOutcome::Created
        })
    }
}
