//! In-memory collaborators for exercising the webhook pipeline without
//! Postgres or Slack.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use intake_core::profile::PersonName;
use intake_core::signature;
use uuid::Uuid;

use crate::identity::{IdentityError, IdentityStore, TypeformCompletion};
use crate::queue::{JobQueue, ProcessedSignal, QueueError};
use crate::secrets::{SecretError, SecretStore};
use crate::slack::{NotifyError, Notifier};
use crate::stories::{InsertOutcome, NewStory, StoreError, StoryRecord, StoryStore};

pub fn fixture_body() -> Vec<u8> {
    include_bytes!("../../core/fixtures/onboarding_response.json").to_vec()
}

/// `typeform-signature` header value for `body`.
pub fn signed(secret: &str, body: &[u8]) -> String {
    format!("sha256={}", signature::sign(secret, body).unwrap())
}

#[derive(Default)]
pub struct FakeSecrets {
    values: HashMap<String, String>,
}

impl FakeSecrets {
    pub fn with(name: &str, value: &str) -> Self {
        let mut values = HashMap::new();
        values.insert(name.to_string(), value.to_string());
        Self { values }
    }
}

#[async_trait]
impl SecretStore for FakeSecrets {
    async fn get(&self, name: &str) -> Result<String, SecretError> {
        self.values.get(name).cloned().ok_or_else(|| SecretError {
            name: name.to_string(),
        })
    }
}

#[derive(Default)]
pub struct FakeIdentity {
    users: HashMap<String, PersonName>,
    updates: Mutex<Vec<(String, TypeformCompletion)>>,
    fail_lookups: AtomicBool,
    fail_updates: AtomicBool,
}

impl FakeIdentity {
    pub fn with_user(user_id: &str, given: &str, family: &str) -> Self {
        let mut users = HashMap::new();
        users.insert(
            user_id.to_string(),
            PersonName {
                given_name: Some(given.to_string()),
                family_name: Some(family.to_string()),
            },
        );
        Self {
            users,
            ..Self::default()
        }
    }

    pub fn updates(&self) -> Vec<(String, TypeformCompletion)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn fail_lookups(&self) {
        self.fail_lookups.store(true, Ordering::SeqCst);
    }

    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityStore for FakeIdentity {
    async fn get_user(&self, user_id: &str) -> Result<PersonName, IdentityError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(IdentityError::Backend(sqlx::Error::PoolTimedOut));
        }
        self.users
            .get(user_id)
            .cloned()
            .ok_or_else(|| IdentityError::NotFound(user_id.to_string()))
    }

    async fn update_user(
        &self,
        user_id: &str,
        completion: &TypeformCompletion,
    ) -> Result<(), IdentityError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(IdentityError::Backend(sqlx::Error::PoolTimedOut));
        }
        if !self.users.contains_key(user_id) {
            return Err(IdentityError::NotFound(user_id.to_string()));
        }
        self.updates
            .lock()
            .unwrap()
            .push((user_id.to_string(), completion.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeStories {
    saved: Mutex<Vec<NewStory>>,
    failing: AtomicBool,
}

impl FakeStories {
    pub fn saved(&self) -> Vec<NewStory> {
        self.saved.lock().unwrap().clone()
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl StoryStore for FakeStories {
    async fn find_story(&self, user_id: &str) -> Result<Option<StoryRecord>, StoreError> {
        self.check()?;
        Ok(self
            .saved
            .lock()
            .unwrap()
            .iter()
            .find(|story| story.user_id == user_id)
            .map(|story| StoryRecord {
                id: Uuid::nil(),
                user_id: story.user_id.clone(),
                created_at: story.created_at,
            }))
    }

    async fn insert_story(&self, story: &NewStory) -> Result<InsertOutcome, StoreError> {
        self.check()?;
        let mut saved = self.saved.lock().unwrap();
        if saved.iter().any(|s| s.user_id == story.user_id) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        saved.push(story.clone());
        Ok(InsertOutcome::Created)
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    messages: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl FakeNotifier {
    /// Every message handed to `post`, including failed ones.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn post(&self, text: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(text.to_string());
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeQueue {
    published: Mutex<Vec<ProcessedSignal>>,
    failing: AtomicBool,
}

impl FakeQueue {
    pub fn published(&self) -> Vec<ProcessedSignal> {
        self.published.lock().unwrap().clone()
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl JobQueue for FakeQueue {
    async fn publish(&self, signal: &ProcessedSignal) -> Result<(), QueueError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(QueueError::Database(sqlx::Error::PoolTimedOut));
        }
        self.published.lock().unwrap().push(signal.clone());
        Ok(())
    }
}
