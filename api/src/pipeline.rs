//! One webhook delivery, end to end.
//!
//! Stages run strictly in order: signature, identity lookup, identity update,
//! extraction and composition, prompt notification, persistence, downstream
//! signal. Every early exit is logged and alerted. Only payload, composition
//! and prompt-notification failures are hard errors; every other failure is
//! soft-accepted with a 200 so the sender does not redeliver.

use std::sync::Arc;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::Instrument;

use intake_core::extract::extract_answers;
use intake_core::form::WebhookPayload;
use intake_core::profile::resolve_profile;
use intake_core::prompt::compose;
use intake_core::signature::{self, SignatureRejection};

use crate::error::AppError;
use crate::identity::{IdentityError, IdentityStore, TypeformCompletion};
use crate::queue::{JobQueue, ProcessedSignal};
use crate::secrets::{SecretStore, TYPEFORM_SECRET};
use crate::slack::{Notifier, format_prompt_message};
use crate::stories::{NewStory, StoryStore, save_story};

/// Furthest point a delivery reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    ReceivedRaw,
    SignatureVerified,
    IdentityResolved,
    IdentityUpdated,
    AnswersExtracted,
    PromptComposed,
    Notified,
    Persisted,
    Signaled,
    Done,
}

/// Response for every non-hard outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookOutcome {
    pub status: StatusCode,
    pub detail: Option<&'static str>,
    pub stage: Stage,
}

impl WebhookOutcome {
    fn rejected(rejection: SignatureRejection) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            detail: Some(rejection.response_detail()),
            stage: Stage::ReceivedRaw,
        }
    }

    fn soft_accept(detail: &'static str, stage: Stage) -> Self {
        Self {
            status: StatusCode::OK,
            detail: Some(detail),
            stage,
        }
    }

    fn done() -> Self {
        Self {
            status: StatusCode::OK,
            detail: None,
            stage: Stage::Done,
        }
    }
}

impl IntoResponse for WebhookOutcome {
    fn into_response(self) -> Response {
        let body = match self.detail {
            Some(detail) => json!({ "detail": detail }),
            None => json!({}),
        };
        (self.status, Json(body)).into_response()
    }
}

pub const USER_NOT_FOUND: &str = "User not found.";
pub const USER_UPDATE_FAILED: &str = "Unable to update user with typeformIds.";
pub const STORY_SAVE_FAILED: &str = "Unable to save user story to db.";

/// The external collaborators a delivery talks to.
#[derive(Clone)]
pub struct WebhookPipeline {
    pub secrets: Arc<dyn SecretStore>,
    pub identity: Arc<dyn IdentityStore>,
    pub stories: Arc<dyn StoryStore>,
    /// Channel that receives composed prompts.
    pub notifier: Arc<dyn Notifier>,
    /// Channel that receives failure alerts.
    pub alerts: Arc<dyn Notifier>,
    pub queue: Arc<dyn JobQueue>,
}

impl WebhookPipeline {
    /// Process one delivery. `now` fixes the trial start, the story timestamp
    /// and the reference date for the age calculation.
    pub async fn process(
        &self,
        signature_header: Option<&str>,
        raw_body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<WebhookOutcome, AppError> {
        let provided = match signature::parse_signature_header(signature_header) {
            Ok(provided) => provided,
            Err(rejection) => return Ok(self.reject(rejection).await),
        };
        if !self.verify_signature(raw_body, provided).await {
            return Ok(self.reject(SignatureRejection::Invalid).await);
        }

        let payload = match WebhookPayload::from_slice(raw_body) {
            Ok(payload) => payload,
            Err(e) => {
                self.log_and_alert("Failed to parse webhook payload", Some(e.to_string()))
                    .await;
                return Err(e.into());
            }
        };
        let user_id = payload.form_response.hidden.user_id.clone();
        tracing::debug!(stage = ?Stage::SignatureVerified, "Signature verified");

        let span = tracing::info_span!("typeform_webhook", user_id = %user_id);
        self.process_verified(payload, now).instrument(span).await
    }

    async fn process_verified(
        &self,
        payload: WebhookPayload,
        now: DateTime<Utc>,
    ) -> Result<WebhookOutcome, AppError> {
        let response = payload.form_response;
        let user_id = response.hidden.user_id.as_str();

        tracing::info!("Getting user info for {user_id}");
        let name = match self.identity.get_user(user_id).await {
            Ok(name) => name,
            Err(IdentityError::NotFound(_)) => {
                self.log_and_alert(
                    &format!("Failed to get user: User {user_id} not found."),
                    None,
                )
                .await;
                return Ok(WebhookOutcome::soft_accept(
                    USER_NOT_FOUND,
                    Stage::SignatureVerified,
                ));
            }
            Err(e) => {
                self.log_and_alert("Failed to get user.", Some(e.to_string())).await;
                return Ok(WebhookOutcome::soft_accept(
                    USER_NOT_FOUND,
                    Stage::SignatureVerified,
                ));
            }
        };
        tracing::debug!(stage = ?Stage::IdentityResolved, "Identity resolved");

        tracing::info!("Updating user {user_id} with typeformIds.");
        let completion = TypeformCompletion {
            form_id: response.form_id.clone(),
            response_token: response.token.clone(),
            trial_start_date: now,
        };
        if let Err(e) = self.identity.update_user(user_id, &completion).await {
            self.log_and_alert(
                &format!("Unable to update user {user_id} with typeformIds."),
                Some(e.to_string()),
            )
            .await;
            return Ok(WebhookOutcome::soft_accept(
                USER_UPDATE_FAILED,
                Stage::IdentityResolved,
            ));
        }
        tracing::debug!(stage = ?Stage::IdentityUpdated, "Identity updated");

        let content = match response.content() {
            Ok(content) => content,
            Err(e) => {
                self.log_and_alert("Failed to map question id to answer", Some(e.to_string()))
                    .await;
                return Err(e.into());
            }
        };
        let pairs = extract_answers(&content.fields, &content.answers);
        tracing::debug!(stage = ?Stage::AnswersExtracted, answers = pairs.len(), "Answers extracted");

        let prompt = match resolve_profile(&pairs, &name, now.date_naive()) {
            Ok(profile) => compose(&profile),
            Err(e) => {
                self.log_and_alert(
                    &format!("Failed to build prompt for user {user_id}"),
                    Some(e.to_string()),
                )
                .await;
                return Err(e.into());
            }
        };
        tracing::debug!(stage = ?Stage::PromptComposed, chars = prompt.as_str().len(), "Prompt composed");

        if let Err(e) = self.notifier.post(&format_prompt_message(prompt.as_str())).await {
            self.log_and_alert("Failed to send message to Slack", Some(e.to_string()))
                .await;
            return Err(e.into());
        }
        tracing::debug!(stage = ?Stage::Notified, "Prompt posted");

        let story = NewStory::onboarding(user_id, prompt.into_inner(), now);
        if let Err(e) = save_story(self.stories.as_ref(), &story).await {
            self.log_and_alert("Unable to save user story to db", Some(e.to_string()))
                .await;
            return Ok(WebhookOutcome::soft_accept(STORY_SAVE_FAILED, Stage::Notified));
        }
        tracing::debug!(stage = ?Stage::Persisted, "Story persisted");

        if let Err(e) = self
            .queue
            .publish(&ProcessedSignal::typeform_processed(user_id))
            .await
        {
            self.log_and_alert(
                &format!("Unable to initiate generate workout flow for user {user_id}"),
                Some(e.to_string()),
            )
            .await;
        } else {
            tracing::debug!(stage = ?Stage::Signaled, "Downstream workflow signaled");
        }

        tracing::info!("Typeform response processed");
        Ok(WebhookOutcome::done())
    }

    async fn verify_signature(&self, raw_body: &[u8], provided: &str) -> bool {
        match self.secrets.get(TYPEFORM_SECRET).await {
            Ok(secret) => signature::verify(&secret, raw_body, provided),
            Err(e) => {
                self.log_and_alert("Failed to verify signature", Some(e.to_string()))
                    .await;
                false
            }
        }
    }

    async fn reject(&self, rejection: SignatureRejection) -> WebhookOutcome {
        self.log_and_alert(rejection.alert_message(), None).await;
        WebhookOutcome::rejected(rejection)
    }

    /// Structured error log plus a best-effort alert. Alert failures are
    /// logged and swallowed.
    async fn log_and_alert(&self, message: &str, error: Option<String>) {
        tracing::error!(error = error.as_deref(), "{message}");

        let alert = format!("{message}. Error: {}", error.as_deref().unwrap_or("None"));
        if let Err(e) = self.alerts.post(&alert).await {
            tracing::warn!(error = %e, "Failed to deliver alert");
        }
    }
}
