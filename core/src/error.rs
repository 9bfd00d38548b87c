use serde::Serialize;
use utoipa::ToSchema;

/// Structured error response returned for hard failures.
/// Soft-accepted failures never produce this body; they answer 200 with a detail.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    /// Machine-readable error code (e.g. "payload_malformed", "rate_limited")
    pub error: String,
    /// Human-readable description of what went wrong
    pub message: String,
    /// Request ID for tracing and debugging
    pub request_id: String,
}

/// Error codes used across the API
pub mod codes {
    pub const PAYLOAD_MALFORMED: &str = "payload_malformed";
    pub const COMPOSITION_FAILED: &str = "composition_failed";
    pub const NOTIFICATION_FAILED: &str = "notification_failed";
    pub const RATE_LIMITED: &str = "rate_limited";
}

/// Failures of the pure extraction/resolution pipeline.
///
/// Both variants mean the submitted payload cannot be turned into a prompt,
/// so callers treat them as unrecoverable for the current event.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("malformed form payload: {0}")]
    PayloadMalformed(String),
    #[error("failed to calculate age for birthdate {birthdate}: {reason}")]
    InvalidBirthdate { birthdate: String, reason: String },
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::PayloadMalformed(err.to_string())
    }
}
