use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use intake_core::error::{self, ApiError, PipelineError};

use crate::slack::NotifyError;

/// Hard failures of a webhook delivery. Each one surfaces as a 5xx so the
/// sender sees the delivery as failed.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Body could not be parsed into a form response (500)
    #[error("malformed payload: {0}")]
    PayloadMalformed(String),
    /// Answers could not be resolved or composed into a prompt (500)
    #[error("composition failed: {0}")]
    Composition(PipelineError),
    /// Prompt could not be delivered to the notification channel (500)
    #[error("notification failed: {0}")]
    Notification(#[from] NotifyError),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::PayloadMalformed(message) => AppError::PayloadMalformed(message),
            other => AppError::Composition(other),
        }
    }
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::PayloadMalformed(_) => error::codes::PAYLOAD_MALFORMED,
            AppError::Composition(_) => error::codes::COMPOSITION_FAILED,
            AppError::Notification(_) => error::codes::NOTIFICATION_FAILED,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::now_v7().to_string();
        tracing::error!(request_id = %request_id, error = %self, "Webhook processing failed");

        let message = match &self {
            AppError::PayloadMalformed(_) => "The form payload could not be processed".to_string(),
            AppError::Composition(_) => "The form answers could not be turned into a prompt".to_string(),
            AppError::Notification(_) => "The prompt could not be delivered".to_string(),
        };

        let body = ApiError {
            error: self.code().to_string(),
            message,
            request_id,
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_errors_map_to_codes() {
        let malformed: AppError = PipelineError::PayloadMalformed("missing field".into()).into();
        assert_eq!(malformed.code(), error::codes::PAYLOAD_MALFORMED);

        let birthdate: AppError = PipelineError::InvalidBirthdate {
            birthdate: "Not provided".into(),
            reason: "input contains invalid characters".into(),
        }
        .into();
        assert_eq!(birthdate.code(), error::codes::COMPOSITION_FAILED);
    }

    #[test]
    fn hard_failures_are_500() {
        let err: AppError =
            NotifyError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE).into();
        assert_eq!(err.code(), error::codes::NOTIFICATION_FAILED);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
