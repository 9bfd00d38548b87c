//! Typeform webhook payload types.
//!
//! Only the parts of the `form_response` envelope the intake pipeline reads are
//! modeled; unknown keys (`ref`, `type`, `calculated`, ...) are ignored.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Top-level webhook body.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub form_response: FormResponse,
}

impl WebhookPayload {
    /// Parse the raw request body. Call only after the signature was verified
    /// against the same bytes.
    pub fn from_slice(raw: &[u8]) -> Result<Self, PipelineError> {
        Ok(serde_json::from_slice(raw)?)
    }
}

/// The `form_response` envelope.
///
/// Only the identifiers are decoded eagerly. `definition` and `answers` stay
/// raw JSON until [`FormResponse::content`] is called, so a malformed answer
/// surfaces after the user has been resolved and updated.
#[derive(Debug, Clone, Deserialize)]
pub struct FormResponse {
    pub form_id: String,
    /// Response token, unique per submission
    pub token: String,
    pub hidden: HiddenFields,
    #[serde(default)]
    pub definition: serde_json::Value,
    #[serde(default)]
    pub answers: serde_json::Value,
}

impl FormResponse {
    /// Decode the question definitions and the submitted answers.
    pub fn content(&self) -> Result<FormContent, PipelineError> {
        let definition = FormDefinition::deserialize(&self.definition)?;
        let answers = Vec::<FormAnswer>::deserialize(&self.answers)?;
        Ok(FormContent {
            fields: definition.fields,
            answers,
        })
    }
}

/// Decoded questions and answers of one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct FormContent {
    pub fields: Vec<FormField>,
    pub answers: Vec<FormAnswer>,
}

/// Hidden fields the app injects into the form link.
#[derive(Debug, Clone, Deserialize)]
pub struct HiddenFields {
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormDefinition {
    pub fields: Vec<FormField>,
}

/// One question definition from the form schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChoiceAnswer {
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChoicesAnswer {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub other: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileAnswer {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentAnswer {
    pub successful: bool,
}

/// The value carried by one submitted answer, tagged by its shape.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerValue {
    Text(String),
    Email(String),
    PhoneNumber(String),
    Date(String),
    Choice(ChoiceAnswer),
    Choices(ChoicesAnswer),
    Number(serde_json::Number),
    Boolean(bool),
    File(FileAnswer),
    Payment(PaymentAnswer),
    Url(String),
    /// None of the known shape tags was present.
    Unsupported,
}

/// One submitted response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawAnswer")]
pub struct FormAnswer {
    pub field_id: String,
    pub value: AnswerValue,
}

/// Wire shape of an answer: every tag optional, at most one present in practice.
/// A tag holding JSON `null` counts as absent.
#[derive(Debug, Deserialize)]
struct RawAnswer {
    field: FieldRef,
    text: Option<String>,
    email: Option<String>,
    phone_number: Option<String>,
    date: Option<String>,
    choice: Option<ChoiceAnswer>,
    choices: Option<ChoicesAnswer>,
    number: Option<serde_json::Number>,
    boolean: Option<bool>,
    file: Option<FileAnswer>,
    payment: Option<PaymentAnswer>,
    url: Option<String>,
}

impl From<RawAnswer> for FormAnswer {
    /// Shapes are checked in a fixed precedence so a payload carrying more than
    /// one tag still resolves deterministically: text, email, phone_number,
    /// date, choice, choices, number, boolean, file, payment, url.
    fn from(raw: RawAnswer) -> Self {
        let value = if let Some(text) = raw.text {
            AnswerValue::Text(text)
        } else if let Some(email) = raw.email {
            AnswerValue::Email(email)
        } else if let Some(phone) = raw.phone_number {
            AnswerValue::PhoneNumber(phone)
        } else if let Some(date) = raw.date {
            AnswerValue::Date(date)
        } else if let Some(choice) = raw.choice {
            AnswerValue::Choice(choice)
        } else if let Some(choices) = raw.choices {
            AnswerValue::Choices(choices)
        } else if let Some(number) = raw.number {
            AnswerValue::Number(number)
        } else if let Some(boolean) = raw.boolean {
            AnswerValue::Boolean(boolean)
        } else if let Some(file) = raw.file {
            AnswerValue::File(file)
        } else if let Some(payment) = raw.payment {
            AnswerValue::Payment(payment)
        } else if let Some(url) = raw.url {
            AnswerValue::Url(url)
        } else {
            AnswerValue::Unsupported
        };

        FormAnswer {
            field_id: raw.field.id,
            value,
        }
    }
}
