//! Joins form definitions with submitted answers, normalized to strings.

use std::collections::HashMap;

use serde::Serialize;

use crate::form::{AnswerValue, FormAnswer, FormField};

/// Placeholder for answers whose shape the extractor does not know.
pub const UNSUPPORTED_ANSWER: &str = "Answer type not supported";

/// A question title joined with its normalized answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionAnswerPair {
    pub title: String,
    pub answer: String,
}

/// Field id -> question/answer pair for every field the form defines.
pub type AnswerMap = HashMap<String, QuestionAnswerPair>;

/// Normalize one answer value to the scalar string the prompt uses.
///
/// Multi-choice: chosen labels joined with `", "`; with no labels the free-text
/// `other` value is used instead (empty when that is missing too).
/// Booleans render as `True` / `False`, matching what the prompt consumers
/// have always received.
pub fn normalize_answer(value: &AnswerValue) -> String {
    match value {
        AnswerValue::Text(s)
        | AnswerValue::Email(s)
        | AnswerValue::PhoneNumber(s)
        | AnswerValue::Date(s)
        | AnswerValue::Url(s) => s.clone(),
        AnswerValue::Choice(choice) => choice.label.clone(),
        AnswerValue::Choices(choices) => {
            if choices.labels.is_empty() {
                choices.other.clone().unwrap_or_default()
            } else {
                choices.labels.join(", ")
            }
        }
        AnswerValue::Number(n) => n.to_string(),
        AnswerValue::Boolean(b) => render_bool(*b).to_string(),
        AnswerValue::File(file) => file.url.clone(),
        AnswerValue::Payment(payment) => render_bool(payment.successful).to_string(),
        AnswerValue::Unsupported => UNSUPPORTED_ANSWER.to_string(),
    }
}

fn render_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Join the form definition with the submitted answers.
///
/// Defined fields without an answer map to an empty answer. Answers whose
/// field is not in the definition are dropped.
pub fn extract_answers(fields: &[FormField], answers: &[FormAnswer]) -> AnswerMap {
    let answer_by_id: HashMap<&str, String> = answers
        .iter()
        .map(|answer| (answer.field_id.as_str(), normalize_answer(&answer.value)))
        .collect();

    fields
        .iter()
        .map(|field| {
            let answer = answer_by_id
                .get(field.id.as_str())
                .cloned()
                .unwrap_or_default();
            (
                field.id.clone(),
                QuestionAnswerPair {
                    title: field.title.clone(),
                    answer,
                },
            )
        })
        .collect()
}
