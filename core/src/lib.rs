//! Shared core of the Typeform intake service: payload types, signature
//! verification, answer extraction, profile resolution and prompt composition.
//!
//! Nothing in this crate performs I/O.

pub mod error;
pub mod extract;
pub mod form;
pub mod profile;
pub mod prompt;
pub mod signature;

use chrono::NaiveDate;

use error::PipelineError;
use form::FormResponse;
use profile::PersonName;
use prompt::Prompt;

/// Extraction, resolution and composition in one call.
pub fn build_prompt(
    response: &FormResponse,
    name: &PersonName,
    reference: NaiveDate,
) -> Result<Prompt, PipelineError> {
    let content = response.content()?;
    let pairs = extract::extract_answers(&content.fields, &content.answers);
    let profile = profile::resolve_profile(&pairs, name, reference)?;
    Ok(prompt::compose(&profile))
}
