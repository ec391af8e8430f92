//! AI content generation for résumés and cover letters.
//!
//! Flow: current document → prompt → LLM (JSON) → lenient parse → merge.
//!
//! Nothing here touches the database; the caller persists the merged
//! document only after the whole pipeline succeeded.

use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::generation::merge::{merge_letter, merge_resume, GeneratedLetter, GeneratedResume};
use crate::generation::prompts::{LETTER_PROMPT_TEMPLATE, LETTER_SYSTEM, RESUME_PROMPT_TEMPLATE, RESUME_SYSTEM};
use crate::llm_client::prompts::FACTUAL_INSTRUCTION;
use crate::llm_client::LlmClient;
use crate::models::document::{CoverLetter, Document, Resume};

/// Job descriptions longer than this are cut before prompting.
pub const MAX_JOB_DESCRIPTION_CHARS: usize = 12_000;

/// The parts of a document the model may see. Design, photo and signature
/// never reach the prompt.
fn prompt_view(document: &Document) -> Result<Value, AppError> {
    let mut value = serde_json::to_value(document)?;
    if let Value::Object(map) = &mut value {
        map.remove("kind");
        map.remove("design");
        map.remove("signature");
        if let Some(Value::Object(personal)) = map.get_mut("personal") {
            personal.remove("photo_url");
        }
        for list in ["experience", "education"] {
            if let Some(Value::Array(entries)) = map.get_mut(list) {
                for entry in entries {
                    if let Value::Object(entry) = entry {
                        entry.remove("id");
                    }
                }
            }
        }
    }
    Ok(value)
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn build_prompt(template: &str, job_description: &str, current: &Document) -> Result<String, AppError> {
    let current_json = serde_json::to_string_pretty(&prompt_view(current)?)?;
    Ok(template
        .replace("{factual_instruction}", FACTUAL_INSTRUCTION)
        .replace("{current_json}", &current_json)
        .replace(
            "{job_description}",
            truncate_chars(job_description.trim(), MAX_JOB_DESCRIPTION_CHARS),
        ))
}

pub async fn generate_resume(llm: &LlmClient, job_description: &str, current: &Resume) -> Result<Resume, AppError> {
    let prompt = build_prompt(
        RESUME_PROMPT_TEMPLATE,
        job_description,
        &Document::Resume(current.clone()),
    )?;
    let generated: GeneratedResume = llm.call_json(&prompt, RESUME_SYSTEM).await?;
    info!(
        "Generated résumé: {} experience, {} education, {} skills",
        generated.experience.len(),
        generated.education.len(),
        generated.skills.len()
    );
    Ok(merge_resume(current, generated))
}

pub async fn generate_cover_letter(
    llm: &LlmClient,
    job_description: &str,
    current: &CoverLetter,
) -> Result<CoverLetter, AppError> {
    let prompt = build_prompt(
        LETTER_PROMPT_TEMPLATE,
        job_description,
        &Document::CoverLetter(current.clone()),
    )?;
    let generated: GeneratedLetter = llm.call_json(&prompt, LETTER_SYSTEM).await?;
    info!("Generated cover letter with {} paragraphs", generated.content.body.len());
    Ok(merge_letter(current, generated))
}

/// Generates content for either kind and returns the merged document.
pub async fn generate(llm: &LlmClient, job_description: &str, current: &Document) -> Result<Document, AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation("job_description cannot be empty".to_string()));
    }
    let mut merged = match current {
        Document::Resume(r) => Document::Resume(generate_resume(llm, job_description, r).await?),
        Document::CoverLetter(l) => Document::CoverLetter(generate_cover_letter(llm, job_description, l).await?),
    };
    merged.normalize();
    Ok(merged)
}
