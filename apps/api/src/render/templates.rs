//! Template identifiers and dispatch.
//!
//! Template tags arrive as free strings from the client and from stored
//! records. Unknown or missing tags fall back to the kind's default template.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::document::{Document, DocumentKind};
use crate::render::tree::VisualTree;
use crate::render::{letter, resume};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeTemplate {
    #[default]
    Modern,
    Classic,
    Minimal,
    Sidebar,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterTemplate {
    #[default]
    Professional,
    Modern,
    Classic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateChoice {
    Resume(ResumeTemplate),
    Letter(LetterTemplate),
}

impl TemplateChoice {
    /// Resolves a template tag for `kind`, falling back to the default.
    pub fn parse(kind: DocumentKind, tag: Option<&str>) -> TemplateChoice {
        let tag = tag.unwrap_or("").trim().to_ascii_lowercase();
        match kind {
            DocumentKind::Resume => TemplateChoice::Resume(match tag.as_str() {
                "classic" => ResumeTemplate::Classic,
                "minimal" => ResumeTemplate::Minimal,
                "sidebar" => ResumeTemplate::Sidebar,
                _ => ResumeTemplate::Modern,
            }),
            DocumentKind::CoverLetter => TemplateChoice::Letter(match tag.as_str() {
                "modern" => LetterTemplate::Modern,
                "classic" => LetterTemplate::Classic,
                _ => LetterTemplate::Professional,
            }),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            TemplateChoice::Resume(ResumeTemplate::Modern) => "modern",
            TemplateChoice::Resume(ResumeTemplate::Classic) => "classic",
            TemplateChoice::Resume(ResumeTemplate::Minimal) => "minimal",
            TemplateChoice::Resume(ResumeTemplate::Sidebar) => "sidebar",
            TemplateChoice::Letter(LetterTemplate::Professional) => "professional",
            TemplateChoice::Letter(LetterTemplate::Modern) => "modern",
            TemplateChoice::Letter(LetterTemplate::Classic) => "classic",
        }
    }
}

/// Inputs that are not part of the document but appear on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Date line printed on cover letters, already formatted.
    pub date_line: Option<String>,
}

/// "October 18, 2026".
pub const LETTER_DATE_FORMAT: &str = "%B %-d, %Y";

impl RenderOptions {
    pub fn dated(today: NaiveDate) -> Self {
        Self {
            date_line: Some(today.format(LETTER_DATE_FORMAT).to_string()),
        }
    }
}

/// Renders `document` with the template named by `tag`.
///
/// Pure: identical inputs always produce an identical tree.
pub fn render_document(document: &Document, tag: Option<&str>, options: &RenderOptions) -> VisualTree {
    let choice = TemplateChoice::parse(document.kind(), tag);
    match (document, choice) {
        (Document::Resume(r), TemplateChoice::Resume(t)) => resume::render(r, t),
        (Document::CoverLetter(l), TemplateChoice::Letter(t)) => letter::render(l, t, options),
        // `parse` always answers with the document's own kind.
        (Document::Resume(r), TemplateChoice::Letter(_)) => resume::render(r, ResumeTemplate::default()),
        (Document::CoverLetter(l), TemplateChoice::Resume(_)) => {
            letter::render(l, LetterTemplate::default(), options)
        }
    }
}
