//! Template-independent document structure for word-processor export.
//!
//! Built straight from the document model, never from the visual tree. The
//! style is fixed: one font, dark gray text, no accent color.

use chrono::NaiveDate;

use crate::export::assets::decode_data_url;
use crate::models::document::{date_range, CoverLetter, Document, Resume};
use crate::models::signature::ActiveSignature;
use crate::render::templates::LETTER_DATE_FORMAT;

pub const TITLE_PT: f32 = 20.0;
pub const HEADING_PT: f32 = 13.0;
pub const BODY_PT: f32 = 11.0;
pub const SMALL_PT: f32 = 9.5;
pub const SIGNATURE_PT: f32 = 16.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub size_pt: f32,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
            size_pt: BODY_PT,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn size(mut self, size_pt: f32) -> Self {
        self.size_pt = size_pt;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Level 1 is the document title, level 2 a section heading.
    Heading { text: String, level: u8 },
    Paragraph(Vec<Run>),
    /// PNG bytes with their pixel size.
    Image {
        png: Vec<u8>,
        width_px: u32,
        height_px: u32,
    },
    Spacer,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredDocument {
    pub blocks: Vec<Block>,
}

impl StructuredDocument {
    fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    fn title(&mut self, text: &str) {
        if !text.trim().is_empty() {
            self.push(Block::Heading {
                text: text.trim().to_string(),
                level: 1,
            });
        }
    }

    fn line(&mut self, run: Run) {
        if !run.text.trim().is_empty() {
            self.push(Block::Paragraph(vec![run]));
        }
    }

    /// Heading plus body, or nothing when the body is empty.
    fn section(&mut self, title: &str, body: Vec<Block>) {
        if body.is_empty() {
            return;
        }
        self.push(Block::Spacer);
        self.push(Block::Heading {
            text: title.to_string(),
            level: 2,
        });
        self.blocks.extend(body);
    }

    /// Section headings in output order.
    pub fn headings(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading { text, level: 2 } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

fn para(run: Run) -> Block {
    Block::Paragraph(vec![run])
}

/// One paragraph per non-blank line.
fn multiline(text: &str) -> Vec<Block> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| para(Run::plain(l)))
        .collect()
}

fn joined(items: &[String]) -> Vec<Block> {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        Vec::new()
    } else {
        vec![para(Run::plain(items.join(", ")))]
    }
}

pub fn build_structured(document: &Document, today: NaiveDate) -> StructuredDocument {
    match document {
        Document::Resume(r) => resume(r),
        Document::CoverLetter(l) => letter(l, today),
    }
}

fn resume(r: &Resume) -> StructuredDocument {
    let mut doc = StructuredDocument::default();
    doc.title(&r.personal.full_name);
    doc.line(Run::plain(r.personal.job_title.trim()).italic());
    doc.line(Run::plain(r.personal.contact_items().join(" | ")).size(SMALL_PT));

    doc.section("Summary", multiline(&r.personal.summary));

    let mut experience = Vec::new();
    for entry in r.experience.iter().filter(|e| !e.is_blank()) {
        let heading = [entry.position.trim(), entry.company.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" — ");
        if !heading.is_empty() {
            experience.push(para(Run::plain(heading).bold()));
        }
        let dates = date_range(&entry.start_date, &entry.end_date, entry.current);
        if !dates.is_empty() {
            experience.push(para(Run::plain(dates).italic().size(SMALL_PT)));
        }
        experience.extend(multiline(&entry.description));
    }
    doc.section("Experience", experience);

    let mut education = Vec::new();
    for entry in r.education.iter().filter(|e| !e.is_blank()) {
        let degree = [entry.degree.trim(), entry.field.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        if !degree.is_empty() {
            education.push(para(Run::plain(degree).bold()));
        }
        if !entry.institution.trim().is_empty() {
            education.push(para(Run::plain(entry.institution.trim())));
        }
        let dates = date_range(&entry.start_date, &entry.end_date, entry.current);
        if !dates.is_empty() {
            education.push(para(Run::plain(dates).italic().size(SMALL_PT)));
        }
    }
    doc.section("Education", education);

    doc.section("Skills", joined(&r.skills));
    doc.section("Languages", joined(&r.languages));
    doc
}

fn letter(l: &CoverLetter, today: NaiveDate) -> StructuredDocument {
    let mut doc = StructuredDocument::default();
    doc.title(&l.sender.full_name);
    doc.line(Run::plain(l.sender.job_title.trim()).italic());
    doc.line(Run::plain(l.sender.contact_items().join(" | ")).size(SMALL_PT));

    doc.push(Block::Spacer);
    doc.line(Run::plain(today.format(LETTER_DATE_FORMAT).to_string()));

    let recipient = l.recipient.lines();
    if !recipient.is_empty() {
        doc.push(Block::Spacer);
        for line in recipient {
            doc.line(Run::plain(line));
        }
    }

    doc.push(Block::Spacer);
    let subject = l.content.subject.trim();
    if !subject.is_empty() {
        doc.push(Block::Paragraph(vec![
            Run::plain("Subject: ").bold(),
            Run::plain(subject),
        ]));
    }
    doc.line(Run::plain(l.content.opening.trim()));
    for paragraph in l.content.paragraphs() {
        doc.line(Run::plain(paragraph));
    }
    doc.line(Run::plain(l.content.closing.trim()));

    doc.push(Block::Spacer);
    match l.signature.active() {
        ActiveSignature::Typed(typed) => {
            doc.line(Run::plain(typed).italic().size(SIGNATURE_PT));
        }
        ActiveSignature::Image(src) => match signature_png(src) {
            Some(block) => doc.push(block),
            None => doc.line(Run::plain(l.sender.full_name.trim())),
        },
        ActiveSignature::Empty => doc.line(Run::plain(l.sender.full_name.trim())),
    }
    doc
}

/// Inline image bytes of a signature, normalised to PNG. Remote URLs are
/// not fetched here.
fn signature_png(src: &str) -> Option<Block> {
    let bytes = decode_data_url(src)?;
    let img = image::load_from_memory(&bytes).ok()?;
    let mut png = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageOutputFormat::Png)
        .ok()?;
    Some(Block::Image {
        png,
        width_px: img.width(),
        height_px: img.height(),
    })
}
