//! Sub-renderers shared by every template.
//!
//! Templates decide presentation (palette, heading style, arrangement); these
//! functions decide what content appears and in which order. A section whose
//! backing data is empty yields `None` and is left out entirely.

use crate::models::design::{ResolvedDesign, Rgb};
use crate::models::document::{
    date_range, Education, Experience, LetterContent, PersonalInfo, Resume,
};
use crate::models::signature::{ActiveSignature, Signature};
use crate::render::tree::{Align, BoxNode, Edges, ImageNode, Node, TextNode};

/// Colors a block is drawn with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub text: Rgb,
    pub muted: Rgb,
    pub accent: Rgb,
}

impl Palette {
    pub fn standard(d: &ResolvedDesign) -> Self {
        Self {
            text: Rgb::INK,
            muted: Rgb::MUTED,
            accent: d.accent,
        }
    }

    /// For text drawn on top of the accent color.
    pub fn inverted() -> Self {
        Self {
            text: Rgb::WHITE,
            muted: Rgb(226, 232, 240),
            accent: Rgb::WHITE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingStyle {
    /// Accent-colored title over an accent hairline.
    Underlined,
    /// Uppercase ink title over a full-width rule.
    Ruled,
    /// Small uppercase muted title, no rule.
    Quiet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Summary,
    Experience,
    Education,
    Skills,
    Languages,
}

impl SectionKind {
    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Summary => "Summary",
            SectionKind::Experience => "Experience",
            SectionKind::Education => "Education",
            SectionKind::Skills => "Skills",
            SectionKind::Languages => "Languages",
        }
    }
}

pub fn text(s: impl Into<String>, size_px: f32, color: Rgb, d: &ResolvedDesign) -> TextNode {
    TextNode::new(s, size_px, color, d.line_height)
}

pub fn section_heading(title: &str, d: &ResolvedDesign, p: &Palette, style: HeadingStyle) -> Node {
    match style {
        HeadingStyle::Underlined => BoxNode::column("section-heading")
            .padding(Edges {
                bottom: 4.0,
                ..Edges::default()
            })
            .border_bottom(1.5, p.accent)
            .child(text(title, d.heading_size_px(), p.accent, d).bold())
            .into(),
        HeadingStyle::Ruled => BoxNode::column("section-heading")
            .gap(4.0)
            .child(text(title, d.heading_size_px(), p.text, d).bold().uppercase())
            .child(Node::Rule {
                thickness_px: 1.0,
                color: p.text,
            })
            .into(),
        HeadingStyle::Quiet => text(title, d.small_size_px(), p.muted, d)
            .bold()
            .uppercase()
            .into(),
    }
}

/// A titled section, or `None` when `body` is empty.
pub fn section(
    kind: SectionKind,
    body: Vec<Node>,
    d: &ResolvedDesign,
    p: &Palette,
    style: HeadingStyle,
) -> Option<Node> {
    if body.is_empty() {
        return None;
    }
    Some(
        BoxNode::column("section")
            .gap(8.0)
            .child(section_heading(kind.title(), d, p, style))
            .children(body)
            .into(),
    )
}

pub fn contact_line(items: &[&str], d: &ResolvedDesign, color: Rgb, align: Align) -> Option<Node> {
    if items.is_empty() {
        return None;
    }
    Some(
        text(items.join("  |  "), d.small_size_px(), color, d)
            .align(align)
            .into(),
    )
}

pub fn photo(personal: &PersonalInfo, size_px: f32, d: &ResolvedDesign, align: Align) -> Option<Node> {
    let src = personal.photo_url.as_deref()?.trim();
    if src.is_empty() {
        return None;
    }
    Some(
        ImageNode {
            src: src.to_string(),
            width_px: size_px,
            height_px: size_px,
            radius_px: d.radius_px * 2.0,
            align,
        }
        .into(),
    )
}

pub fn experience_entry(entry: &Experience, d: &ResolvedDesign, p: &Palette) -> Node {
    let mut title = entry.position.trim().to_string();
    let company = entry.company.trim();
    if !company.is_empty() {
        if title.is_empty() {
            title = company.to_string();
        } else {
            title = format!("{title} — {company}");
        }
    }
    let mut block = BoxNode::column("experience-entry").gap(2.0);
    if !title.is_empty() {
        block = block.child(text(title, d.base_size_px, p.text, d).bold());
    }
    let dates = date_range(&entry.start_date, &entry.end_date, entry.current);
    if !dates.is_empty() {
        block = block.child(text(dates, d.small_size_px(), p.muted, d).italic());
    }
    if !entry.description.trim().is_empty() {
        block = block.child(text(entry.description.trim(), d.base_size_px, p.text, d));
    }
    block.into()
}

pub fn education_entry(entry: &Education, d: &ResolvedDesign, p: &Palette) -> Node {
    let degree = [entry.degree.trim(), entry.field.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    let mut block = BoxNode::column("education-entry").gap(2.0);
    if !degree.is_empty() {
        block = block.child(text(degree, d.base_size_px, p.text, d).bold());
    }
    if !entry.institution.trim().is_empty() {
        block = block.child(text(entry.institution.trim(), d.base_size_px, p.text, d));
    }
    let dates = date_range(&entry.start_date, &entry.end_date, entry.current);
    if !dates.is_empty() {
        block = block.child(text(dates, d.small_size_px(), p.muted, d).italic());
    }
    block.into()
}

/// Body nodes of one résumé section, empty when the section has no content.
pub fn section_body(kind: SectionKind, resume: &Resume, d: &ResolvedDesign, p: &Palette) -> Vec<Node> {
    match kind {
        SectionKind::Summary => {
            let summary = resume.personal.summary.trim();
            if summary.is_empty() {
                Vec::new()
            } else {
                vec![text(summary, d.base_size_px, p.text, d).into()]
            }
        }
        SectionKind::Experience => resume
            .experience
            .iter()
            .filter(|e| !e.is_blank())
            .map(|e| experience_entry(e, d, p))
            .collect(),
        SectionKind::Education => resume
            .education
            .iter()
            .filter(|e| !e.is_blank())
            .map(|e| education_entry(e, d, p))
            .collect(),
        SectionKind::Skills => joined_list(&resume.skills, d, p),
        SectionKind::Languages => joined_list(&resume.languages, d, p),
    }
}

fn joined_list(items: &[String], d: &ResolvedDesign, p: &Palette) -> Vec<Node> {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        return Vec::new();
    }
    vec![text(items.join("  ·  "), d.base_size_px, p.text, d).into()]
}

/// The titled résumé sections, in the order given, skipping empty ones.
pub fn resume_sections(
    kinds: &[SectionKind],
    resume: &Resume,
    d: &ResolvedDesign,
    p: &Palette,
    style: HeadingStyle,
) -> Vec<Node> {
    kinds
        .iter()
        .filter_map(|kind| section(*kind, section_body(*kind, resume, d, p), d, p, style))
        .collect()
}

/// Subject, opening, body paragraphs and closing, in stored order.
pub fn letter_body(content: &LetterContent, d: &ResolvedDesign, p: &Palette) -> Vec<Node> {
    let mut nodes = Vec::new();
    if !content.subject.trim().is_empty() {
        nodes.push(
            text(format!("Re: {}", content.subject.trim()), d.base_size_px, p.text, d)
                .bold()
                .into(),
        );
    }
    if !content.opening.trim().is_empty() {
        nodes.push(text(content.opening.trim(), d.base_size_px, p.text, d).into());
    }
    for paragraph in content.paragraphs() {
        nodes.push(text(paragraph, d.base_size_px, p.text, d).into());
    }
    if !content.closing.trim().is_empty() {
        nodes.push(text(content.closing.trim(), d.base_size_px, p.text, d).into());
    }
    nodes
}

/// The active signature variant followed by the printed name.
pub fn signature_block(signature: &Signature, name: &str, d: &ResolvedDesign, p: &Palette) -> Node {
    let mut block = BoxNode::column("signature").gap(4.0);
    match signature.active() {
        ActiveSignature::Typed(typed) => {
            block = block.child(text(typed, d.base_size_px * 1.8, p.text, d).italic());
        }
        ActiveSignature::Image(src) => {
            block = block.child(ImageNode {
                src: src.to_string(),
                width_px: 180.0,
                height_px: 60.0,
                radius_px: 0.0,
                align: Align::Left,
            });
        }
        ActiveSignature::Empty => {}
    }
    if !name.trim().is_empty() {
        block = block.child(text(name.trim(), d.base_size_px, p.text, d).bold());
    }
    block.into()
}
