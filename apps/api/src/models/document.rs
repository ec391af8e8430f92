//! The résumé / cover-letter aggregate edited by the user.
//!
//! Dates are free text exactly as typed ("Jan 2021", "2019 – 2020"); they are
//! never parsed. List entries carry a stable `id` so edits address entries by
//! identity rather than by position.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::design::Design;
use crate::models::signature::Signature;

// ────────────────────────────────────────────────────────────────────────────
// Aggregate
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::CoverLetter => "cover_letter",
        }
    }

    pub fn parse(value: &str) -> Option<DocumentKind> {
        match value {
            "resume" => Some(DocumentKind::Resume),
            "cover_letter" | "cover-letter" => Some(DocumentKind::CoverLetter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Document {
    Resume(Resume),
    CoverLetter(CoverLetter),
}

impl Document {
    /// The all-empty state a new document starts from.
    pub fn initial(kind: DocumentKind) -> Document {
        match kind {
            DocumentKind::Resume => Document::Resume(Resume::default()),
            DocumentKind::CoverLetter => Document::CoverLetter(CoverLetter {
                content: LetterContent {
                    body: vec![String::new()],
                    ..LetterContent::default()
                },
                ..CoverLetter::default()
            }),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Resume(_) => DocumentKind::Resume,
            Document::CoverLetter(_) => DocumentKind::CoverLetter,
        }
    }

    pub fn design(&self) -> &Design {
        match self {
            Document::Resume(r) => &r.design,
            Document::CoverLetter(l) => &l.design,
        }
    }

    pub fn design_mut(&mut self) -> &mut Design {
        match self {
            Document::Resume(r) => &mut r.design,
            Document::CoverLetter(l) => &mut l.design,
        }
    }

    /// Repairs a freshly loaded or externally produced document in place:
    /// nil or duplicated entry ids get fresh ones and skills are de-duplicated.
    pub fn normalize(&mut self) {
        if let Document::Resume(resume) = self {
            let mut seen = HashSet::new();
            for entry in &mut resume.experience {
                if entry.id.is_nil() || !seen.insert(entry.id) {
                    entry.id = Uuid::new_v4();
                    seen.insert(entry.id);
                }
            }
            for entry in &mut resume.education {
                if entry.id.is_nil() || !seen.insert(entry.id) {
                    entry.id = Uuid::new_v4();
                    seen.insert(entry.id);
                }
            }
            let skills = std::mem::take(&mut resume.skills);
            for skill in skills {
                resume.add_skill(&skill);
            }
        }
    }

    /// Base name for downloaded files, e.g. `Ada_Lovelace_resume`.
    pub fn file_stem(&self) -> String {
        let (name, suffix) = match self {
            Document::Resume(r) => (r.personal.full_name.as_str(), "resume"),
            Document::CoverLetter(l) => (l.sender.full_name.as_str(), "cover-letter"),
        };
        let cleaned = sanitize_file_stem(name);
        if cleaned.is_empty() {
            suffix.to_string()
        } else {
            format!("{cleaned}_{suffix}")
        }
    }
}

/// Reduces free text to `[A-Za-z0-9_-]`. Whitespace runs become one `_`,
/// common Latin accents lose their diacritic, everything else is dropped.
pub fn sanitize_file_stem(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.trim().chars().map(fold_accent) {
        if c.is_ascii_alphanumeric() || c == '-' {
            out.push(c);
        } else if (c.is_whitespace() || c == '_') && !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => 'O',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        other => other,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Résumé
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub full_name: String,
    pub job_title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
    pub linkedin: String,
    pub summary: String,
    pub photo_url: Option<String>,
}

impl PersonalInfo {
    /// Non-empty contact fields in display order.
    pub fn contact_items(&self) -> Vec<&str> {
        [
            &self.email,
            &self.phone,
            &self.location,
            &self.website,
            &self.linkedin,
        ]
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub id: Uuid,
    pub company: String,
    pub position: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub description: String,
}

impl Experience {
    pub fn is_blank(&self) -> bool {
        self.company.trim().is_empty()
            && self.position.trim().is_empty()
            && self.description.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub id: Uuid,
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
}

impl Education {
    pub fn is_blank(&self) -> bool {
        self.institution.trim().is_empty()
            && self.degree.trim().is_empty()
            && self.field.trim().is_empty()
    }
}

/// "start – end", "start – Present", or whichever half is present.
pub fn date_range(start: &str, end: &str, current: bool) -> String {
    let start = start.trim();
    let end = if current { "Present" } else { end.trim() };
    match (start.is_empty(), end.is_empty()) {
        (false, false) => format!("{start} – {end}"),
        (false, true) => start.to_string(),
        (true, false) => end.to_string(),
        (true, true) => String::new(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resume {
    pub personal: PersonalInfo,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub languages: Vec<String>,
    pub design: Design,
}

impl Resume {
    /// Appends an entry, assigning a fresh id when it has none. Returns the id.
    pub fn add_experience(&mut self, mut entry: Experience) -> Uuid {
        if entry.id.is_nil() || self.experience.iter().any(|e| e.id == entry.id) {
            entry.id = Uuid::new_v4();
        }
        let id = entry.id;
        self.experience.push(entry);
        id
    }

    /// Replaces the entry with the same id. Returns false when no entry matches.
    pub fn update_experience(&mut self, entry: Experience) -> bool {
        match self.experience.iter_mut().find(|e| e.id == entry.id) {
            Some(slot) => {
                *slot = entry;
                true
            }
            None => false,
        }
    }

    /// Index-based update; the stored id is kept.
    pub fn update_experience_at(&mut self, index: usize, entry: Experience) -> bool {
        match self.experience.get_mut(index) {
            Some(slot) => {
                let id = slot.id;
                *slot = Experience { id, ..entry };
                true
            }
            None => false,
        }
    }

    pub fn remove_experience(&mut self, id: Uuid) -> bool {
        let before = self.experience.len();
        self.experience.retain(|e| e.id != id);
        self.experience.len() != before
    }

    pub fn add_education(&mut self, mut entry: Education) -> Uuid {
        if entry.id.is_nil() || self.education.iter().any(|e| e.id == entry.id) {
            entry.id = Uuid::new_v4();
        }
        let id = entry.id;
        self.education.push(entry);
        id
    }

    pub fn update_education(&mut self, entry: Education) -> bool {
        match self.education.iter_mut().find(|e| e.id == entry.id) {
            Some(slot) => {
                *slot = entry;
                true
            }
            None => false,
        }
    }

    pub fn update_education_at(&mut self, index: usize, entry: Education) -> bool {
        match self.education.get_mut(index) {
            Some(slot) => {
                let id = slot.id;
                *slot = Education { id, ..entry };
                true
            }
            None => false,
        }
    }

    pub fn remove_education(&mut self, id: Uuid) -> bool {
        let before = self.education.len();
        self.education.retain(|e| e.id != id);
        self.education.len() != before
    }

    /// Adds a skill unless an equal one (case-insensitive) is already present.
    pub fn add_skill(&mut self, skill: &str) -> bool {
        let skill = skill.trim();
        if skill.is_empty()
            || self
                .skills
                .iter()
                .any(|s| s.eq_ignore_ascii_case(skill))
        {
            return false;
        }
        self.skills.push(skill.to_string());
        true
    }

    pub fn remove_skill(&mut self, skill: &str) -> bool {
        let before = self.skills.len();
        self.skills.retain(|s| !s.eq_ignore_ascii_case(skill.trim()));
        self.skills.len() != before
    }

    pub fn add_language(&mut self, language: &str) -> bool {
        let language = language.trim();
        if language.is_empty() {
            return false;
        }
        self.languages.push(language.to_string());
        true
    }

    pub fn remove_language(&mut self, index: usize) -> bool {
        if index < self.languages.len() {
            self.languages.remove(index);
            true
        } else {
            false
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cover letter
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderInfo {
    pub full_name: String,
    pub job_title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
}

impl SenderInfo {
    pub fn contact_items(&self) -> Vec<&str> {
        [&self.email, &self.phone, &self.location]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipientInfo {
    pub manager_name: String,
    pub company: String,
    pub address: String,
}

impl RecipientInfo {
    pub fn lines(&self) -> Vec<&str> {
        [&self.manager_name, &self.company, &self.address]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterContent {
    pub subject: String,
    pub opening: String,
    pub body: Vec<String>,
    pub closing: String,
}

impl LetterContent {
    /// Body paragraphs with text, in stored order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.body
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverLetter {
    pub sender: SenderInfo,
    pub recipient: RecipientInfo,
    pub content: LetterContent,
    pub signature: Signature,
    pub design: Design,
}

impl CoverLetter {
    /// Paragraphs are append-only; the new paragraph's index is returned.
    pub fn append_paragraph(&mut self, text: &str) -> usize {
        self.content.body.push(text.to_string());
        self.content.body.len() - 1
    }

    pub fn set_paragraph(&mut self, index: usize, text: &str) -> bool {
        match self.content.body.get_mut(index) {
            Some(slot) => {
                *slot = text.to_string();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::design::FontFamily;

    fn experience(company: &str) -> Experience {
        Experience {
            company: company.to_string(),
            position: "Engineer".to_string(),
            ..Experience::default()
        }
    }

    #[test]
    fn test_document_without_design_loads_default() {
        let json = r#"{"kind": "resume", "personal": {"full_name": "Ada"}}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.design(), &Design::default());
        assert_eq!(doc.design().font_family, FontFamily::Inter);
    }

    #[test]
    fn test_cover_letter_without_design_loads_default() {
        let json = r#"{"kind": "cover_letter", "content": {"body": ["Hello"]}}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.kind(), DocumentKind::CoverLetter);
        assert_eq!(doc.design(), &Design::default());
    }

    #[test]
    fn test_add_experience_assigns_unique_ids() {
        let mut resume = Resume::default();
        let a = resume.add_experience(experience("Acme"));
        let b = resume.add_experience(Experience {
            id: a,
            ..experience("Globex")
        });
        assert_ne!(a, b, "colliding id must be replaced");
        assert!(!a.is_nil());
    }

    #[test]
    fn test_update_and_remove_by_identity() {
        let mut resume = Resume::default();
        let a = resume.add_experience(experience("Acme"));
        let b = resume.add_experience(experience("Globex"));

        let updated = Experience {
            id: b,
            company: "Globex Corp".to_string(),
            ..Experience::default()
        };
        assert!(resume.update_experience(updated));
        assert_eq!(resume.experience[1].company, "Globex Corp");

        assert!(resume.remove_experience(a));
        assert_eq!(resume.experience.len(), 1);
        assert_eq!(resume.experience[0].id, b);
        assert!(!resume.remove_experience(a), "second removal is a no-op");
    }

    #[test]
    fn test_update_at_index_keeps_identity() {
        let mut resume = Resume::default();
        let a = resume.add_education(Education {
            institution: "MIT".to_string(),
            ..Education::default()
        });
        assert!(resume.update_education_at(
            0,
            Education {
                institution: "ETH".to_string(),
                ..Education::default()
            }
        ));
        assert_eq!(resume.education[0].id, a);
        assert_eq!(resume.education[0].institution, "ETH");
        assert!(!resume.update_education_at(5, Education::default()));
    }

    #[test]
    fn test_skills_are_set_like() {
        let mut resume = Resume::default();
        assert!(resume.add_skill("Rust"));
        assert!(!resume.add_skill("rust"));
        assert!(!resume.add_skill("   "));
        assert!(resume.add_skill("Go"));
        assert_eq!(resume.skills, vec!["Rust", "Go"]);
        assert!(resume.remove_skill("RUST"));
        assert_eq!(resume.skills, vec!["Go"]);
    }

    #[test]
    fn test_normalize_backfills_nil_and_duplicate_ids() {
        let dup = Uuid::new_v4();
        let mut doc = Document::Resume(Resume {
            experience: vec![
                Experience {
                    id: dup,
                    ..experience("A")
                },
                Experience {
                    id: dup,
                    ..experience("B")
                },
                experience("C"),
            ],
            skills: vec!["Rust".into(), "RUST".into(), "SQL".into()],
            ..Resume::default()
        });
        doc.normalize();
        let Document::Resume(resume) = doc else {
            panic!("kind changed")
        };
        let ids: HashSet<Uuid> = resume.experience.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 3);
        assert!(!ids.contains(&Uuid::nil()));
        assert_eq!(resume.experience[0].id, dup, "first holder keeps its id");
        assert_eq!(resume.skills, vec!["Rust", "SQL"]);
    }

    #[test]
    fn test_initial_letter_has_one_empty_paragraph() {
        let Document::CoverLetter(letter) = Document::initial(DocumentKind::CoverLetter) else {
            panic!("expected letter")
        };
        assert_eq!(letter.content.body, vec![String::new()]);
    }

    #[test]
    fn test_paragraphs_append_and_edit() {
        let mut letter = CoverLetter::default();
        assert_eq!(letter.append_paragraph("First"), 0);
        assert_eq!(letter.append_paragraph(""), 1);
        assert_eq!(letter.append_paragraph("Third"), 2);
        assert!(letter.set_paragraph(1, "Second"));
        assert!(!letter.set_paragraph(9, "nope"));
        let paragraphs: Vec<&str> = letter.content.paragraphs().collect();
        assert_eq!(paragraphs, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_date_range_formats() {
        assert_eq!(date_range("2019", "2021", false), "2019 – 2021");
        assert_eq!(date_range("2019", "2021", true), "2019 – Present");
        assert_eq!(date_range("", "", false), "");
        assert_eq!(date_range("2019", "", false), "2019");
    }

    #[test]
    fn test_file_stem_sanitizes_name() {
        let mut resume = Resume::default();
        resume.personal.full_name = "Ada  Lovelace/Byron".to_string();
        let doc = Document::Resume(resume);
        assert_eq!(doc.file_stem(), "Ada_LovelaceByron_resume");
        let empty = Document::initial(DocumentKind::CoverLetter);
        assert_eq!(empty.file_stem(), "cover-letter");
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("  Untitled résumé "), "Untitled_resume");
        assert_eq!(sanitize_file_stem("Acme — Senior Engineer"), "Acme_Senior_Engineer");
        assert_eq!(sanitize_file_stem("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_file_stem("\"quoted\"; x"), "quoted_x");
        assert_eq!(sanitize_file_stem("★★★"), "");
    }
}
