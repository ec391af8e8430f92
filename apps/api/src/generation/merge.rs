//! Lenient shapes for model output and the merge back into the document.
//!
//! Every generated field is optional and `null` reads as empty. The merge
//! never lets an empty generated value erase something the user typed.

use serde::{Deserialize, Deserializer};

use crate::models::document::{
    CoverLetter, Education, Experience, LetterContent, PersonalInfo, RecipientInfo, Resume, SenderInfo,
};

/// Missing and `null` both become `T::default()`.
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ────────────────────────────────────────────────────────────────────────────
// Generated shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedPersonal {
    #[serde(default, deserialize_with = "or_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "or_default")]
    pub job_title: String,
    #[serde(default, deserialize_with = "or_default")]
    pub email: String,
    #[serde(default, deserialize_with = "or_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "or_default")]
    pub location: String,
    #[serde(default, deserialize_with = "or_default")]
    pub website: String,
    #[serde(default, deserialize_with = "or_default")]
    pub linkedin: String,
    #[serde(default, deserialize_with = "or_default")]
    pub summary: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedExperience {
    #[serde(default, deserialize_with = "or_default")]
    pub company: String,
    #[serde(default, deserialize_with = "or_default")]
    pub position: String,
    #[serde(default, deserialize_with = "or_default")]
    pub start_date: String,
    #[serde(default, deserialize_with = "or_default")]
    pub end_date: String,
    #[serde(default, deserialize_with = "or_default")]
    pub current: bool,
    #[serde(default, deserialize_with = "or_default")]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedEducation {
    #[serde(default, deserialize_with = "or_default")]
    pub institution: String,
    #[serde(default, deserialize_with = "or_default")]
    pub degree: String,
    #[serde(default, deserialize_with = "or_default")]
    pub field: String,
    #[serde(default, deserialize_with = "or_default")]
    pub start_date: String,
    #[serde(default, deserialize_with = "or_default")]
    pub end_date: String,
    #[serde(default, deserialize_with = "or_default")]
    pub current: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedResume {
    #[serde(default, deserialize_with = "or_default")]
    pub personal: GeneratedPersonal,
    #[serde(default, deserialize_with = "or_default")]
    pub experience: Vec<GeneratedExperience>,
    #[serde(default, deserialize_with = "or_default")]
    pub education: Vec<GeneratedEducation>,
    #[serde(default, deserialize_with = "or_default")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedSender {
    #[serde(default, deserialize_with = "or_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "or_default")]
    pub job_title: String,
    #[serde(default, deserialize_with = "or_default")]
    pub email: String,
    #[serde(default, deserialize_with = "or_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "or_default")]
    pub location: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedRecipient {
    #[serde(default, deserialize_with = "or_default")]
    pub manager_name: String,
    #[serde(default, deserialize_with = "or_default")]
    pub company: String,
    #[serde(default, deserialize_with = "or_default")]
    pub address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedContent {
    #[serde(default, deserialize_with = "or_default")]
    pub subject: String,
    #[serde(default, deserialize_with = "or_default")]
    pub opening: String,
    #[serde(default, deserialize_with = "or_default")]
    pub body: Vec<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub closing: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedLetter {
    #[serde(default, deserialize_with = "or_default")]
    pub sender: GeneratedSender,
    #[serde(default, deserialize_with = "or_default")]
    pub recipient: GeneratedRecipient,
    #[serde(default, deserialize_with = "or_default")]
    pub content: GeneratedContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Merge
// ────────────────────────────────────────────────────────────────────────────

/// Generated value when it has text, otherwise the prior one.
fn prefer(generated: String, prior: &str) -> String {
    if generated.trim().is_empty() {
        prior.to_string()
    } else {
        generated.trim().to_string()
    }
}

fn same(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Merges generated résumé content over `prior`.
///
/// Lists are replaced by the generated ones unless the model returned none.
/// Entries that keep their company and position (or institution and degree)
/// keep their id; everything else gets a fresh one. Design and photo always
/// come from `prior`.
pub fn merge_resume(prior: &Resume, generated: GeneratedResume) -> Resume {
    let g = generated.personal;
    let p = &prior.personal;
    let personal = PersonalInfo {
        full_name: prefer(g.full_name, &p.full_name),
        job_title: prefer(g.job_title, &p.job_title),
        email: prefer(g.email, &p.email),
        phone: prefer(g.phone, &p.phone),
        location: prefer(g.location, &p.location),
        website: prefer(g.website, &p.website),
        linkedin: prefer(g.linkedin, &p.linkedin),
        summary: prefer(g.summary, &p.summary),
        photo_url: p.photo_url.clone(),
    };

    let mut merged = Resume {
        personal,
        design: prior.design.clone(),
        ..Resume::default()
    };

    if generated.experience.is_empty() {
        merged.experience = prior.experience.clone();
    } else {
        for entry in generated.experience {
            let id = prior
                .experience
                .iter()
                .find(|e| same(&e.company, &entry.company) && same(&e.position, &entry.position))
                .map(|e| e.id)
                .unwrap_or_default();
            let entry = Experience {
                id,
                company: entry.company,
                position: entry.position,
                start_date: entry.start_date,
                end_date: entry.end_date,
                current: entry.current,
                description: entry.description,
            };
            if !entry.is_blank() {
                merged.add_experience(entry);
            }
        }
    }

    if generated.education.is_empty() {
        merged.education = prior.education.clone();
    } else {
        for entry in generated.education {
            let id = prior
                .education
                .iter()
                .find(|e| same(&e.institution, &entry.institution) && same(&e.degree, &entry.degree))
                .map(|e| e.id)
                .unwrap_or_default();
            let entry = Education {
                id,
                institution: entry.institution,
                degree: entry.degree,
                field: entry.field,
                start_date: entry.start_date,
                end_date: entry.end_date,
                current: entry.current,
            };
            if !entry.is_blank() {
                merged.add_education(entry);
            }
        }
    }

    let skills = if generated.skills.is_empty() {
        prior.skills.clone()
    } else {
        generated.skills
    };
    for skill in &skills {
        merged.add_skill(skill);
    }

    let languages = if generated.languages.is_empty() {
        prior.languages.clone()
    } else {
        generated.languages
    };
    for language in &languages {
        merged.add_language(language);
    }

    merged
}

/// Merges a generated letter over `prior`. Content is replaced; sender and
/// recipient are filled field by field. Signature and design are kept.
pub fn merge_letter(prior: &CoverLetter, generated: GeneratedLetter) -> CoverLetter {
    let s = generated.sender;
    let r = generated.recipient;
    let c = generated.content;

    let mut body: Vec<String> = c
        .body
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if body.is_empty() {
        body.push(String::new());
    }

    CoverLetter {
        sender: SenderInfo {
            full_name: prefer(s.full_name, &prior.sender.full_name),
            job_title: prefer(s.job_title, &prior.sender.job_title),
            email: prefer(s.email, &prior.sender.email),
            phone: prefer(s.phone, &prior.sender.phone),
            location: prefer(s.location, &prior.sender.location),
        },
        recipient: RecipientInfo {
            manager_name: prefer(r.manager_name, &prior.recipient.manager_name),
            company: prefer(r.company, &prior.recipient.company),
            address: prefer(r.address, &prior.recipient.address),
        },
        content: LetterContent {
            subject: c.subject.trim().to_string(),
            opening: c.opening.trim().to_string(),
            body,
            closing: c.closing.trim().to_string(),
        },
        signature: prior.signature.clone(),
        design: prior.design.clone(),
    }
}
