//! Field-level edit commands sent by the editor.
//!
//! A batch is applied to a copy of the document and only committed when
//! every command succeeds, so a rejected batch leaves nothing half-applied.

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::design::Design;
use crate::models::document::{
    CoverLetter, Document, DocumentKind, Education, Experience, PersonalInfo, RecipientInfo, Resume, SenderInfo,
};
use crate::models::signature::SignatureMode;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    // résumé
    SetPersonal { personal: PersonalInfo },
    AddExperience { entry: Experience },
    UpdateExperience { entry: Experience },
    UpdateExperienceAt { index: usize, entry: Experience },
    RemoveExperience { id: Uuid },
    AddEducation { entry: Education },
    UpdateEducation { entry: Education },
    UpdateEducationAt { index: usize, entry: Education },
    RemoveEducation { id: Uuid },
    AddSkill { skill: String },
    RemoveSkill { skill: String },
    AddLanguage { language: String },
    RemoveLanguage { index: usize },

    // cover letter
    SetSender { sender: SenderInfo },
    SetRecipient { recipient: RecipientInfo },
    SetSubject { text: String },
    SetOpening { text: String },
    SetClosing { text: String },
    AppendParagraph { text: String },
    SetParagraph { index: usize, text: String },
    SetSignatureMode { mode: SignatureMode },
    SetTypedSignature { text: String },
    SetDrawnSignature { data_url: Option<String> },
    SetUploadedSignature { url: Option<String> },

    // either
    SetDesign { design: Design },
}

#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("'{op}' does not apply to a {kind}")]
    WrongKind { op: &'static str, kind: &'static str },

    #[error("No entry with id {0}")]
    UnknownId(Uuid),

    #[error("Index {index} is out of range ({len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
}

impl From<EditError> for AppError {
    fn from(e: EditError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl EditCommand {
    fn name(&self) -> &'static str {
        match self {
            EditCommand::SetPersonal { .. } => "set_personal",
            EditCommand::AddExperience { .. } => "add_experience",
            EditCommand::UpdateExperience { .. } => "update_experience",
            EditCommand::UpdateExperienceAt { .. } => "update_experience_at",
            EditCommand::RemoveExperience { .. } => "remove_experience",
            EditCommand::AddEducation { .. } => "add_education",
            EditCommand::UpdateEducation { .. } => "update_education",
            EditCommand::UpdateEducationAt { .. } => "update_education_at",
            EditCommand::RemoveEducation { .. } => "remove_education",
            EditCommand::AddSkill { .. } => "add_skill",
            EditCommand::RemoveSkill { .. } => "remove_skill",
            EditCommand::AddLanguage { .. } => "add_language",
            EditCommand::RemoveLanguage { .. } => "remove_language",
            EditCommand::SetSender { .. } => "set_sender",
            EditCommand::SetRecipient { .. } => "set_recipient",
            EditCommand::SetSubject { .. } => "set_subject",
            EditCommand::SetOpening { .. } => "set_opening",
            EditCommand::SetClosing { .. } => "set_closing",
            EditCommand::AppendParagraph { .. } => "append_paragraph",
            EditCommand::SetParagraph { .. } => "set_paragraph",
            EditCommand::SetSignatureMode { .. } => "set_signature_mode",
            EditCommand::SetTypedSignature { .. } => "set_typed_signature",
            EditCommand::SetDrawnSignature { .. } => "set_drawn_signature",
            EditCommand::SetUploadedSignature { .. } => "set_uploaded_signature",
            EditCommand::SetDesign { .. } => "set_design",
        }
    }
}

/// Applies one command in place. On error the document may be partially
/// modified; use [`apply_all`] for transactional batches.
pub fn apply(document: &mut Document, command: EditCommand) -> Result<(), EditError> {
    if let EditCommand::SetDesign { design } = command {
        *document.design_mut() = design;
        return Ok(());
    }

    let op = command.name();
    let kind = document.kind();
    match document {
        Document::Resume(resume) => apply_resume(resume, command).unwrap_or(Err(wrong_kind(op, kind))),
        Document::CoverLetter(letter) => apply_letter(letter, command).unwrap_or(Err(wrong_kind(op, kind))),
    }
}

/// All-or-nothing. The document is untouched when any command fails.
pub fn apply_all(document: &mut Document, commands: Vec<EditCommand>) -> Result<(), EditError> {
    let mut working = document.clone();
    for command in commands {
        apply(&mut working, command)?;
    }
    *document = working;
    Ok(())
}

fn wrong_kind(op: &'static str, kind: DocumentKind) -> EditError {
    EditError::WrongKind { op, kind: kind.as_str() }
}

fn found(hit: bool, id: Uuid) -> Result<(), EditError> {
    if hit {
        Ok(())
    } else {
        Err(EditError::UnknownId(id))
    }
}

fn in_range(hit: bool, index: usize, len: usize) -> Result<(), EditError> {
    if hit {
        Ok(())
    } else {
        Err(EditError::IndexOutOfRange { index, len })
    }
}

/// `None` when the command is not a résumé command.
fn apply_resume(resume: &mut Resume, command: EditCommand) -> Option<Result<(), EditError>> {
    let result = match command {
        EditCommand::SetPersonal { personal } => {
            resume.personal = personal;
            Ok(())
        }
        EditCommand::AddExperience { entry } => {
            resume.add_experience(entry);
            Ok(())
        }
        EditCommand::UpdateExperience { entry } => {
            let id = entry.id;
            found(resume.update_experience(entry), id)
        }
        EditCommand::UpdateExperienceAt { index, entry } => {
            let len = resume.experience.len();
            in_range(resume.update_experience_at(index, entry), index, len)
        }
        EditCommand::RemoveExperience { id } => found(resume.remove_experience(id), id),
        EditCommand::AddEducation { entry } => {
            resume.add_education(entry);
            Ok(())
        }
        EditCommand::UpdateEducation { entry } => {
            let id = entry.id;
            found(resume.update_education(entry), id)
        }
        EditCommand::UpdateEducationAt { index, entry } => {
            let len = resume.education.len();
            in_range(resume.update_education_at(index, entry), index, len)
        }
        EditCommand::RemoveEducation { id } => found(resume.remove_education(id), id),
        // Duplicate and blank skills are ignored rather than rejected.
        EditCommand::AddSkill { skill } => {
            resume.add_skill(&skill);
            Ok(())
        }
        EditCommand::RemoveSkill { skill } => {
            resume.remove_skill(&skill);
            Ok(())
        }
        EditCommand::AddLanguage { language } => {
            resume.add_language(&language);
            Ok(())
        }
        EditCommand::RemoveLanguage { index } => {
            let len = resume.languages.len();
            in_range(resume.remove_language(index), index, len)
        }
        _ => return None,
    };
    Some(result)
}

fn apply_letter(letter: &mut CoverLetter, command: EditCommand) -> Option<Result<(), EditError>> {
    let result = match command {
        EditCommand::SetSender { sender } => {
            letter.sender = sender;
            Ok(())
        }
        EditCommand::SetRecipient { recipient } => {
            letter.recipient = recipient;
            Ok(())
        }
        EditCommand::SetSubject { text } => {
            letter.content.subject = text;
            Ok(())
        }
        EditCommand::SetOpening { text } => {
            letter.content.opening = text;
            Ok(())
        }
        EditCommand::SetClosing { text } => {
            letter.content.closing = text;
            Ok(())
        }
        EditCommand::AppendParagraph { text } => {
            letter.append_paragraph(&text);
            Ok(())
        }
        EditCommand::SetParagraph { index, text } => {
            let len = letter.content.body.len();
            in_range(letter.set_paragraph(index, &text), index, len)
        }
        EditCommand::SetSignatureMode { mode } => {
            letter.signature.set_mode(mode);
            Ok(())
        }
        EditCommand::SetTypedSignature { text } => {
            letter.signature.typed_text = text;
            Ok(())
        }
        EditCommand::SetDrawnSignature { data_url } => {
            letter.signature.drawn_image = data_url;
            Ok(())
        }
        EditCommand::SetUploadedSignature { url } => {
            letter.signature.uploaded_url = url;
            Ok(())
        }
        _ => return None,
    };
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn commands(value: serde_json::Value) -> Vec<EditCommand> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_commands_deserialize_from_op_tag() {
        let parsed = commands(json!([
            {"op": "add_skill", "skill": "Rust"},
            {"op": "set_paragraph", "index": 0, "text": "Hello"},
            {"op": "set_signature_mode", "mode": "drawn"},
        ]));
        assert!(matches!(parsed[0], EditCommand::AddSkill { .. }));
        assert!(matches!(parsed[1], EditCommand::SetParagraph { index: 0, .. }));
        assert!(matches!(
            parsed[2],
            EditCommand::SetSignatureMode { mode: SignatureMode::Drawn }
        ));
    }

    #[test]
    fn test_resume_batch_applies_in_order() {
        let mut doc = Document::initial(DocumentKind::Resume);
        apply_all(
            &mut doc,
            commands(json!([
                {"op": "add_experience", "entry": {"company": "Acme", "position": "Engineer"}},
                {"op": "update_experience_at", "index": 0, "entry": {"company": "Acme Corp"}},
                {"op": "add_skill", "skill": "Rust"},
                {"op": "add_skill", "skill": "rust"},
                {"op": "add_language", "language": "French"},
            ])),
        )
        .unwrap();

        let Document::Resume(resume) = doc else { panic!("expected resume") };
        assert_eq!(resume.experience.len(), 1);
        assert_eq!(resume.experience[0].company, "Acme Corp");
        assert!(!resume.experience[0].id.is_nil());
        assert_eq!(resume.skills, vec!["Rust"]);
        assert_eq!(resume.languages, vec!["French"]);
    }

    #[test]
    fn test_failed_batch_leaves_document_untouched() {
        let mut doc = Document::initial(DocumentKind::Resume);
        let before = doc.clone();
        let err = apply_all(
            &mut doc,
            commands(json!([
                {"op": "add_skill", "skill": "Rust"},
                {"op": "remove_language", "index": 3},
            ])),
        )
        .unwrap_err();

        assert_eq!(err, EditError::IndexOutOfRange { index: 3, len: 0 });
        assert_eq!(doc, before);
    }

    #[test]
    fn test_letter_command_on_resume_is_rejected() {
        let mut doc = Document::initial(DocumentKind::Resume);
        let err = apply(&mut doc, EditCommand::SetSubject { text: "Hi".into() }).unwrap_err();
        assert!(matches!(err, EditError::WrongKind { op: "set_subject", kind: "resume" }));
    }

    #[test]
    fn test_unknown_entry_id() {
        let mut doc = Document::initial(DocumentKind::Resume);
        let id = Uuid::new_v4();
        assert_eq!(
            apply(&mut doc, EditCommand::RemoveExperience { id }),
            Err(EditError::UnknownId(id))
        );
    }

    #[test]
    fn test_signature_mode_switch_keeps_other_slots() {
        let mut doc = Document::initial(DocumentKind::CoverLetter);
        apply_all(
            &mut doc,
            commands(json!([
                {"op": "set_typed_signature", "text": "Ada"},
                {"op": "set_drawn_signature", "data_url": "data:image/png;base64,AAAA"},
                {"op": "set_signature_mode", "mode": "drawn"},
                {"op": "set_signature_mode", "mode": "typed"},
            ])),
        )
        .unwrap();

        let Document::CoverLetter(letter) = doc else { panic!("expected letter") };
        assert_eq!(letter.signature.mode, SignatureMode::Typed);
        assert_eq!(letter.signature.typed_text, "Ada");
        assert!(letter.signature.drawn_image.is_some());
    }

    #[test]
    fn test_paragraphs_append_and_set() {
        let mut doc = Document::initial(DocumentKind::CoverLetter);
        apply_all(
            &mut doc,
            commands(json!([
                {"op": "set_paragraph", "index": 0, "text": "First"},
                {"op": "append_paragraph", "text": "Second"},
            ])),
        )
        .unwrap();
        let Document::CoverLetter(letter) = doc else { panic!("expected letter") };
        assert_eq!(letter.content.body, vec!["First", "Second"]);
    }

    #[test]
    fn test_design_applies_to_either_kind() {
        let mut doc = Document::initial(DocumentKind::CoverLetter);
        let design = Design {
            color: "#ff0000".into(),
            ..Design::default()
        };
        apply(&mut doc, EditCommand::SetDesign { design: design.clone() }).unwrap();
        assert_eq!(doc.design(), &design);
    }
}
