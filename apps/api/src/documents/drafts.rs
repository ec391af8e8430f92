//! Autosaved draft snapshots in Redis.
//!
//! One snapshot per (owner, kind), overwritten on every save and expiring
//! after a week. Used to recover a new document that was never saved.

use redis::AsyncCommands;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::document::{Document, DocumentKind};

pub const DRAFT_TTL_SECS: u64 = 7 * 24 * 60 * 60;

pub fn draft_key(owner_id: Uuid, kind: DocumentKind) -> String {
    format!("vitae:draft:{owner_id}:{}", kind.as_str())
}

pub async fn save_draft(client: &redis::Client, owner_id: Uuid, document: &Document) -> Result<(), AppError> {
    let key = draft_key(owner_id, document.kind());
    let payload = serde_json::to_string(document)?;
    let mut conn = client.get_multiplexed_async_connection().await?;
    redis::cmd("SET")
        .arg(&key)
        .arg(payload)
        .arg("EX")
        .arg(DRAFT_TTL_SECS)
        .query_async::<_, ()>(&mut conn)
        .await?;
    debug!("Draft saved under {key}");
    Ok(())
}

/// The snapshot for (owner, kind), normalized. An unreadable snapshot is
/// treated as absent.
pub async fn load_draft(
    client: &redis::Client,
    owner_id: Uuid,
    kind: DocumentKind,
) -> Result<Option<Document>, AppError> {
    let key = draft_key(owner_id, kind);
    let mut conn = client.get_multiplexed_async_connection().await?;
    let payload: Option<String> = conn.get(&key).await?;
    Ok(payload.and_then(|raw| decode_draft(&raw, kind)))
}

pub async fn clear_draft(client: &redis::Client, owner_id: Uuid, kind: DocumentKind) -> Result<(), AppError> {
    let key = draft_key(owner_id, kind);
    let mut conn = client.get_multiplexed_async_connection().await?;
    conn.del::<_, ()>(&key).await?;
    debug!("Draft {key} cleared");
    Ok(())
}

fn decode_draft(raw: &str, kind: DocumentKind) -> Option<Document> {
    match serde_json::from_str::<Document>(raw) {
        Ok(mut document) if document.kind() == kind => {
            document.normalize();
            Some(document)
        }
        Ok(_) => {
            warn!("Draft stored under {} has the wrong kind", kind.as_str());
            None
        }
        Err(e) => {
            warn!("Discarding unreadable draft: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_per_owner_and_kind() {
        let owner = Uuid::new_v4();
        assert_ne!(
            draft_key(owner, DocumentKind::Resume),
            draft_key(owner, DocumentKind::CoverLetter)
        );
        assert_ne!(
            draft_key(owner, DocumentKind::Resume),
            draft_key(Uuid::new_v4(), DocumentKind::Resume)
        );
    }

    #[test]
    fn test_decode_normalizes_and_checks_kind() {
        let raw = r#"{"kind": "resume", "skills": ["Rust", "rust"], "experience": [{"company": "Acme"}]}"#;
        let Some(Document::Resume(resume)) = decode_draft(raw, DocumentKind::Resume) else {
            panic!("expected a résumé draft");
        };
        assert_eq!(resume.skills, vec!["Rust"]);
        assert!(!resume.experience[0].id.is_nil());
        assert!(decode_draft(raw, DocumentKind::CoverLetter).is_none());
        assert!(decode_draft("{not json", DocumentKind::Resume).is_none());
    }
}
