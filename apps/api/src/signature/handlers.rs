//! Axum route handlers for signature capture.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::documents::store;
use crate::errors::AppError;
use crate::models::document::Document;
use crate::models::record::DocumentRecord;
use crate::models::signature::SignatureMode;
use crate::signature::replay::{replay, PadEvent, PadSpec};
use crate::state::AppState;

/// Longest event list accepted for a single session.
pub const MAX_EVENTS: usize = 20_000;

#[derive(Debug, Deserialize)]
pub struct StrokesRequest {
    #[serde(default)]
    pub pad: PadSpec,
    pub events: Vec<PadEvent>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentStrokesRequest {
    pub owner_id: Uuid,
    #[serde(default)]
    pub pad: PadSpec,
    pub events: Vec<PadEvent>,
}

#[derive(Debug, Serialize)]
pub struct StrokesResponse {
    /// `None` when the session ends with nothing committed.
    pub data_url: Option<String>,
}

async fn render_session(pad: PadSpec, events: Vec<PadEvent>) -> Result<Option<String>, AppError> {
    if events.len() > MAX_EVENTS {
        return Err(AppError::Validation(format!(
            "Too many pointer events ({}, limit {MAX_EVENTS})",
            events.len()
        )));
    }
    let pad = tokio::task::spawn_blocking(move || replay(pad, &events))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;
    Ok(pad.committed_data_url())
}

/// POST /api/v1/signature/strokes
pub async fn handle_render_strokes(Json(req): Json<StrokesRequest>) -> Result<Json<StrokesResponse>, AppError> {
    let data_url = render_session(req.pad, req.events).await?;
    Ok(Json(StrokesResponse { data_url }))
}

/// POST /api/v1/documents/:id/signature/strokes
///
/// Stores the result as the letter's drawn signature and makes it the
/// active one. An empty session removes the drawn signature.
pub async fn handle_store_strokes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DocumentStrokesRequest>,
) -> Result<Json<DocumentRecord>, AppError> {
    let record = store::get_document(&state.db, id, req.owner_id).await?;
    let Document::CoverLetter(mut letter) = record.document else {
        return Err(AppError::Validation(
            "Signatures can only be stored on cover letters".to_string(),
        ));
    };

    let data_url = render_session(req.pad, req.events).await?;
    letter.signature.drawn_image = data_url;
    letter.signature.set_mode(SignatureMode::Drawn);

    let saved = store::update_document(
        &state.db,
        id,
        req.owner_id,
        None,
        None,
        &Document::CoverLetter(letter),
    )
    .await?;
    info!("Stored drawn signature on document {id}");
    Ok(Json(saved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_session_renders_data_url() {
        let events: Vec<PadEvent> = serde_json::from_value(json!([
            {"type": "down", "x": 20.0, "y": 20.0, "pointer": "mouse"},
            {"type": "move", "x": 80.0, "y": 60.0, "pointer": "mouse"},
            {"type": "up", "pointer": "mouse"},
        ]))
        .unwrap();
        let url = render_session(PadSpec::default(), events).await.unwrap();
        assert!(url.unwrap().starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_empty_session_has_no_image() {
        assert_eq!(render_session(PadSpec::default(), vec![]).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_pad_is_rejected() {
        let pad = PadSpec {
            width: 0,
            ..PadSpec::default()
        };
        assert!(matches!(
            render_session(pad, vec![]).await,
            Err(AppError::Signature(_))
        ));
    }
}
