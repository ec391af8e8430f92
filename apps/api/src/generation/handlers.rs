//! Axum route handlers for the Generation API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::documents::store;
use crate::errors::AppError;
use crate::generation::generator::generate;
use crate::models::record::DocumentRecord;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub owner_id: Uuid,
    pub job_description: String,
}

/// POST /api/v1/documents/:id/generate
///
/// Rewrites the document for a job description. The stored document is only
/// replaced when generation and merge both succeeded.
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<DocumentRecord>, AppError> {
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation("job_description cannot be empty".to_string()));
    }

    let record = store::get_document(&state.db, id, request.owner_id).await?;
    info!(
        "Generating {} content for document {id}",
        record.document.kind().as_str()
    );

    let merged = generate(&state.llm, &request.job_description, &record.document).await?;
    let saved = store::update_document(&state.db, id, request.owner_id, None, None, &merged).await?;

    info!("Generated content saved to document {id}");
    Ok(Json(saved))
}
