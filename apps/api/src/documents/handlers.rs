//! Axum route handlers for documents, drafts, previews, exports and assets.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::documents::{drafts, edits, store};
use crate::errors::AppError;
use crate::export::docx::write_docx;
use crate::export::paginate::{plan_pages, PageMode};
use crate::export::build_structured;
use crate::layout::flow::content_height;
use crate::layout::page::PAGE_WIDTH_PX;
use crate::layout::scaler::{compute_scale, VIEWPORT_MARGIN_PX};
use crate::models::document::{sanitize_file_stem, Document, DocumentKind};
use crate::models::record::{DocumentRecord, DocumentSummary};
use crate::render::html::scaled_preview;
use crate::render::{render_document, RenderOptions, TemplateChoice};
use crate::state::AppState;
use crate::storage::upload_asset;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub owner_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub owner_id: Uuid,
    pub kind: DocumentKind,
    pub title: Option<String>,
    pub template: Option<String>,
    /// Starts from the empty document when absent.
    pub document: Option<Document>,
}

#[derive(Debug, Deserialize)]
pub struct SaveDocumentRequest {
    pub owner_id: Uuid,
    pub title: Option<String>,
    pub template: Option<String>,
    pub document: Document,
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub owner_id: Uuid,
    pub commands: Vec<edits::EditCommand>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub owner_id: Uuid,
    pub template: Option<String>,
    pub viewport_width: Option<f32>,
    pub markers: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub html: String,
    pub scale: f32,
    pub content_height_px: f32,
    pub page_count: usize,
    pub template: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct PdfQuery {
    pub owner_id: Uuid,
    pub template: Option<String>,
    #[serde(default)]
    pub fit_one_page: bool,
}

#[derive(Debug, Deserialize)]
pub struct SaveDraftRequest {
    pub owner_id: Uuid,
    pub document: Document,
}

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub document: Option<Document>,
}

#[derive(Debug, Serialize)]
pub struct AssetResponse {
    pub url: String,
}

fn parse_kind(raw: &str) -> Result<DocumentKind, AppError> {
    DocumentKind::parse(raw).ok_or_else(|| AppError::Validation(format!("Unknown document kind '{raw}'")))
}

fn default_title(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Resume => "Untitled résumé",
        DocumentKind::CoverLetter => "Untitled cover letter",
    }
}

/// Download name from the document title; the person's name and kind when
/// the title has nothing usable in it.
fn download_name(record: &DocumentRecord, extension: &str) -> String {
    let stem = sanitize_file_stem(&record.title);
    if stem.is_empty() {
        format!("{}.{extension}", record.document.file_stem())
    } else {
        format!("{stem}.{extension}")
    }
}

fn attachment(bytes: Vec<u8>, content_type: &'static str, filename: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

// ────────────────────────────────────────────────────────────────────────────
// Documents
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/documents
pub async fn handle_list_documents(
    State(state): State<AppState>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<Vec<DocumentSummary>>, AppError> {
    Ok(Json(store::list_documents(&state.db, params.owner_id).await?))
}

/// POST /api/v1/documents
///
/// Creating a document discards the autosaved draft of the same kind.
pub async fn handle_create_document(
    State(state): State<AppState>,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentRecord>), AppError> {
    let mut document = req.document.unwrap_or_else(|| Document::initial(req.kind));
    if document.kind() != req.kind {
        return Err(AppError::Validation(format!(
            "Document body is a {} but kind is {}",
            document.kind().as_str(),
            req.kind.as_str()
        )));
    }
    document.normalize();

    let title = req
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(default_title(req.kind));
    let template = TemplateChoice::parse(req.kind, req.template.as_deref()).tag();

    let record = store::create_document(&state.db, req.owner_id, title, template, &document).await?;

    if let Err(e) = drafts::clear_draft(&state.redis, req.owner_id, req.kind).await {
        warn!("Could not clear {} draft for {}: {e}", req.kind.as_str(), req.owner_id);
    }

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/v1/documents/:id
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<DocumentRecord>, AppError> {
    Ok(Json(store::get_document(&state.db, id, params.owner_id).await?))
}

/// PUT /api/v1/documents/:id
pub async fn handle_save_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SaveDocumentRequest>,
) -> Result<Json<DocumentRecord>, AppError> {
    let mut document = req.document;
    document.normalize();
    let template = req
        .template
        .as_deref()
        .map(|t| TemplateChoice::parse(document.kind(), Some(t)).tag());

    let record = store::update_document(
        &state.db,
        id,
        req.owner_id,
        req.title.as_deref().map(str::trim).filter(|t| !t.is_empty()),
        template,
        &document,
    )
    .await?;
    Ok(Json(record))
}

/// DELETE /api/v1/documents/:id
pub async fn handle_delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
) -> Result<StatusCode, AppError> {
    store::delete_document(&state.db, id, params.owner_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/documents/:id/edits
///
/// The whole batch is applied or none of it is.
pub async fn handle_apply_edits(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EditRequest>,
) -> Result<Json<DocumentRecord>, AppError> {
    let record = store::get_document(&state.db, id, req.owner_id).await?;
    let mut document = record.document;
    let count = req.commands.len();
    edits::apply_all(&mut document, req.commands)?;

    let saved = store::update_document(&state.db, id, req.owner_id, None, None, &document).await?;
    info!("Applied {count} edits to document {id}");
    Ok(Json(saved))
}

// ────────────────────────────────────────────────────────────────────────────
// Preview & export
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/documents/:id/preview
///
/// Returns the scaled live preview. Page-break markers are on by default.
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PreviewQuery>,
) -> Result<Json<PreviewResponse>, AppError> {
    let record = store::get_document(&state.db, id, params.owner_id).await?;
    let tag = params.template.unwrap_or(record.template);
    let choice = TemplateChoice::parse(record.document.kind(), Some(&tag));
    let scale = compute_scale(
        params
            .viewport_width
            .unwrap_or(PAGE_WIDTH_PX + VIEWPORT_MARGIN_PX),
    );
    let markers = params.markers.unwrap_or(true);
    let options = RenderOptions::dated(Utc::now().date_naive());

    let (html, height) = tokio::task::spawn_blocking(move || {
        let tree = render_document(&record.document, Some(choice.tag()), &options);
        let height = content_height(&tree);
        let tree = if markers {
            tree.with_page_markers(height)
        } else {
            tree
        };
        (scaled_preview(&tree, scale, height), height)
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?;

    let page_count = plan_pages(PAGE_WIDTH_PX as u32, height.ceil() as u32, PageMode::Natural).page_count();

    Ok(Json(PreviewResponse {
        html,
        scale,
        content_height_px: height,
        page_count,
        template: choice.tag(),
    }))
}

/// GET /api/v1/documents/:id/export/pdf
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PdfQuery>,
) -> Result<Response, AppError> {
    let record = store::get_document(&state.db, id, params.owner_id).await?;
    let filename = download_name(&record, "pdf");
    let tag = params.template.unwrap_or(record.template);
    let tree = render_document(
        &record.document,
        Some(&tag),
        &RenderOptions::dated(Utc::now().date_naive()),
    );
    let mode = if params.fit_one_page {
        PageMode::FitToOnePage
    } else {
        PageMode::Natural
    };

    let pdf = state.exporter.export(&tree, mode).await?;
    info!("Exported document {id} as PDF ({} bytes)", pdf.len());
    Ok(attachment(pdf, "application/pdf", filename))
}

/// GET /api/v1/documents/:id/export/docx
pub async fn handle_export_docx(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
) -> Result<Response, AppError> {
    let record = store::get_document(&state.db, id, params.owner_id).await?;
    let filename = download_name(&record, "docx");
    let structured = build_structured(&record.document, Utc::now().date_naive());

    let bytes = tokio::task::spawn_blocking(move || write_docx(&structured))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;
    info!("Exported document {id} as DOCX ({} bytes)", bytes.len());
    Ok(attachment(
        bytes,
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        filename,
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Drafts
// ────────────────────────────────────────────────────────────────────────────

/// PUT /api/v1/drafts/:kind
pub async fn handle_save_draft(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(req): Json<SaveDraftRequest>,
) -> Result<StatusCode, AppError> {
    let kind = parse_kind(&kind)?;
    if req.document.kind() != kind {
        return Err(AppError::Validation(format!(
            "Draft body is a {} but the path says {}",
            req.document.kind().as_str(),
            kind.as_str()
        )));
    }
    drafts::save_draft(&state.redis, req.owner_id, &req.document).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/drafts/:kind
pub async fn handle_load_draft(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<DraftResponse>, AppError> {
    let kind = parse_kind(&kind)?;
    let document = drafts::load_draft(&state.redis, params.owner_id, kind).await?;
    Ok(Json(DraftResponse { document }))
}

/// DELETE /api/v1/drafts/:kind
pub async fn handle_clear_draft(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<OwnerQuery>,
) -> Result<StatusCode, AppError> {
    let kind = parse_kind(&kind)?;
    drafts::clear_draft(&state.redis, params.owner_id, kind).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Assets
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assets
///
/// Expects a multipart form with a single `file` field.
pub async fn handle_upload_asset(
    State(state): State<AppState>,
    Query(params): Query<OwnerQuery>,
    mut multipart: Multipart,
) -> Result<Json<AssetResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?;

        let url = upload_asset(
            &state.s3,
            &state.config.s3_bucket,
            &state.config.s3_public_url,
            params.owner_id,
            &content_type,
            bytes,
        )
        .await?;
        return Ok(Json(AssetResponse { url }));
    }
    Err(AppError::Validation("Missing 'file' field".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_path_segment() {
        assert_eq!(parse_kind("resume").unwrap(), DocumentKind::Resume);
        assert_eq!(parse_kind("cover-letter").unwrap(), DocumentKind::CoverLetter);
        assert!(matches!(parse_kind("memo"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_attachment_headers() {
        let response = attachment(vec![1, 2, 3], "application/pdf", "Ada_resume.pdf".into());
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Ada_resume.pdf\""
        );
    }

    fn record_titled(title: &str, full_name: &str) -> DocumentRecord {
        let mut resume = crate::models::document::Resume::default();
        resume.personal.full_name = full_name.to_string();
        DocumentRecord {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: title.to_string(),
            template: "modern".to_string(),
            document: Document::Resume(resume),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_download_named_from_title() {
        let record = record_titled("Acme Backend Résumé", "Ada Lovelace");
        assert_eq!(download_name(&record, "pdf"), "Acme_Backend_Resume.pdf");
        assert_eq!(download_name(&record, "docx"), "Acme_Backend_Resume.docx");

        let response = attachment(vec![0], "application/pdf", download_name(&record, "pdf"));
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Acme_Backend_Resume.pdf\""
        );
    }

    #[test]
    fn test_unusable_title_falls_back_to_name_and_kind() {
        let record = record_titled("★ ★", "Ada Lovelace");
        assert_eq!(download_name(&record, "pdf"), "Ada_Lovelace_resume.pdf");
        let anonymous = record_titled("", "");
        assert_eq!(download_name(&anonymous, "docx"), "resume.docx");
    }

    #[test]
    fn test_pdf_query_defaults_to_natural_pages() {
        let q: PdfQuery =
            serde_json::from_value(serde_json::json!({"owner_id": Uuid::nil()})).unwrap();
        assert!(!q.fit_one_page);
        assert!(q.template.is_none());
    }
}
