//! CRUD over the `documents` table.
//!
//! Every query is scoped by `owner_id`; a document owned by someone else is
//! indistinguishable from a missing one.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::document::Document;
use crate::models::record::{DocumentRecord, DocumentRow, DocumentSummary};

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Document {id} not found"))
}

pub async fn create_document(
    pool: &PgPool,
    owner_id: Uuid,
    title: &str,
    template: &str,
    document: &Document,
) -> Result<DocumentRecord, AppError> {
    let id = Uuid::new_v4();
    let row: DocumentRow = sqlx::query_as(
        r#"
        INSERT INTO documents (id, owner_id, kind, title, template, data)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .bind(document.kind().as_str())
    .bind(title)
    .bind(template)
    .bind(serde_json::to_value(document)?)
    .fetch_one(pool)
    .await?;

    info!("Created {} document {id} for owner {owner_id}", document.kind().as_str());
    Ok(row.into_record()?)
}

/// Loads and normalizes one document.
pub async fn get_document(pool: &PgPool, id: Uuid, owner_id: Uuid) -> Result<DocumentRecord, AppError> {
    let row: Option<DocumentRow> =
        sqlx::query_as("SELECT * FROM documents WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.ok_or_else(|| not_found(id))?.into_record()?)
}

/// Newest first.
pub async fn list_documents(pool: &PgPool, owner_id: Uuid) -> Result<Vec<DocumentSummary>, AppError> {
    let rows = sqlx::query_as(
        r#"
        SELECT id, kind, title, template, updated_at
        FROM documents
        WHERE owner_id = $1
        ORDER BY updated_at DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Replaces the stored document. `title` and `template` are kept when `None`.
/// The kind of a stored document never changes.
pub async fn update_document(
    pool: &PgPool,
    id: Uuid,
    owner_id: Uuid,
    title: Option<&str>,
    template: Option<&str>,
    document: &Document,
) -> Result<DocumentRecord, AppError> {
    let row: Option<DocumentRow> = sqlx::query_as(
        r#"
        UPDATE documents
        SET data = $1,
            title = COALESCE($2, title),
            template = COALESCE($3, template),
            updated_at = now()
        WHERE id = $4 AND owner_id = $5 AND kind = $6
        RETURNING *
        "#,
    )
    .bind(serde_json::to_value(document)?)
    .bind(title)
    .bind(template)
    .bind(id)
    .bind(owner_id)
    .bind(document.kind().as_str())
    .fetch_optional(pool)
    .await?;

    let record = row.ok_or_else(|| not_found(id))?.into_record()?;
    info!("Saved document {id}");
    Ok(record)
}

pub async fn delete_document(pool: &PgPool, id: Uuid, owner_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }
    info!("Deleted document {id}");
    Ok(())
}
