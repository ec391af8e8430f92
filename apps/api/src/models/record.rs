use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::document::{Document, DocumentKind};

/// Raw row of the `documents` table. `data` holds the serialized `Document`.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub kind: String,
    pub title: String,
    pub template: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored document after decoding and normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub template: String,
    pub document: Document,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List view of a stored document.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub kind: String,
    pub title: String,
    pub template: String,
    pub updated_at: DateTime<Utc>,
}

impl DocumentRow {
    /// Decodes `data` into a `Document` and normalizes it.
    ///
    /// The row's `kind` column wins over whatever `kind` tag is inside `data`,
    /// so a record whose JSON predates the tag still loads.
    pub fn into_record(self) -> Result<DocumentRecord, serde_json::Error> {
        let mut data = self.data;
        if let (Value::Object(map), Some(kind)) = (&mut data, DocumentKind::parse(&self.kind)) {
            map.insert("kind".to_string(), Value::String(kind.as_str().to_string()));
        }
        let mut document: Document = serde_json::from_value(data)?;
        document.normalize();
        Ok(DocumentRecord {
            id: self.id,
            owner_id: self.owner_id,
            title: self.title,
            template: self.template,
            document,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
