// Export pipelines.
//
// Raster path:     VisualTree -> offscreen surface -> assets -> settle -> canvas -> JPEG -> paged PDF
// Structured path: Document   -> StructuredDocument -> DOCX
//
// The two paths never share intermediate state. CPU-bound stages (painting,
// encoding, PDF and DOCX packing) run inside tokio::task::spawn_blocking.

use thiserror::Error;

use crate::models::design::FontFamily;

pub mod assets;
pub mod docx;
pub mod paginate;
pub mod pdf;
pub mod raster;
pub mod structured;
pub mod surface;

pub use paginate::{plan_pages, PageMode, PagePlan, Placement};
pub use raster::{ExportSettings, RasterExporter};
pub use structured::{build_structured, StructuredDocument};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("capture produced no usable image ({bytes} bytes)")]
    EmptyCapture { bytes: usize },

    #[error("font {family:?} could not be loaded")]
    FontUnavailable { family: FontFamily },

    #[error("rasterization failed: {0}")]
    Raster(String),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF assembly failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("DOCX packing failed: {0}")]
    Docx(String),

    #[error("export task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}
