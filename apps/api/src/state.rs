use aws_sdk_s3::Client as S3Client;
use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::config::Config;
use crate::export::RasterExporter;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Draft autosave snapshots.
    pub redis: RedisClient,
    /// Uploaded photos and signature images.
    pub s3: S3Client,
    pub llm: LlmClient,
    pub config: Config,
    /// Raster PDF pipeline; owns the offscreen surface registry.
    pub exporter: RasterExporter,
}
