//! Uploaded assets (photos, signature images) in S3.

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

pub const MAX_ASSET_BYTES: usize = 5 * 1024 * 1024;

/// Maps an accepted content type to the stored file extension.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type.split(';').next().unwrap_or("").trim() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

pub fn asset_key(owner_id: Uuid, ext: &str) -> String {
    format!("assets/{owner_id}/{}.{ext}", Uuid::new_v4())
}

pub fn public_url(base: &str, bucket: &str, key: &str) -> String {
    format!("{}/{bucket}/{key}", base.trim_end_matches('/'))
}

/// Checks type and size before anything is sent to S3.
pub fn validate_asset(content_type: &str, len: usize) -> Result<&'static str, AppError> {
    let ext = extension_for(content_type).ok_or_else(|| {
        AppError::Validation(format!(
            "Unsupported asset type '{content_type}'; expected PNG, JPEG or WebP"
        ))
    })?;
    if len == 0 {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    if len > MAX_ASSET_BYTES {
        return Err(AppError::Validation(format!(
            "Uploaded file is {len} bytes; the limit is {MAX_ASSET_BYTES}"
        )));
    }
    Ok(ext)
}

/// Stores `bytes` and returns the public URL.
pub async fn upload_asset(
    s3: &S3Client,
    bucket: &str,
    public_base: &str,
    owner_id: Uuid,
    content_type: &str,
    bytes: Bytes,
) -> Result<String, AppError> {
    let ext = validate_asset(content_type, bytes.len())?;
    let key = asset_key(owner_id, ext);
    let size = bytes.len();

    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(bytes))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

    info!("Uploaded {size} bytes to s3://{bucket}/{key}");
    Ok(public_url(public_base, bucket, &key))
}
