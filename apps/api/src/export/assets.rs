//! Asset resolution for raster export.
//!
//! Images and the design font are loaded before capture. Each load is bounded
//! by a timeout; a failed or timed-out asset is logged and treated as loaded,
//! so a broken image can never hang an export.
//!
//! Image URLs come from user-edited documents. Remote images are fetched only
//! from the public asset root uploads are served from, without following
//! redirects, and never more than `MAX_ASSET_BYTES` of them.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::RgbaImage;
use reqwest::{redirect, Client, Url};
use tracing::{debug, warn};

use crate::export::surface::OffscreenSurface;
use crate::models::design::FontFamily;
use crate::storage::MAX_ASSET_BYTES;

/// Source of image and font bytes. Carried in `AppState` as `Arc<dyn AssetLoader>`.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    async fn load_image(&self, src: &str) -> Result<RgbaImage>;

    /// Raw TrueType bytes for `family`.
    async fn load_font(&self, family: FontFamily) -> Result<Vec<u8>>;
}

/// Loads `data:` URLs inline, uploaded assets over HTTP and fonts from a
/// local directory.
#[derive(Clone)]
pub struct HttpAssetLoader {
    client: Client,
    font_dir: PathBuf,
    /// Only URLs below this one are fetched. `None` when the configured root
    /// does not parse, which disables remote images altogether.
    asset_root: Option<Url>,
}

impl HttpAssetLoader {
    /// `asset_root` is the public URL prefix of uploaded assets, e.g.
    /// `http://localhost:9000/vitae/assets/`.
    pub fn new(font_dir: PathBuf, asset_root: &str) -> Self {
        let root = Url::parse(&format!("{}/", asset_root.trim_end_matches('/'))).ok();
        if root.is_none() {
            warn!("asset root '{asset_root}' is not a URL; remote images are disabled");
        }
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .redirect(redirect::Policy::none())
                .build()
                .expect("Failed to build HTTP client"),
            font_dir,
            asset_root: root,
        }
    }

    /// Same origin as the asset root and a path below it, after the URL
    /// parser has resolved any `..` segments.
    pub fn is_trusted(&self, src: &str) -> bool {
        let (Some(root), Ok(url)) = (&self.asset_root, Url::parse(src)) else {
            return false;
        };
        matches!(url.scheme(), "http" | "https")
            && url.origin() == root.origin()
            && url.path().starts_with(root.path())
    }

    async fn fetch(&self, src: &str) -> Result<Vec<u8>> {
        let mut response = self.client.get(src).send().await?.error_for_status()?;
        if response
            .content_length()
            .is_some_and(|len| len > MAX_ASSET_BYTES as u64)
        {
            bail!("image is larger than {MAX_ASSET_BYTES} bytes");
        }
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > MAX_ASSET_BYTES {
                bail!("image is larger than {MAX_ASSET_BYTES} bytes");
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait]
impl AssetLoader for HttpAssetLoader {
    async fn load_image(&self, src: &str) -> Result<RgbaImage> {
        let bytes = if src.starts_with("data:") {
            decode_data_url(src).ok_or_else(|| anyhow!("malformed data URL"))?
        } else if self.is_trusted(src) {
            self.fetch(src).await?
        } else if src.starts_with("http://") || src.starts_with("https://") {
            bail!("image host is not the asset store");
        } else {
            bail!("unsupported image source");
        };
        let img = image::load_from_memory(&bytes).context("undecodable image")?;
        Ok(img.to_rgba8())
    }

    async fn load_font(&self, family: FontFamily) -> Result<Vec<u8>> {
        let path = self.font_dir.join(family.font_file());
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))
    }
}

/// Payload of a base64 `data:` URL.
pub fn decode_data_url(src: &str) -> Option<Vec<u8>> {
    let rest = src.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    if !header.ends_with(";base64") {
        return None;
    }
    STANDARD.decode(payload.trim()).ok()
}

/// Everything the canvas needs that is not in the tree itself.
#[derive(Default)]
pub struct ResolvedAssets {
    pub images: HashMap<String, RgbaImage>,
    pub font: Option<Vec<u8>>,
}

/// Loads every image the surface references plus its font.
pub async fn resolve_assets(
    surface: &OffscreenSurface,
    loader: &dyn AssetLoader,
    timeout: Duration,
) -> ResolvedAssets {
    let mut assets = ResolvedAssets::default();
    let tree = surface.tree();

    for src in tree.image_sources() {
        match tokio::time::timeout(timeout, loader.load_image(&src)).await {
            Ok(Ok(img)) => {
                debug!(width = img.width(), height = img.height(), "image asset loaded");
                assets.images.insert(src, img);
            }
            Ok(Err(e)) => warn!("image asset failed, continuing without it: {e:#}"),
            Err(_) => warn!(timeout_ms = timeout.as_millis() as u64, "image asset timed out"),
        }
    }

    match tokio::time::timeout(timeout, loader.load_font(tree.font)).await {
        Ok(Ok(bytes)) => assets.font = Some(bytes),
        Ok(Err(e)) => warn!(font = ?tree.font, "font unavailable: {e:#}"),
        Err(_) => warn!(font = ?tree.font, "font load timed out"),
    }

    assets
}
