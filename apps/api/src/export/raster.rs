//! Raster export: mount, resolve assets, settle, capture, paginate.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{Rgb as Pixel, RgbImage, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect as PixelRect;
use rusttype::{Font, Scale};
use tracing::{debug, info, warn};

use crate::export::assets::{resolve_assets, AssetLoader, ResolvedAssets};
use crate::export::paginate::{plan_pages, PageMode};
use crate::export::pdf::write_pdf;
use crate::export::surface::SurfaceRegistry;
use crate::export::ExportError;
use crate::layout::flow::{layout_tree, Placed, Rect};
use crate::models::design::Rgb;
use crate::render::tree::VisualTree;

/// Device pixels per CSS pixel in the capture.
pub const OVERSAMPLING: f32 = 2.0;
pub const JPEG_QUALITY: u8 = 92;
/// Anything smaller than this is a failed capture, not an empty document.
pub const MIN_CAPTURE_BYTES: usize = 2048;
/// Baseline JPEG stores each side in 16 bits.
pub const MAX_JPEG_SIDE_PX: f32 = 65_535.0;

#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub asset_timeout: Duration,
    pub settle: Duration,
    pub oversampling: f32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            asset_timeout: Duration::from_millis(5000),
            settle: Duration::from_millis(250),
            oversampling: OVERSAMPLING,
        }
    }
}

/// Turns a mounted tree into an opaque bitmap.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(
        &self,
        tree: &VisualTree,
        assets: ResolvedAssets,
        scale: f32,
    ) -> Result<RgbImage, ExportError>;
}

/// Paints the flow layout with `image`/`imageproc`. Text needs the design
/// font; without it the export fails instead of producing a PDF with no
/// readable words.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanvasRasterizer;

#[async_trait]
impl Rasterizer for CanvasRasterizer {
    async fn rasterize(
        &self,
        tree: &VisualTree,
        mut assets: ResolvedAssets,
        scale: f32,
    ) -> Result<RgbImage, ExportError> {
        let family = tree.font;
        let font = assets
            .font
            .take()
            .and_then(Font::try_from_vec)
            .ok_or(ExportError::FontUnavailable { family })?;
        let tree = tree.clone();
        tokio::task::spawn_blocking(move || paint(&tree, &assets, scale, TextInk::Glyphs(&font))).await?
    }
}

/// How text lines reach the canvas.
#[derive(Clone, Copy)]
enum TextInk<'f> {
    Glyphs(&'f Font<'static>),
    /// Solid bars of the measured line width, for captures without font files.
    #[cfg(test)]
    Bars,
}

/// Oversampling lowered so that neither side of the bitmap passes the JPEG limit.
fn capped_scale(width_px: f32, height_px: f32, scale: f32) -> f32 {
    let longest = width_px.max(height_px);
    if longest * scale < MAX_JPEG_SIDE_PX {
        scale
    } else {
        (MAX_JPEG_SIDE_PX - 1.0) / longest
    }
}

fn px(c: Rgb) -> Pixel<u8> {
    Pixel([c.0, c.1, c.2])
}

// `width_px` of a text line is only read by the bar painter.
#[cfg_attr(not(test), allow(unused_variables))]
fn paint(tree: &VisualTree, assets: &ResolvedAssets, scale: f32, ink: TextInk<'_>) -> Result<RgbImage, ExportError> {
    let layout = layout_tree(tree);
    let requested = scale;
    let scale = capped_scale(layout.width_px, layout.height_px, requested);
    if scale < requested {
        warn!(
            height_px = layout.height_px,
            requested, scale, "document too tall for full oversampling"
        );
    }
    let width = (layout.width_px * scale).round() as u32;
    let height = (layout.height_px * scale).round() as u32;
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyCapture { bytes: 0 });
    }

    // Opaque white regardless of what the tree paints.
    let mut canvas = RgbImage::from_pixel(width, height, Pixel([255, 255, 255]));
    for item in &layout.items {
        match item {
            Placed::Fill {
                rect,
                color,
                radius_px,
            } => fill_rounded(&mut canvas, scaled(rect, scale), radius_px * scale, px(*color)),
            Placed::TextLine {
                x,
                y,
                width_px,
                text,
                size_px,
                line_height_px,
                color,
                ..
            } => {
                let top = y + (line_height_px - size_px) / 2.0;
                match ink {
                    TextInk::Glyphs(font) => draw_text_mut(
                        &mut canvas,
                        px(*color),
                        (x * scale).round() as i32,
                        (top * scale).round() as i32,
                        Scale::uniform(size_px * scale),
                        font,
                        text,
                    ),
                    #[cfg(test)]
                    TextInk::Bars => fill_rounded(
                        &mut canvas,
                        scaled(
                            &Rect {
                                x: *x,
                                y: top + size_px * 0.2,
                                w: *width_px,
                                h: size_px * 0.6,
                            },
                            scale,
                        ),
                        0.0,
                        px(*color),
                    ),
                }
            }
            Placed::Image { rect, src, .. } => {
                if let Some(img) = assets.images.get(src) {
                    blit(&mut canvas, img, scaled(rect, scale));
                }
            }
        }
    }
    Ok(canvas)
}

fn scaled(rect: &Rect, scale: f32) -> Rect {
    Rect {
        x: rect.x * scale,
        y: rect.y * scale,
        w: rect.w * scale,
        h: rect.h * scale,
    }
}

fn fill_rounded(canvas: &mut RgbImage, rect: Rect, radius: f32, color: Pixel<u8>) {
    let (x, y) = (rect.x.round() as i32, rect.y.round() as i32);
    let (w, h) = (rect.w.round() as i32, rect.h.round() as i32);
    if w <= 0 || h <= 0 {
        return;
    }
    let r = (radius.round() as i32).min(w / 2).min(h / 2).max(0);
    if r == 0 {
        draw_filled_rect_mut(canvas, PixelRect::at(x, y).of_size(w as u32, h as u32), color);
        return;
    }
    if h > 2 * r {
        draw_filled_rect_mut(
            canvas,
            PixelRect::at(x, y + r).of_size(w as u32, (h - 2 * r) as u32),
            color,
        );
    }
    if w > 2 * r {
        draw_filled_rect_mut(
            canvas,
            PixelRect::at(x + r, y).of_size((w - 2 * r) as u32, h as u32),
            color,
        );
    }
    for (cx, cy) in [
        (x + r, y + r),
        (x + w - r - 1, y + r),
        (x + r, y + h - r - 1),
        (x + w - r - 1, y + h - r - 1),
    ] {
        draw_filled_circle_mut(canvas, (cx, cy), r, color);
    }
}

/// Alpha-composites `img` into `rect`, resized to fit.
fn blit(canvas: &mut RgbImage, img: &RgbaImage, rect: Rect) {
    let (w, h) = (rect.w.round() as u32, rect.h.round() as u32);
    if w == 0 || h == 0 {
        return;
    }
    let resized = imageops::resize(img, w, h, FilterType::Triangle);
    let (ox, oy) = (rect.x.round() as i64, rect.y.round() as i64);
    for (ix, iy, pixel) in resized.enumerate_pixels() {
        let (cx, cy) = (ox + ix as i64, oy + iy as i64);
        if cx < 0 || cy < 0 || cx >= canvas.width() as i64 || cy >= canvas.height() as i64 {
            continue;
        }
        let alpha = pixel.0[3] as f32 / 255.0;
        let dst = canvas.get_pixel_mut(cx as u32, cy as u32);
        for c in 0..3 {
            let blended = pixel.0[c] as f32 * alpha + dst.0[c] as f32 * (1.0 - alpha);
            dst.0[c] = blended.round() as u8;
        }
    }
}

/// JPEG-encoded capture.
#[derive(Debug, Clone)]
pub struct Capture {
    pub jpeg: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

pub async fn encode_capture(bitmap: RgbImage) -> Result<Capture, ExportError> {
    let (width_px, height_px) = bitmap.dimensions();
    if width_px == 0 || height_px == 0 {
        return Err(ExportError::EmptyCapture { bytes: 0 });
    }
    let jpeg = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ExportError> {
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&bitmap)?;
        Ok(out)
    })
    .await??;

    if jpeg.len() < MIN_CAPTURE_BYTES {
        return Err(ExportError::EmptyCapture { bytes: jpeg.len() });
    }
    Ok(Capture {
        jpeg,
        width_px,
        height_px,
    })
}

/// The raster export pipeline. One instance is shared by all requests; every
/// call mounts and releases its own surface.
#[derive(Clone)]
pub struct RasterExporter {
    registry: Arc<SurfaceRegistry>,
    loader: Arc<dyn AssetLoader>,
    rasterizer: Arc<dyn Rasterizer>,
    settings: ExportSettings,
}

impl RasterExporter {
    pub fn new(
        registry: Arc<SurfaceRegistry>,
        loader: Arc<dyn AssetLoader>,
        rasterizer: Arc<dyn Rasterizer>,
        settings: ExportSettings,
    ) -> Self {
        Self {
            registry,
            loader,
            rasterizer,
            settings,
        }
    }

    pub fn registry(&self) -> &Arc<SurfaceRegistry> {
        &self.registry
    }

    /// Renders `tree` to PDF bytes.
    pub async fn export(&self, tree: &VisualTree, mode: PageMode) -> Result<Vec<u8>, ExportError> {
        let surface = self.registry.mount(tree);
        debug!(surface = %surface.id(), "export started");

        let assets = resolve_assets(&surface, self.loader.as_ref(), self.settings.asset_timeout).await;
        debug!(images = assets.images.len(), font = assets.font.is_some(), "assets resolved");

        tokio::time::sleep(self.settings.settle).await;

        let bitmap = self
            .rasterizer
            .rasterize(surface.tree(), assets, self.settings.oversampling)
            .await?;
        drop(surface);

        let capture = encode_capture(bitmap).await?;
        let plan = plan_pages(capture.width_px, capture.height_px, mode);
        info!(
            width = capture.width_px,
            height = capture.height_px,
            bytes = capture.jpeg.len(),
            pages = plan.page_count(),
            ?mode,
            "capture paginated"
        );

        let Capture {
            jpeg,
            width_px,
            height_px,
        } = capture;
        tokio::task::spawn_blocking(move || write_pdf(jpeg, width_px, height_px, &plan)).await?
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::bail;

    use super::*;
    use crate::layout::page::page_height_px;
    use crate::models::design::FontFamily;
    use crate::render::tree::{BoxNode, Edges, Node, TextNode};

    struct NoAssets;

    #[async_trait]
    impl AssetLoader for NoAssets {
        async fn load_image(&self, _src: &str) -> anyhow::Result<RgbaImage> {
            bail!("offline")
        }

        async fn load_font(&self, _family: FontFamily) -> anyhow::Result<Vec<u8>> {
            bail!("offline")
        }
    }

    /// Remembers the tree it was handed, then paints like the real one.
    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<VisualTree>>,
    }

    #[async_trait]
    impl Rasterizer for Recording {
        async fn rasterize(
            &self,
            tree: &VisualTree,
            assets: ResolvedAssets,
            scale: f32,
        ) -> Result<RgbImage, ExportError> {
            self.seen.lock().unwrap().push(tree.clone());
            InkBars.rasterize(tree, assets, scale).await
        }
    }

    /// The canvas painter with text drawn as bars.
    struct InkBars;

    #[async_trait]
    impl Rasterizer for InkBars {
        async fn rasterize(
            &self,
            tree: &VisualTree,
            assets: ResolvedAssets,
            scale: f32,
        ) -> Result<RgbImage, ExportError> {
            let tree = tree.clone();
            tokio::task::spawn_blocking(move || paint(&tree, &assets, scale, TextInk::Bars)).await?
        }
    }

    struct Failing;

    #[async_trait]
    impl Rasterizer for Failing {
        async fn rasterize(
            &self,
            _tree: &VisualTree,
            _assets: ResolvedAssets,
            _scale: f32,
        ) -> Result<RgbImage, ExportError> {
            Err(ExportError::Raster("canvas lost".into()))
        }
    }

    fn tree_of_height(pages: f32) -> VisualTree {
        let mut root = BoxNode::column("page")
            .padding(Edges::all(40.0))
            .gap(12.0)
            .background(Rgb::WHITE);
        for i in 0..8 {
            root = root.child(TextNode::new(format!("Line {i} of content"), 13.0, Rgb::INK, 1.5));
        }
        root = root.child(Node::Spacer(page_height_px() * pages));
        let tree = VisualTree::new(FontFamily::Inter, root);
        let height = crate::layout::flow::content_height(&tree);
        tree.with_page_markers(height)
    }

    fn exporter(rasterizer: Arc<dyn Rasterizer>) -> RasterExporter {
        RasterExporter::new(
            SurfaceRegistry::new(),
            Arc::new(NoAssets),
            rasterizer,
            ExportSettings {
                asset_timeout: Duration::from_millis(10),
                settle: Duration::ZERO,
                oversampling: 1.0,
            },
        )
    }

    fn pages_in(bytes: &[u8]) -> usize {
        lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[tokio::test]
    async fn test_long_document_exports_multiple_pages() {
        let exporter = exporter(Arc::new(InkBars));
        let tree = tree_of_height(2.2);
        let natural = exporter.export(&tree, PageMode::Natural).await.unwrap();
        assert_eq!(pages_in(&natural), 3);
        let fitted = exporter.export(&tree, PageMode::FitToOnePage).await.unwrap();
        assert_eq!(pages_in(&fitted), 1);
        assert_eq!(exporter.registry().active(), 0);
    }

    #[tokio::test]
    async fn test_capture_never_contains_page_markers() {
        let recording = Arc::new(Recording::default());
        let exporter = exporter(recording.clone());
        let tree = tree_of_height(1.5);
        assert!(tree.page_marker_count() > 0, "fixture carries markers");
        exporter.export(&tree, PageMode::Natural).await.unwrap();
        let seen = recording.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].page_marker_count(), 0);
    }

    #[tokio::test]
    async fn test_surface_released_on_failure() {
        let exporter = exporter(Arc::new(Failing));
        let err = exporter
            .export(&tree_of_height(0.5), PageMode::Natural)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Raster(_)));
        assert_eq!(exporter.registry().active(), 0);
    }

    #[tokio::test]
    async fn test_empty_tree_is_a_failed_capture() {
        let exporter = exporter(Arc::new(InkBars));
        let empty = VisualTree::new(FontFamily::Inter, BoxNode::column("page"));
        let err = exporter.export(&empty, PageMode::Natural).await.unwrap_err();
        assert!(matches!(err, ExportError::EmptyCapture { .. }));
    }

    #[tokio::test]
    async fn test_export_is_deterministic() {
        let exporter = exporter(Arc::new(InkBars));
        let tree = tree_of_height(0.8);
        let a = exporter.export(&tree, PageMode::Natural).await.unwrap();
        let b = exporter.export(&tree, PageMode::Natural).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_missing_font_fails_the_export() {
        let exporter = exporter(Arc::new(CanvasRasterizer));
        let err = exporter
            .export(&tree_of_height(0.5), PageMode::Natural)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::FontUnavailable {
                family: FontFamily::Inter
            }
        ));
        assert_eq!(exporter.registry().active(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_font_fails_the_export() {
        let assets = ResolvedAssets {
            font: Some(b"not a font".to_vec()),
            ..ResolvedAssets::default()
        };
        let err = CanvasRasterizer
            .rasterize(&tree_of_height(0.5), assets, 1.0)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::FontUnavailable { .. }));
    }

    #[test]
    fn test_oversampling_capped_for_very_tall_documents() {
        assert_eq!(capped_scale(794.0, 3000.0, 2.0), 2.0);
        let tall = page_height_px() * 40.0;
        let scale = capped_scale(794.0, tall, 2.0);
        assert!(scale < 2.0);
        assert!((tall * scale).round() <= MAX_JPEG_SIDE_PX);
        assert!(((794.0 * scale).round() as u32) > 0);
    }

    #[test]
    fn test_rounded_fill_stays_inside_rect() {
        let mut canvas = RgbImage::from_pixel(20, 20, Pixel([255, 255, 255]));
        fill_rounded(
            &mut canvas,
            Rect {
                x: 5.0,
                y: 5.0,
                w: 10.0,
                h: 10.0,
            },
            3.0,
            Pixel([0, 0, 0]),
        );
        assert_eq!(canvas.get_pixel(10, 10), &Pixel([0, 0, 0]));
        assert_eq!(canvas.get_pixel(5, 5), &Pixel([255, 255, 255]), "corner rounded off");
        assert_eq!(canvas.get_pixel(4, 10), &Pixel([255, 255, 255]));
    }
}
