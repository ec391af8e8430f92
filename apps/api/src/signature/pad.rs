//! Free-hand signature pad.
//!
//! Pointer coordinates arrive in display space and are remapped to the
//! canvas's native pixel size. A stroke begins on pointer-down, extends on
//! move and is committed as PNG on pointer-up, replacing any earlier drawing.
//!
//! A pointer may leave the canvas mid-stroke. Segments are clipped to the
//! canvas (grown by the pen radius) before they are stamped, so the work per
//! event is bounded by the canvas diagonal however far away the pointer went.
//! Non-finite coordinates are ignored.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageOutputFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::signature::SignatureMode;

pub const PEN_WIDTH_PX: f32 = 2.5;
pub const MAX_CANVAS_SIDE_PX: u32 = 2400;
/// Native coordinates are clamped to this magnitude before any geometry.
const COORD_LIMIT_PX: f32 = 1.0e6;
const INK: Rgba<u8> = Rgba([17, 24, 39, 255]);

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("canvas size must be non-zero, got {width}x{height}")]
    EmptyCanvas { width: u32, height: u32 },

    #[error("canvas {width}x{height} exceeds {max}px per side")]
    CanvasTooLarge { width: u32, height: u32, max: u32 },

    #[error("display size must be positive")]
    InvalidDisplay,

    #[error("pointer coordinates must be finite, got ({x}, {y})")]
    InvalidPoint { x: f32, y: f32 },

    #[error("encoding signature failed: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Mouse,
    Pen,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// What the caller should do with the originating input event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerResponse {
    /// Suppress default handling (page scroll on touch devices).
    pub suppress_default: bool,
}

#[derive(Debug, Clone)]
pub struct SignaturePad {
    mode: SignatureMode,
    canvas: RgbaImage,
    display_w: f32,
    display_h: f32,
    /// Last point of the active stroke, in native pixels.
    stroke: Option<Point>,
    committed: Option<Vec<u8>>,
}

impl SignaturePad {
    pub fn new(width: u32, height: u32, display_w: f32, display_h: f32) -> Result<Self, SignatureError> {
        if width == 0 || height == 0 {
            return Err(SignatureError::EmptyCanvas { width, height });
        }
        if width > MAX_CANVAS_SIDE_PX || height > MAX_CANVAS_SIDE_PX {
            return Err(SignatureError::CanvasTooLarge {
                width,
                height,
                max: MAX_CANVAS_SIDE_PX,
            });
        }
        if !(display_w.is_finite() && display_h.is_finite() && display_w > 0.0 && display_h > 0.0) {
            return Err(SignatureError::InvalidDisplay);
        }
        Ok(Self {
            mode: SignatureMode::Drawn,
            canvas: RgbaImage::new(width, height),
            display_w,
            display_h,
            stroke: None,
            committed: None,
        })
    }

    pub fn mode(&self) -> SignatureMode {
        self.mode
    }

    /// Switching modes never touches the canvas or the committed drawing.
    pub fn set_mode(&mut self, mode: SignatureMode) {
        self.mode = mode;
        self.stroke = None;
    }

    /// The pad is displayed at a different size, e.g. after a resize.
    pub fn set_display_size(&mut self, display_w: f32, display_h: f32) -> Result<(), SignatureError> {
        if !(display_w.is_finite() && display_h.is_finite() && display_w > 0.0 && display_h > 0.0) {
            return Err(SignatureError::InvalidDisplay);
        }
        self.display_w = display_w;
        self.display_h = display_h;
        Ok(())
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    fn to_native(&self, p: Point) -> Option<Point> {
        if !p.is_finite() {
            return None;
        }
        let x = p.x * self.canvas.width() as f32 / self.display_w;
        let y = p.y * self.canvas.height() as f32 / self.display_h;
        Some(Point {
            x: x.clamp(-COORD_LIMIT_PX, COORD_LIMIT_PX),
            y: y.clamp(-COORD_LIMIT_PX, COORD_LIMIT_PX),
        })
    }

    pub fn pointer_down(&mut self, at: Point, kind: PointerKind) -> PointerResponse {
        if self.mode != SignatureMode::Drawn {
            return PointerResponse::default();
        }
        let Some(p) = self.to_native(at) else {
            return PointerResponse::default();
        };
        self.stamp(p);
        self.stroke = Some(p);
        PointerResponse {
            suppress_default: kind == PointerKind::Touch,
        }
    }

    pub fn pointer_move(&mut self, at: Point, kind: PointerKind) -> PointerResponse {
        let Some(last) = self.stroke else {
            return PointerResponse::default();
        };
        let Some(p) = self.to_native(at) else {
            return PointerResponse::default();
        };
        self.segment(last, p);
        self.stroke = Some(p);
        PointerResponse {
            suppress_default: kind == PointerKind::Touch,
        }
    }

    /// Ends the stroke and commits the canvas.
    pub fn pointer_up(&mut self, kind: PointerKind) -> Result<PointerResponse, SignatureError> {
        if self.stroke.take().is_none() {
            return Ok(PointerResponse::default());
        }
        self.commit()?;
        Ok(PointerResponse {
            suppress_default: kind == PointerKind::Touch,
        })
    }

    /// Empties the canvas and drops the committed drawing.
    pub fn clear(&mut self) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
        self.stroke = None;
        self.committed = None;
    }

    pub fn committed_png(&self) -> Option<&[u8]> {
        self.committed.as_deref()
    }

    pub fn committed_data_url(&self) -> Option<String> {
        self.committed
            .as_ref()
            .map(|png| format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    fn commit(&mut self) -> Result<(), SignatureError> {
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(self.canvas.clone())
            .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)?;
        self.committed = Some(png);
        Ok(())
    }

    fn pen_radius() -> f32 {
        (PEN_WIDTH_PX / 2.0).round().max(1.0)
    }

    /// Canvas rectangle grown by the pen radius: anything outside leaves no ink.
    fn ink_bounds(&self) -> (Point, Point) {
        let r = Self::pen_radius();
        (
            Point { x: -r, y: -r },
            Point {
                x: self.canvas.width() as f32 - 1.0 + r,
                y: self.canvas.height() as f32 - 1.0 + r,
            },
        )
    }

    fn stamp(&mut self, p: Point) {
        let (min, max) = self.ink_bounds();
        if p.x < min.x || p.y < min.y || p.x > max.x || p.y > max.y {
            return;
        }
        draw_filled_circle_mut(
            &mut self.canvas,
            (p.x.round() as i32, p.y.round() as i32),
            Self::pen_radius() as i32,
            INK,
        );
    }

    /// Round-capped line from `a` to `b`, limited to the inkable area.
    fn segment(&mut self, a: Point, b: Point) {
        let (min, max) = self.ink_bounds();
        let Some((t0, t1)) = clip_segment(a, b, min, max) else {
            return;
        };
        let start = a.lerp(b, t0);
        let end = a.lerp(b, t1);
        let distance = ((end.x - start.x).powi(2) + (end.y - start.y).powi(2)).sqrt();
        let steps = (distance / (PEN_WIDTH_PX / 2.0)).ceil().max(1.0) as usize;
        for i in 0..=steps {
            self.stamp(start.lerp(end, i as f32 / steps as f32));
        }
    }
}

impl Point {
    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn lerp(self, to: Point, t: f32) -> Point {
        Point {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }
}

/// Liang-Barsky: the parameter range of `a -> b` inside the rectangle
/// `min..=max`, or `None` when the segment misses it.
fn clip_segment(a: Point, b: Point, min: Point, max: Point) -> Option<(f32, f32)> {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;
    for (p, q) in [
        (-dx, a.x - min.x),
        (dx, max.x - a.x),
        (-dy, a.y - min.y),
        (dy, max.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((t0, t1))
}
