//! Fits the fixed-width document into a variable-width viewport.
//!
//! Scaling is a pure visual transform: the document keeps its native 794 px
//! geometry, so exports are never affected by how the preview is scaled.
//!
//! The preview endpoint applies `compute_scale` once per request. Clients that
//! track their container live (the editor pane) follow `ScaleObserver`: record
//! every resize, rescale at most once per animation frame. The server itself
//! never drives an observer; its tests pin the coalescing rules.

use crate::layout::page::PAGE_WIDTH_PX;

/// Horizontal breathing room reserved around the scaled page, in px.
pub const VIEWPORT_MARGIN_PX: f32 = 48.0;

/// The preview never shrinks below this factor.
pub const MIN_SCALE: f32 = 0.25;

/// `min(1, (available - margin) / page_width)`, floored at `MIN_SCALE`.
///
/// Monotonically non-decreasing in `available_width_px`; NaN, infinite and
/// negative widths resolve to the floor.
pub fn compute_scale(available_width_px: f32) -> f32 {
    if !available_width_px.is_finite() || available_width_px <= 0.0 {
        return MIN_SCALE;
    }
    let raw = (available_width_px - VIEWPORT_MARGIN_PX) / PAGE_WIDTH_PX;
    raw.clamp(MIN_SCALE, 1.0)
}

/// Tracks container resizes and applies at most one rescale per frame.
///
/// Resize notifications only record the newest width; `on_frame` derives the
/// scale from it. Any number of resizes between two frames collapse into one
/// recomputation, and a width that maps to the current scale reports nothing.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct ScaleObserver {
    pending_width: Option<f32>,
    current: f32,
}

#[allow(dead_code)]
impl Default for ScaleObserver {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl ScaleObserver {
    pub fn new() -> Self {
        Self {
            pending_width: None,
            current: 1.0,
        }
    }

    pub fn observe_resize(&mut self, available_width_px: f32) {
        self.pending_width = Some(available_width_px);
    }

    /// Returns the new scale when it changed since the last frame.
    pub fn on_frame(&mut self) -> Option<f32> {
        let width = self.pending_width.take()?;
        let next = compute_scale(width);
        if (next - self.current).abs() < f32::EPSILON {
            return None;
        }
        self.current = next;
        Some(next)
    }

    pub fn current(&self) -> f32 {
        self.current
    }
}
