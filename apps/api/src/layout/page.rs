//! Fixed A4 page geometry shared by the renderer, the preview and both exporters.
//!
//! The on-screen document is laid out at 96 CSS px per inch, so the 210 mm page
//! width is 794 px and one page of content is 1123 px tall.

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// CSS px per millimetre at 96 dpi.
pub const PX_PER_MM: f32 = 96.0 / 25.4;

/// Content this close to one page still counts as one page.
pub const PAGE_TOLERANCE_MM: f32 = 2.0;

/// Native document width in CSS px.
pub const PAGE_WIDTH_PX: f32 = 794.0;

/// PDF points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

pub fn page_height_px() -> f32 {
    PAGE_HEIGHT_MM * PAGE_WIDTH_PX / PAGE_WIDTH_MM
}

pub fn px_to_mm(px: f32) -> f32 {
    px * PAGE_WIDTH_MM / PAGE_WIDTH_PX
}

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_height_px_is_a4_ratio() {
        let h = page_height_px();
        assert!((h - 1122.9).abs() < 0.5, "got {h}");
        assert!((PAGE_WIDTH_PX / PX_PER_MM - PAGE_WIDTH_MM).abs() < 0.1);
    }

    #[test]
    fn test_px_to_mm_full_width() {
        assert!((px_to_mm(PAGE_WIDTH_PX) - PAGE_WIDTH_MM).abs() < 1e-3);
    }

    #[test]
    fn test_a4_in_points() {
        assert!((mm_to_pt(PAGE_WIDTH_MM) - 595.28).abs() < 0.01);
        assert!((mm_to_pt(PAGE_HEIGHT_MM) - 841.89).abs() < 0.01);
    }
}
