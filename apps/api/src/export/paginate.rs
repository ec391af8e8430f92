//! Page planning for a captured bitmap.
//!
//! All values are millimetres on an A4 page, measured from the page's top-left
//! corner. The capture is always drawn full width (210 mm) unless it has to be
//! shrunk to fit a single page.

use crate::layout::page::{PAGE_HEIGHT_MM, PAGE_TOLERANCE_MM, PAGE_WIDTH_MM};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageMode {
    #[default]
    Natural,
    /// Always one page; overflowing content is scaled down uniformly.
    FitToOnePage,
}

/// Where the capture is drawn on one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x_mm: f32,
    /// Top edge of the image relative to the page top. Negative on
    /// continuation pages.
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub content_height_mm: f32,
    pub pages: Vec<Placement>,
}

impl PagePlan {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

pub fn plan_pages(image_width_px: u32, image_height_px: u32, mode: PageMode) -> PagePlan {
    let content_height_mm = if image_width_px == 0 {
        0.0
    } else {
        image_height_px as f32 * PAGE_WIDTH_MM / image_width_px as f32
    };

    let pages = match mode {
        PageMode::FitToOnePage if content_height_mm > PAGE_HEIGHT_MM => {
            let scale = PAGE_HEIGHT_MM / content_height_mm;
            let width_mm = PAGE_WIDTH_MM * scale;
            vec![Placement {
                x_mm: (PAGE_WIDTH_MM - width_mm) / 2.0,
                y_mm: 0.0,
                width_mm,
                height_mm: PAGE_HEIGHT_MM,
            }]
        }
        PageMode::FitToOnePage => vec![full_width(0.0, content_height_mm)],
        PageMode::Natural if content_height_mm <= PAGE_HEIGHT_MM + PAGE_TOLERANCE_MM => {
            vec![full_width(0.0, content_height_mm)]
        }
        PageMode::Natural => {
            let count = (content_height_mm / PAGE_HEIGHT_MM).ceil() as usize;
            (0..count)
                .map(|i| full_width(-(i as f32) * PAGE_HEIGHT_MM, content_height_mm))
                .collect()
        }
    };

    PagePlan {
        content_height_mm,
        pages,
    }
}

fn full_width(y_mm: f32, height_mm: f32) -> Placement {
    Placement {
        x_mm: 0.0,
        y_mm,
        width_mm: PAGE_WIDTH_MM,
        height_mm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Image height in px for `mm` of content at a 1588 px wide capture.
    fn px_for_mm(mm: f32) -> u32 {
        (mm * 1588.0 / PAGE_WIDTH_MM).round() as u32
    }

    #[test]
    fn test_short_content_is_one_page() {
        for mm in [10.0, 150.0, 297.0, 298.5] {
            let plan = plan_pages(1588, px_for_mm(mm), PageMode::Natural);
            assert_eq!(plan.page_count(), 1, "{mm}mm should fit on one page");
            assert_eq!(plan.pages[0].y_mm, 0.0);
        }
    }

    #[test]
    fn test_long_content_paginates_by_page_height() {
        for mm in [300.0, 594.0, 600.0, 1000.0] {
            let plan = plan_pages(1588, px_for_mm(mm), PageMode::Natural);
            let expected = (plan.content_height_mm / PAGE_HEIGHT_MM).ceil() as usize;
            assert_eq!(plan.page_count(), expected, "{mm}mm");
            for (i, page) in plan.pages.iter().enumerate() {
                assert!((page.y_mm + i as f32 * PAGE_HEIGHT_MM).abs() < 1e-3);
                assert_eq!(page.width_mm, PAGE_WIDTH_MM);
                assert!((page.height_mm - plan.content_height_mm).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_fit_to_one_page_always_one_page() {
        for mm in [50.0, 297.0, 400.0, 2000.0] {
            let plan = plan_pages(1588, px_for_mm(mm), PageMode::FitToOnePage);
            assert_eq!(plan.page_count(), 1, "{mm}mm");
            let page = plan.pages[0];
            assert!(page.height_mm <= PAGE_HEIGHT_MM + 1e-3);
            assert!(page.width_mm <= PAGE_WIDTH_MM + 1e-3);
        }
    }

    #[test]
    fn test_fit_to_one_page_scales_uniformly_and_centers() {
        let plan = plan_pages(1588, px_for_mm(594.0), PageMode::FitToOnePage);
        let page = plan.pages[0];
        assert!((page.width_mm - PAGE_WIDTH_MM / 2.0).abs() < 0.1);
        assert!((page.x_mm - PAGE_WIDTH_MM / 4.0).abs() < 0.1);
        assert_eq!(page.height_mm, PAGE_HEIGHT_MM);
    }

    #[test]
    fn test_zero_width_capture_does_not_divide_by_zero() {
        let plan = plan_pages(0, 100, PageMode::Natural);
        assert_eq!(plan.content_height_mm, 0.0);
        assert_eq!(plan.page_count(), 1);
    }
}
