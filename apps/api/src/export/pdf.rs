//! PDF assembly for a paged capture.
//!
//! The JPEG capture is embedded once as a DCTDecode image XObject and every
//! page draws that same object at its own offset.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::export::paginate::PagePlan;
use crate::export::ExportError;
use crate::layout::page::{mm_to_pt, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};

const IMAGE_NAME: &[u8] = b"Capture";

pub fn write_pdf(
    jpeg: Vec<u8>,
    width_px: u32,
    height_px: u32,
    plan: &PagePlan,
) -> Result<Vec<u8>, ExportError> {
    let page_w = mm_to_pt(PAGE_WIDTH_MM);
    let page_h = mm_to_pt(PAGE_HEIGHT_MM);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width_px as i64,
            "Height" => height_px as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg,
    ));

    let mut kids = Vec::with_capacity(plan.pages.len());
    for placement in &plan.pages {
        let w = mm_to_pt(placement.width_mm);
        let h = mm_to_pt(placement.height_mm);
        let x = mm_to_pt(placement.x_mm);
        // PDF space grows upwards from the bottom edge.
        let y = page_h - mm_to_pt(placement.y_mm) - h;

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        w.into(),
                        0.into(),
                        0.into(),
                        h.into(),
                        x.into(),
                        y.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_NAME.to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), page_w.into(), page_h.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Capture" => image_id },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| ExportError::Pdf(e.into()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::paginate::{plan_pages, PageMode};

    fn tiny_jpeg(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(w, h, image::Rgb([255, 255, 255]));
        let mut out = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, 80)
            .encode_image(&img)
            .unwrap();
        out
    }

    #[test]
    fn test_page_count_matches_plan() {
        for (h, mode) in [
            (100, PageMode::Natural),
            (2500, PageMode::Natural),
            (2500, PageMode::FitToOnePage),
        ] {
            let plan = plan_pages(400, h, mode);
            let bytes = write_pdf(tiny_jpeg(4, 4), 400, h, &plan).unwrap();
            let parsed = lopdf::Document::load_mem(&bytes).unwrap();
            assert_eq!(parsed.get_pages().len(), plan.page_count(), "h={h} {mode:?}");
        }
    }

    #[test]
    fn test_pages_are_a4() {
        let plan = plan_pages(400, 100, PageMode::Natural);
        let bytes = write_pdf(tiny_jpeg(4, 4), 400, 100, &plan).unwrap();
        let parsed = lopdf::Document::load_mem(&bytes).unwrap();
        let (_, page_id) = parsed.get_pages().into_iter().next().unwrap();
        let page = parsed.get_dictionary(page_id).unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        let height = media_box[3].as_float().unwrap();
        assert!((height - 841.89).abs() < 0.1, "got {height}");
    }

    #[test]
    fn test_continuation_pages_shift_upwards() {
        let plan = plan_pages(400, 2500, PageMode::Natural);
        let bytes = write_pdf(tiny_jpeg(4, 4), 400, 2500, &plan).unwrap();
        let parsed = lopdf::Document::load_mem(&bytes).unwrap();
        let mut offsets = Vec::new();
        for (_, page_id) in parsed.get_pages() {
            let content = parsed.get_and_decode_page_content(page_id).unwrap();
            let cm = content
                .operations
                .iter()
                .find(|op| op.operator == "cm")
                .unwrap();
            offsets.push(cm.operands[5].as_float().unwrap());
        }
        let step = mm_to_pt(PAGE_HEIGHT_MM);
        for pair in offsets.windows(2) {
            assert!((pair[1] - pair[0] - step).abs() < 0.5, "{offsets:?}");
        }
    }
}
