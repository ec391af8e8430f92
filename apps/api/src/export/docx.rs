//! DOCX packing of a `StructuredDocument` with docx-rs.

use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Pic, Run as DocxRun, RunFonts};

use crate::export::structured::{Block, Run, StructuredDocument, HEADING_PT, TITLE_PT};
use crate::export::ExportError;

const FONT: &str = "Calibri";
const TEXT_COLOR: &str = "374151";
/// English Metric Units per CSS pixel.
const EMU_PER_PX: u32 = 9525;
/// Widest an embedded image may be drawn, in px.
const MAX_IMAGE_WIDTH_PX: u32 = 240;

fn docx_run(run: &Run) -> DocxRun {
    let mut out = DocxRun::new()
        .add_text(&run.text)
        .size((run.size_pt * 2.0).round() as usize)
        .color(TEXT_COLOR)
        .fonts(RunFonts::new().ascii(FONT).hi_ansi(FONT));
    if run.bold {
        out = out.bold();
    }
    if run.italic {
        out = out.italic();
    }
    out
}

fn heading(text: &str, level: u8) -> Paragraph {
    let size = if level <= 1 { TITLE_PT } else { HEADING_PT };
    Paragraph::new().add_run(docx_run(&Run::plain(text).bold().size(size)))
}

fn image(png: &[u8], width_px: u32, height_px: u32) -> Paragraph {
    let (w, h) = if width_px > MAX_IMAGE_WIDTH_PX {
        (
            MAX_IMAGE_WIDTH_PX,
            height_px * MAX_IMAGE_WIDTH_PX / width_px.max(1),
        )
    } else {
        (width_px, height_px)
    };
    let pic = Pic::new(png).size(w * EMU_PER_PX, h * EMU_PER_PX);
    Paragraph::new().add_run(DocxRun::new().add_image(pic))
}

pub fn build_docx(doc: &StructuredDocument) -> Docx {
    let mut docx = Docx::new();
    for block in &doc.blocks {
        let paragraph = match block {
            Block::Heading { text, level } => heading(text, *level),
            Block::Paragraph(runs) => runs
                .iter()
                .fold(Paragraph::new(), |p, run| p.add_run(docx_run(run))),
            Block::Image {
                png,
                width_px,
                height_px,
            } => image(png, *width_px, *height_px),
            Block::Spacer => Paragraph::new(),
        };
        docx = docx.add_paragraph(paragraph);
    }
    docx
}

/// Packs `doc` into DOCX bytes.
pub fn write_docx(doc: &StructuredDocument) -> Result<Vec<u8>, ExportError> {
    let mut buf = Cursor::new(Vec::new());
    build_docx(doc)
        .build()
        .pack(&mut buf)
        .map_err(|e| ExportError::Docx(e.to_string()))?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::structured::build_structured;
    use crate::models::document::{Document, Resume};
    use chrono::NaiveDate;

    #[test]
    fn test_packs_a_zip_archive() {
        let mut resume = Resume::default();
        resume.personal.full_name = "Ada Lovelace".into();
        resume.personal.summary = "Mathematician.".into();
        let doc = build_structured(
            &Document::Resume(resume),
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
        );
        let bytes = write_docx(&doc).unwrap();
        assert_eq!(&bytes[..2], b"PK", "DOCX is a zip container");
    }

    #[test]
    fn test_one_paragraph_per_block() {
        let doc = StructuredDocument {
            blocks: vec![
                Block::Heading {
                    text: "Summary".into(),
                    level: 2,
                },
                Block::Paragraph(vec![Run::plain("a"), Run::plain("b").bold()]),
                Block::Spacer,
            ],
        };
        let docx = build_docx(&doc);
        assert_eq!(docx.document.children.len(), 3);
    }
}
