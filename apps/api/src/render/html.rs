//! HTML serialisation of a `VisualTree` for the live preview.
//!
//! The document is emitted at its native 794px width. `scaled_preview` wraps
//! it in a container that applies the viewport scale with a CSS transform and
//! reserves the scaled height, so the surrounding page never scrolls
//! horizontally.

use std::fmt::Write;

use crate::models::design::Rgb;
use crate::render::tree::{Align, BoxNode, Direction, Node, TextNode, VisualTree};

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn css_color(c: Rgb) -> String {
    c.to_hex()
}

fn text_align(align: Align) -> &'static str {
    match align {
        Align::Left => "left",
        Align::Center => "center",
        Align::Right => "right",
    }
}

/// The document markup at native width.
pub fn to_html(tree: &VisualTree) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<div class="document" style="position:relative;width:{}px;font-family:{};box-sizing:border-box;">"#,
        tree.width_px,
        escape(tree.font.css_stack())
    );
    write_box(&tree.root, &mut out);
    out.push_str("</div>");
    out
}

/// The document wrapped for display at `scale`, given its unscaled height.
pub fn scaled_preview(tree: &VisualTree, scale: f32, content_height_px: f32) -> String {
    format!(
        r#"<div class="preview-frame" style="width:{:.2}px;height:{:.2}px;overflow:hidden;"><div class="preview-scale" style="transform:scale({scale:.4});transform-origin:top left;width:{}px;">{}</div></div>"#,
        tree.width_px * scale,
        content_height_px * scale,
        tree.width_px,
        to_html(tree)
    )
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Box(b) => write_box(b, out),
        Node::Text(t) => write_text(t, out),
        Node::Image(img) => {
            let _ = write!(
                out,
                r#"<img src="{}" style="display:block;width:{}px;height:{}px;object-fit:cover;border-radius:{}px;margin-left:{};margin-right:{};" alt="">"#,
                escape(&img.src),
                img.width_px,
                img.height_px,
                img.radius_px,
                if img.align == Align::Left { "0" } else { "auto" },
                if img.align == Align::Right { "0" } else { "auto" },
            );
        }
        Node::Rule {
            thickness_px,
            color,
        } => {
            let _ = write!(
                out,
                r#"<hr style="border:0;margin:0;height:{thickness_px}px;background:{};">"#,
                css_color(*color)
            );
        }
        Node::Spacer(h) => {
            let _ = write!(out, r#"<div style="height:{h}px;"></div>"#);
        }
        Node::PageMarker { top_px } => {
            let _ = write!(
                out,
                r#"<div class="page-marker" style="position:absolute;left:0;right:0;top:{top_px:.2}px;border-top:1px dashed #9ca3af;pointer-events:none;"></div>"#
            );
        }
    }
}

fn write_box(b: &BoxNode, out: &mut String) {
    let mut style = String::new();
    style.push_str("display:flex;box-sizing:border-box;");
    style.push_str(match b.direction {
        Direction::Column => "flex-direction:column;",
        Direction::Row => "flex-direction:row;align-items:stretch;",
    });
    let p = b.padding;
    let _ = write!(
        style,
        "padding:{}px {}px {}px {}px;gap:{}px;",
        p.top, p.right, p.bottom, p.left, b.gap_px
    );
    if let Some(bg) = b.background {
        let _ = write!(style, "background:{};", css_color(bg));
    }
    if b.radius_px > 0.0 {
        let _ = write!(style, "border-radius:{}px;", b.radius_px);
    }
    if let Some((w, c)) = b.border_bottom {
        let _ = write!(style, "border-bottom:{w}px solid {};", css_color(c));
    }
    match b.width_fraction {
        Some(f) => {
            let _ = write!(style, "flex:0 0 {:.2}%;", f * 100.0);
        }
        None => style.push_str("flex:1 1 0;min-width:0;"),
    }

    let _ = write!(out, r#"<div class="{}" style="{}">"#, escape(b.class), style);
    for child in &b.children {
        write_node(child, out);
    }
    out.push_str("</div>");
}

fn write_text(t: &TextNode, out: &mut String) {
    let _ = write!(
        out,
        r#"<p style="margin:0;font-size:{}px;line-height:{};color:{};text-align:{};font-weight:{};font-style:{};white-space:pre-wrap;">{}</p>"#,
        t.size_px,
        t.line_height,
        css_color(t.color),
        text_align(t.align),
        if t.bold { 700 } else { 400 },
        if t.italic { "italic" } else { "normal" },
        escape(&t.display_text()),
    );
}
