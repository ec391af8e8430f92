//! Block-flow layout of a `VisualTree` into absolutely positioned paint items.
//!
//! Columns stack children top to bottom; rows split their inner width between
//! children (explicit `width_fraction` first, the rest shared equally) and
//! stretch every child box to the tallest one. Text is wrapped with the static
//! metric tables, so layout is deterministic for a given tree.

use crate::layout::font_metrics::{get_metrics, FontMetricTable, BOLD_WIDTH_FACTOR};
use crate::models::design::Rgb;
use crate::render::tree::{Align, BoxNode, Direction, Node, TextNode, VisualTree};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// One positioned item, in CSS px from the page's top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub enum Placed {
    Fill {
        rect: Rect,
        color: Rgb,
        radius_px: f32,
    },
    TextLine {
        x: f32,
        /// Top of the line box.
        y: f32,
        width_px: f32,
        text: String,
        size_px: f32,
        line_height_px: f32,
        bold: bool,
        italic: bool,
        color: Rgb,
    },
    Image {
        rect: Rect,
        src: String,
        radius_px: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowLayout {
    pub width_px: f32,
    pub height_px: f32,
    pub items: Vec<Placed>,
}

/// Lays the tree out at its native width.
pub fn layout_tree(tree: &VisualTree) -> FlowLayout {
    let metrics = get_metrics(tree.font);
    let mut items = Vec::new();
    let height_px = layout_box(&tree.root, 0.0, 0.0, tree.width_px, None, metrics, &mut items);
    FlowLayout {
        width_px: tree.width_px,
        height_px,
        items,
    }
}

/// Content height of the tree in CSS px.
pub fn content_height(tree: &VisualTree) -> f32 {
    layout_tree(tree).height_px
}

fn layout_node(
    node: &Node,
    x: f32,
    y: f32,
    width: f32,
    stretch_to: Option<f32>,
    metrics: &FontMetricTable,
    out: &mut Vec<Placed>,
) -> f32 {
    match node {
        Node::Box(b) => layout_box(b, x, y, width, stretch_to, metrics, out),
        Node::Text(t) => layout_text(t, x, y, width, metrics, out),
        Node::Image(img) => {
            let w = img.width_px.min(width);
            let h = if img.width_px > 0.0 {
                img.height_px * w / img.width_px
            } else {
                img.height_px
            };
            let offset = match img.align {
                Align::Left => 0.0,
                Align::Center => (width - w) / 2.0,
                Align::Right => width - w,
            };
            out.push(Placed::Image {
                rect: Rect { x: x + offset, y, w, h },
                src: img.src.clone(),
                radius_px: img.radius_px,
            });
            h
        }
        Node::Rule {
            thickness_px,
            color,
        } => {
            out.push(Placed::Fill {
                rect: Rect {
                    x,
                    y,
                    w: width,
                    h: *thickness_px,
                },
                color: *color,
                radius_px: 0.0,
            });
            *thickness_px
        }
        Node::Spacer(h) => *h,
        Node::PageMarker { .. } => 0.0,
    }
}

fn layout_box(
    b: &BoxNode,
    x: f32,
    y: f32,
    width: f32,
    stretch_to: Option<f32>,
    metrics: &FontMetricTable,
    out: &mut Vec<Placed>,
) -> f32 {
    let inner_x = x + b.padding.left;
    let inner_y = y + b.padding.top;
    let inner_w = (width - b.padding.left - b.padding.right).max(0.0);

    let mut children_items = Vec::new();
    let content_h = match b.direction {
        Direction::Column => {
            let mut cursor = 0.0_f32;
            let mut placed_any = false;
            for child in &b.children {
                if matches!(child, Node::PageMarker { .. }) {
                    continue;
                }
                if placed_any {
                    cursor += b.gap_px;
                }
                cursor += layout_node(
                    child,
                    inner_x,
                    inner_y + cursor,
                    inner_w,
                    None,
                    metrics,
                    &mut children_items,
                );
                placed_any = true;
            }
            cursor
        }
        Direction::Row => layout_row(b, inner_x, inner_y, inner_w, metrics, &mut children_items),
    };

    let natural = b.padding.top + content_h + b.padding.bottom;
    let height = stretch_to.map_or(natural, |s| s.max(natural));

    if let Some(color) = b.background {
        out.push(Placed::Fill {
            rect: Rect {
                x,
                y,
                w: width,
                h: height,
            },
            color,
            radius_px: b.radius_px,
        });
    }
    if let Some((thickness, color)) = b.border_bottom {
        out.push(Placed::Fill {
            rect: Rect {
                x,
                y: y + height - thickness,
                w: width,
                h: thickness,
            },
            color,
            radius_px: 0.0,
        });
    }
    out.extend(children_items);
    height
}

fn row_widths(b: &BoxNode, inner_w: f32) -> Vec<f32> {
    let children: Vec<&Node> = b
        .children
        .iter()
        .filter(|c| !matches!(c, Node::PageMarker { .. }))
        .collect();
    if children.is_empty() {
        return Vec::new();
    }
    let available = (inner_w - b.gap_px * (children.len() - 1) as f32).max(0.0);
    let fixed: f32 = children
        .iter()
        .filter_map(|c| fraction_of(c))
        .map(|f| f * available)
        .sum();
    let flexible = children.iter().filter(|c| fraction_of(c).is_none()).count();
    let share = if flexible > 0 {
        ((available - fixed) / flexible as f32).max(0.0)
    } else {
        0.0
    };
    children
        .iter()
        .map(|c| fraction_of(c).map_or(share, |f| f * available))
        .collect()
}

fn fraction_of(node: &Node) -> Option<f32> {
    match node {
        Node::Box(b) => b.width_fraction,
        _ => None,
    }
}

fn layout_row(
    b: &BoxNode,
    inner_x: f32,
    inner_y: f32,
    inner_w: f32,
    metrics: &FontMetricTable,
    out: &mut Vec<Placed>,
) -> f32 {
    let widths = row_widths(b, inner_w);
    let children = b
        .children
        .iter()
        .filter(|c| !matches!(c, Node::PageMarker { .. }));

    // First pass measures, second pass places with every box stretched.
    let mut tallest = 0.0_f32;
    for (child, w) in children.clone().zip(&widths) {
        let mut scratch = Vec::new();
        tallest = tallest.max(layout_node(
            child,
            0.0,
            0.0,
            *w,
            None,
            metrics,
            &mut scratch,
        ));
    }

    let mut x = inner_x;
    for (child, w) in children.zip(&widths) {
        layout_node(child, x, inner_y, *w, Some(tallest), metrics, out);
        x += w + b.gap_px;
    }
    tallest
}

fn layout_text(
    t: &TextNode,
    x: f32,
    y: f32,
    width: f32,
    metrics: &FontMetricTable,
    out: &mut Vec<Placed>,
) -> f32 {
    if t.size_px <= 0.0 {
        return 0.0;
    }
    let weight = if t.bold { BOLD_WIDTH_FACTOR } else { 1.0 };
    let max_em = width / (t.size_px * weight);
    let line_height_px = t.size_px * t.line_height;
    let display = t.display_text();

    let mut cursor = 0.0_f32;
    for paragraph in display.split('\n') {
        let lines = metrics.wrap_lines(paragraph, max_em);
        if lines.is_empty() {
            // A blank line inside multi-line text still takes space.
            if display.contains('\n') {
                cursor += line_height_px;
            }
            continue;
        }
        for line in lines {
            let line_w = metrics.measure_str(&line) * t.size_px * weight;
            let offset = match t.align {
                Align::Left => 0.0,
                Align::Center => ((width - line_w) / 2.0).max(0.0),
                Align::Right => (width - line_w).max(0.0),
            };
            out.push(Placed::TextLine {
                x: x + offset,
                y: y + cursor,
                width_px: line_w,
                text: line,
                size_px: t.size_px,
                line_height_px,
                bold: t.bold,
                italic: t.italic,
                color: t.color,
            });
            cursor += line_height_px;
        }
    }
    cursor
}
