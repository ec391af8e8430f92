//! Fixed-width visual tree produced by the templates.
//!
//! The tree is technology-neutral: `render::html` serialises it for the live
//! preview, `layout::flow` positions it for rasterization.

use crate::layout::page::{page_height_px, px_to_mm, PAGE_HEIGHT_MM, PAGE_TOLERANCE_MM, PAGE_WIDTH_PX};
use crate::models::design::{FontFamily, Rgb};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Column,
    Row,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub fn all(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn xy(x: f32, y: f32) -> Self {
        Self {
            top: y,
            right: x,
            bottom: y,
            left: x,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxNode {
    /// Stable class name, used by the HTML serializer and in tests.
    pub class: &'static str,
    pub direction: Direction,
    pub background: Option<Rgb>,
    pub padding: Edges,
    pub gap_px: f32,
    pub radius_px: f32,
    pub border_bottom: Option<(f32, Rgb)>,
    /// Share of the parent row's inner width. Ignored inside columns.
    pub width_fraction: Option<f32>,
    pub children: Vec<Node>,
}

impl BoxNode {
    pub fn column(class: &'static str) -> Self {
        Self {
            class,
            direction: Direction::Column,
            background: None,
            padding: Edges::default(),
            gap_px: 0.0,
            radius_px: 0.0,
            border_bottom: None,
            width_fraction: None,
            children: Vec::new(),
        }
    }

    pub fn row(class: &'static str) -> Self {
        Self {
            direction: Direction::Row,
            ..Self::column(class)
        }
    }

    pub fn background(mut self, color: Rgb) -> Self {
        self.background = Some(color);
        self
    }

    pub fn padding(mut self, padding: Edges) -> Self {
        self.padding = padding;
        self
    }

    pub fn gap(mut self, gap_px: f32) -> Self {
        self.gap_px = gap_px;
        self
    }

    pub fn radius(mut self, radius_px: f32) -> Self {
        self.radius_px = radius_px;
        self
    }

    pub fn border_bottom(mut self, width_px: f32, color: Rgb) -> Self {
        self.border_bottom = Some((width_px, color));
        self
    }

    pub fn fraction(mut self, fraction: f32) -> Self {
        self.width_fraction = Some(fraction);
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub text: String,
    pub size_px: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: Rgb,
    pub align: Align,
    pub line_height: f32,
    pub uppercase: bool,
}

impl TextNode {
    pub fn new(text: impl Into<String>, size_px: f32, color: Rgb, line_height: f32) -> Self {
        Self {
            text: text.into(),
            size_px,
            bold: false,
            italic: false,
            color,
            align: Align::Left,
            line_height,
            uppercase: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn uppercase(mut self) -> Self {
        self.uppercase = true;
        self
    }

    /// The string as it is displayed.
    pub fn display_text(&self) -> String {
        if self.uppercase {
            self.text.to_uppercase()
        } else {
            self.text.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageNode {
    pub src: String,
    pub width_px: f32,
    pub height_px: f32,
    pub radius_px: f32,
    pub align: Align,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Box(BoxNode),
    Text(TextNode),
    Image(ImageNode),
    Rule { thickness_px: f32, color: Rgb },
    Spacer(f32),
    /// Dashed page-boundary guide shown in the editor. Takes no layout space
    /// and is never part of an export.
    PageMarker { top_px: f32 },
}

impl From<BoxNode> for Node {
    fn from(node: BoxNode) -> Self {
        Node::Box(node)
    }
}

impl From<TextNode> for Node {
    fn from(node: TextNode) -> Self {
        Node::Text(node)
    }
}

impl From<ImageNode> for Node {
    fn from(node: ImageNode) -> Self {
        Node::Image(node)
    }
}

impl Node {
    fn strip_markers(&mut self) {
        if let Node::Box(b) = self {
            b.children.retain(|c| !matches!(c, Node::PageMarker { .. }));
            for child in &mut b.children {
                child.strip_markers();
            }
        }
    }

    fn count_markers(&self) -> usize {
        match self {
            Node::PageMarker { .. } => 1,
            Node::Box(b) => b.children.iter().map(Node::count_markers).sum(),
            _ => 0,
        }
    }

    fn collect_images<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Image(img) => out.push(&img.src),
            Node::Box(b) => b.children.iter().for_each(|c| c.collect_images(out)),
            _ => {}
        }
    }
}

/// A rendered document: fixed width, variable height, no internal scrolling.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualTree {
    pub width_px: f32,
    pub font: FontFamily,
    pub root: BoxNode,
}

impl VisualTree {
    pub fn new(font: FontFamily, root: BoxNode) -> Self {
        Self {
            width_px: PAGE_WIDTH_PX,
            font,
            root,
        }
    }

    /// Adds a marker at every page boundary strictly inside `content_height_px`.
    /// Existing markers are replaced. Content within the one-page tolerance
    /// gets none, matching the exported page count.
    pub fn with_page_markers(mut self, content_height_px: f32) -> Self {
        self = self.without_page_markers();
        if px_to_mm(content_height_px) <= PAGE_HEIGHT_MM + PAGE_TOLERANCE_MM {
            return self;
        }
        let page = page_height_px();
        let mut top = page;
        while top < content_height_px {
            self.root.children.push(Node::PageMarker { top_px: top });
            top += page;
        }
        self
    }

    pub fn without_page_markers(mut self) -> Self {
        self.root
            .children
            .retain(|c| !matches!(c, Node::PageMarker { .. }));
        for child in &mut self.root.children {
            child.strip_markers();
        }
        self
    }

    pub fn page_marker_count(&self) -> usize {
        self.root.children.iter().map(Node::count_markers).sum()
    }

    /// Every distinct image source referenced by the tree, in document order.
    pub fn image_sources(&self) -> Vec<String> {
        let mut sources = Vec::new();
        for child in &self.root.children {
            child.collect_images(&mut sources);
        }
        let mut seen = std::collections::HashSet::new();
        sources
            .into_iter()
            .filter(|s| seen.insert(*s))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VisualTree {
        let inner = BoxNode::column("inner")
            .child(TextNode::new("Hello", 13.0, Rgb::INK, 1.5))
            .child(Node::PageMarker { top_px: 10.0 });
        VisualTree::new(FontFamily::Inter, BoxNode::column("page").child(inner))
    }

    #[test]
    fn test_markers_only_inside_content() {
        let page = page_height_px();
        let tree = sample().without_page_markers();
        assert_eq!(tree.clone().with_page_markers(page * 0.5).page_marker_count(), 0);
        assert_eq!(tree.clone().with_page_markers(page * 2.5).page_marker_count(), 2);
        assert_eq!(tree.with_page_markers(page * 2.0).page_marker_count(), 1);
    }

    #[test]
    fn test_barely_overflowing_page_has_no_marker() {
        let tree = sample().without_page_markers();
        assert_eq!(tree.clone().with_page_markers(1124.0).page_marker_count(), 0);
        assert_eq!(tree.with_page_markers(1135.0).page_marker_count(), 1);
    }

    #[test]
    fn test_markers_agree_with_exported_page_count() {
        use crate::export::paginate::{plan_pages, PageMode};

        let tree = sample().without_page_markers();
        for height in (0..4000_u32).step_by(7) {
            let pages = plan_pages(PAGE_WIDTH_PX as u32, height, PageMode::Natural).page_count();
            let markers = tree.clone().with_page_markers(height as f32).page_marker_count();
            assert_eq!(markers + 1, pages, "height {height}px");
        }
    }

    #[test]
    fn test_without_page_markers_strips_nested_markers() {
        let tree = sample();
        assert_eq!(tree.page_marker_count(), 1, "fixture carries a nested marker");
        assert_eq!(tree.clone().without_page_markers().page_marker_count(), 0);

        let marked = tree.with_page_markers(page_height_px() * 3.2);
        assert_eq!(marked.page_marker_count(), 3);
        assert_eq!(marked.without_page_markers().page_marker_count(), 0);
    }

    #[test]
    fn test_image_sources_deduplicated_in_order() {
        let img = |src: &str| ImageNode {
            src: src.to_string(),
            width_px: 10.0,
            height_px: 10.0,
            radius_px: 0.0,
            align: Align::Left,
        };
        let root = BoxNode::column("page")
            .child(img("a.png"))
            .child(BoxNode::row("r").child(img("b.png")).child(img("a.png")));
        let tree = VisualTree::new(FontFamily::Inter, root);
        assert_eq!(tree.image_sources(), vec!["a.png", "b.png"]);
    }
}
