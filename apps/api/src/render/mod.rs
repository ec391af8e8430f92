// Template renderer: document + template tag -> fixed-width visual tree.
// Rendering is pure; the date printed on letters is passed in by the caller.

pub mod blocks;
pub mod html;
pub mod letter;
pub mod resume;
pub mod templates;
pub mod tree;

pub use templates::{render_document, RenderOptions, TemplateChoice};
pub use tree::VisualTree;
