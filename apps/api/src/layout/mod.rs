// Layout: page geometry, text measurement, block flow and the preview scaler.
// Flow layout is CPU-bound; callers on the async runtime go through
// tokio::task::spawn_blocking for large documents.

pub mod flow;
pub mod font_metrics;
pub mod page;
pub mod scaler;

pub use flow::{content_height, layout_tree, FlowLayout, Placed, Rect};
pub use scaler::{compute_scale, ScaleObserver};
