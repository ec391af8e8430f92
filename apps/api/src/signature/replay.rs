//! Server-side replay of a recorded pointer session.
//!
//! The editor records the raw pointer events of a signing session and posts
//! them; replaying them through a fresh [`SignaturePad`] yields the same PNG
//! the pad would have committed live.

use serde::{Deserialize, Serialize};

use crate::models::signature::SignatureMode;
use crate::signature::pad::{Point, PointerKind, SignatureError, SignaturePad};

/// Native canvas size and the size it was displayed at while recording.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PadSpec {
    pub width: u32,
    pub height: u32,
    pub display_width: f32,
    pub display_height: f32,
}

impl Default for PadSpec {
    fn default() -> Self {
        Self {
            width: 600,
            height: 200,
            display_width: 600.0,
            display_height: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PadEvent {
    Down { x: f32, y: f32, pointer: PointerKind },
    Move { x: f32, y: f32, pointer: PointerKind },
    Up { pointer: PointerKind },
    Clear,
    Mode { mode: SignatureMode },
    Resize { display_width: f32, display_height: f32 },
}

/// Replays `events` into a fresh pad. A non-finite coordinate rejects the
/// whole session before anything is drawn.
pub fn replay(spec: PadSpec, events: &[PadEvent]) -> Result<SignaturePad, SignatureError> {
    let mut pad = SignaturePad::new(spec.width, spec.height, spec.display_width, spec.display_height)?;
    for event in events {
        if let PadEvent::Down { x, y, .. } | PadEvent::Move { x, y, .. } = *event {
            if !(x.is_finite() && y.is_finite()) {
                return Err(SignatureError::InvalidPoint { x, y });
            }
        }
    }
    for event in events {
        match *event {
            PadEvent::Down { x, y, pointer } => {
                pad.pointer_down(Point { x, y }, pointer);
            }
            PadEvent::Move { x, y, pointer } => {
                pad.pointer_move(Point { x, y }, pointer);
            }
            PadEvent::Up { pointer } => {
                pad.pointer_up(pointer)?;
            }
            PadEvent::Clear => pad.clear(),
            PadEvent::Mode { mode } => pad.set_mode(mode),
            PadEvent::Resize {
                display_width,
                display_height,
            } => pad.set_display_size(display_width, display_height)?,
        }
    }
    // A stroke still open when recording stopped counts as finished.
    if pad.is_drawing() {
        pad.pointer_up(PointerKind::Mouse)?;
    }
    Ok(pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn events(value: serde_json::Value) -> Vec<PadEvent> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_replay_commits_stroke() {
        let pad = replay(
            PadSpec::default(),
            &events(json!([
                {"type": "down", "x": 10.0, "y": 10.0, "pointer": "pen"},
                {"type": "move", "x": 120.0, "y": 60.0, "pointer": "pen"},
                {"type": "up", "pointer": "pen"},
            ])),
        )
        .unwrap();
        assert!(pad.committed_data_url().is_some());
    }

    #[test]
    fn test_clear_at_end_leaves_nothing() {
        let pad = replay(
            PadSpec::default(),
            &events(json!([
                {"type": "down", "x": 10.0, "y": 10.0, "pointer": "mouse"},
                {"type": "up", "pointer": "mouse"},
                {"type": "clear"},
            ])),
        )
        .unwrap();
        assert!(pad.committed_png().is_none());
    }

    #[test]
    fn test_unfinished_stroke_is_committed() {
        let pad = replay(
            PadSpec::default(),
            &events(json!([
                {"type": "down", "x": 10.0, "y": 10.0, "pointer": "touch"},
                {"type": "move", "x": 40.0, "y": 30.0, "pointer": "touch"},
            ])),
        )
        .unwrap();
        assert!(!pad.is_drawing());
        assert!(pad.committed_png().is_some());
    }

    #[test]
    fn test_resize_remaps_later_points() {
        let spec = PadSpec {
            width: 200,
            height: 100,
            display_width: 200.0,
            display_height: 100.0,
        };
        let pad = replay(
            spec,
            &events(json!([
                {"type": "resize", "display_width": 100.0, "display_height": 50.0},
                {"type": "down", "x": 50.0, "y": 25.0, "pointer": "mouse"},
                {"type": "up", "pointer": "mouse"},
            ])),
        )
        .unwrap();
        assert!(pad.canvas().get_pixel(100, 50).0[3] > 0);
    }

    #[test]
    fn test_events_outside_drawn_mode_are_ignored() {
        let pad = replay(
            PadSpec::default(),
            &events(json!([
                {"type": "mode", "mode": "typed"},
                {"type": "down", "x": 10.0, "y": 10.0, "pointer": "mouse"},
                {"type": "up", "pointer": "mouse"},
            ])),
        )
        .unwrap();
        assert!(pad.committed_png().is_none());
    }

    #[test]
    fn test_far_and_long_strokes_stay_on_canvas() {
        let pad = replay(
            PadSpec::default(),
            &events(json!([
                {"type": "down", "x": 3.0e9, "y": 10.0, "pointer": "mouse"},
                {"type": "up", "pointer": "mouse"},
                {"type": "down", "x": 0.0, "y": 100.0, "pointer": "mouse"},
                {"type": "move", "x": 2.0e7, "y": 100.0, "pointer": "mouse"},
                {"type": "up", "pointer": "mouse"},
            ])),
        )
        .unwrap();
        assert!(pad.canvas().get_pixel(599, 100).0[3] > 0);
        assert!(pad.committed_png().is_some());
    }

    #[test]
    fn test_non_finite_point_rejects_session() {
        let err = replay(
            PadSpec::default(),
            &[
                PadEvent::Down {
                    x: 10.0,
                    y: 10.0,
                    pointer: PointerKind::Mouse,
                },
                PadEvent::Move {
                    x: f32::INFINITY,
                    y: 10.0,
                    pointer: PointerKind::Mouse,
                },
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SignatureError::InvalidPoint { .. }));
    }
}
