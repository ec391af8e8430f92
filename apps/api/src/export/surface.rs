//! Offscreen render surfaces.
//!
//! Every export run mounts a private copy of the visual tree, pinned to the
//! native page width and stripped of page markers. The surface is released
//! when the guard is dropped, whichever way the run ends.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;
use uuid::Uuid;

use crate::layout::page::PAGE_WIDTH_PX;
use crate::render::tree::VisualTree;

#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    mounted: Mutex<HashMap<Uuid, f32>>,
}

impl SurfaceRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Mounts an export copy of `tree`.
    pub fn mount(self: &Arc<Self>, tree: &VisualTree) -> OffscreenSurface {
        let mut copy = tree.clone().without_page_markers();
        copy.width_px = PAGE_WIDTH_PX;

        let id = Uuid::new_v4();
        self.lock().insert(id, copy.width_px);
        debug!(surface = %id, "offscreen surface mounted");

        OffscreenSurface {
            id,
            tree: copy,
            registry: Arc::clone(self),
        }
    }

    /// Number of surfaces currently mounted.
    pub fn active(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, f32>> {
        // A poisoned map is still a valid map of ids.
        self.mounted.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug)]
pub struct OffscreenSurface {
    id: Uuid,
    tree: VisualTree,
    registry: Arc<SurfaceRegistry>,
}

impl OffscreenSurface {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tree(&self) -> &VisualTree {
        &self.tree
    }
}

impl Drop for OffscreenSurface {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.id);
        debug!(surface = %self.id, "offscreen surface released");
    }
}
