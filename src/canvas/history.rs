use std::collections::VecDeque;

use crate::canvas::layer::{LayerId, LayerKind, TextContent};
use crate::canvas::store::LayerStore;
use crate::canvas::surface::Surface;
use crate::error::{EditorError, EditorResult};
use crate::utils::vector::Vec2;

/// Captured state of one layer taken before it was modified.
#[derive(Debug)]
pub enum Snapshot {
    Raster {
        layer: LayerId,
        position: Vec2,
        pixels: Surface,
    },
    Text {
        layer: LayerId,
        position: Vec2,
        content: TextContent,
    },
}

impl Snapshot {
    pub fn layer(&self) -> LayerId {
        match self {
            Snapshot::Raster { layer, .. } | Snapshot::Text { layer, .. } => *layer,
        }
    }

    fn byte_len(&self) -> usize {
        match self {
            Snapshot::Raster { pixels, .. } => pixels.byte_len(),
            Snapshot::Text { content, .. } => content.text.len(),
        }
    }
}

/// Bounded undo stack. The oldest entry is evicted once the capacity is exceeded.
pub struct History {
    entries: VecDeque<Snapshot>,
    capacity: usize,
    min_entries: usize,
    max_entries: usize,
    budget_bytes: usize,
}

impl History {
    pub fn new(min_entries: usize, max_entries: usize, budget_bytes: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: VecDeque::new(),
            capacity: max_entries,
            min_entries: min_entries.clamp(1, max_entries),
            max_entries,
            budget_bytes,
        }
    }

    /// How many full raster snapshots of a `world_pixels` world fit in the budget.
    pub fn capacity_for_world(&self, world_pixels: usize) -> usize {
        let per_entry = world_pixels.max(1) * 4;
        (self.budget_bytes / per_entry).clamp(self.min_entries, self.max_entries)
    }

    /// Recompute the bound for a new world size, dropping the oldest entries if needed.
    pub fn fit_to_world(&mut self, world_pixels: usize) {
        self.capacity = self.capacity_for_world(world_pixels);
        self.evict();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.entries.back()
    }

    fn evict(&mut self) {
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Capture `layer` (the active layer when `None`) before it gets modified.
    pub fn push(&mut self, store: &LayerStore, layer: Option<LayerId>) -> EditorResult<()> {
        let id = layer.unwrap_or_else(|| store.active_id());
        let target = store.get(id).ok_or(EditorError::UnknownLayer(id))?;
        let snapshot = match &target.kind {
            LayerKind::Raster(surface) => Snapshot::Raster {
                layer: id,
                position: target.position,
                pixels: surface.try_clone()?,
            },
            LayerKind::Text(content) => Snapshot::Text {
                layer: id,
                position: target.position,
                content: content.clone(),
            },
        };
        self.entries
            .try_reserve(1)
            .map_err(|_| EditorError::ResourceExhaustion {
                bytes: snapshot.byte_len(),
            })?;
        self.entries.push_back(snapshot);
        self.evict();
        Ok(())
    }

    /// Remove the newest entry without applying it.
    pub fn discard_latest(&mut self) -> Option<Snapshot> {
        self.entries.pop_back()
    }

    /// Restore the newest entry. Entries whose layer is gone are dropped and `None` is returned.
    pub fn undo(&mut self, store: &mut LayerStore) -> Option<LayerId> {
        let snapshot = self.entries.pop_back()?;
        let (width, height) = (store.width(), store.height());
        let Some(layer) = store.get_mut(snapshot.layer()) else {
            log::debug!("Undo skipped: layer {} no longer exists", snapshot.layer());
            return None;
        };
        match (snapshot, &mut layer.kind) {
            (Snapshot::Raster { position, mut pixels, .. }, LayerKind::Raster(surface)) => {
                pixels.grow_to(width, height);
                *surface = pixels;
                layer.position = position;
            }
            (Snapshot::Text { position, content, .. }, LayerKind::Text(current)) => {
                *current = content;
                layer.position = position;
            }
            _ => {
                log::warn!("Undo skipped: layer {} changed kind", layer.id);
                return None;
            }
        }
        Some(layer.id)
    }
}
