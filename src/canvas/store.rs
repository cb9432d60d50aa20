use crate::canvas::layer::{Layer, LayerId, LayerKind, TextContent};
use crate::canvas::surface::Surface;
use crate::canvas::text::TextRenderer;
use crate::error::{EditorError, EditorResult};
use crate::utils::vector::Vec2;

/// Ordered layer stack (index 0 is the bottom) plus the world extent every raster matches.
pub struct LayerStore {
    width: usize,
    height: usize,
    layers: Vec<Layer>,
    active: LayerId,
    next_id: u64,
}

impl LayerStore {
    /// Create a store with a single empty raster layer.
    pub fn new(width: usize, height: usize) -> Self {
        let mut store = Self {
            width,
            height,
            layers: Vec::new(),
            active: LayerId(0),
            next_id: 1,
        };
        store.add_layer();
        store
    }

    /// World width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// World height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn world_pixels(&self) -> usize {
        self.width * self.height
    }

    /// Grow the world (never shrinks). Returns true when anything changed.
    pub fn grow_world(&mut self, width: usize, height: usize) -> bool {
        if width <= self.width && height <= self.height {
            return false;
        }
        self.width = self.width.max(width);
        self.height = self.height.max(height);
        for layer in &mut self.layers {
            if let Some(surface) = layer.surface_mut() {
                surface.grow_to(self.width, self.height);
            }
        }
        log::debug!("World grown to {}x{}", self.width, self.height);
        true
    }

    /// Layers bottom to top.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn active_id(&self) -> LayerId {
        self.active
    }

    pub fn active(&self) -> Option<&Layer> {
        self.get(self.active)
    }

    pub fn set_active(&mut self, id: LayerId) -> EditorResult<()> {
        if !self.contains(id) {
            return Err(EditorError::UnknownLayer(id));
        }
        self.active = id;
        Ok(())
    }

    /// The drawing surface of a raster layer.
    pub fn raster_surface_mut(&mut self, id: LayerId) -> EditorResult<&mut Surface> {
        let layer = self.get_mut(id).ok_or(EditorError::UnknownLayer(id))?;
        layer.surface_mut().ok_or(EditorError::NotRaster(id))
    }

    fn allocate_id(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn push_top(&mut self, name: String, position: Vec2, kind: LayerKind) -> LayerId {
        let id = self.allocate_id();
        self.layers.push(Layer {
            id,
            name,
            visible: true,
            position,
            kind,
        });
        self.active = id;
        id
    }

    /// Append an empty world-sized raster layer on top and activate it.
    pub fn add_layer(&mut self) -> LayerId {
        let name = format!("Layer {}", self.next_id);
        let surface = Surface::new(self.width, self.height);
        let id = self.push_top(name, Vec2::ZERO, LayerKind::Raster(surface));
        log::debug!("Added raster layer {id}");
        id
    }

    /// Append a text layer on top and activate it.
    pub fn add_text_layer(&mut self, content: TextContent, position: Vec2) -> LayerId {
        let name = format!("Text {}", self.next_id);
        let id = self.push_top(name, position, LayerKind::Text(content));
        log::debug!("Added text layer {id}");
        id
    }

    /// Remove the active layer; the layer below (or the new top) becomes active.
    pub fn delete_active(&mut self) -> EditorResult<LayerId> {
        if self.layers.len() <= 1 {
            return Err(EditorError::StructuralConstraintViolation(
                "The last layer cannot be deleted",
            ));
        }
        let idx = self
            .index_of(self.active)
            .ok_or(EditorError::UnknownLayer(self.active))?;
        let removed = self.layers.remove(idx);
        let next = idx.saturating_sub(1).min(self.layers.len() - 1);
        self.active = self.layers[next].id;
        log::debug!("Deleted layer {}", removed.id);
        Ok(removed.id)
    }

    /// Move a layer to `to_index` in bottom-to-top order (clamped).
    pub fn reorder(&mut self, id: LayerId, to_index: usize) -> EditorResult<()> {
        let from = self.index_of(id).ok_or(EditorError::UnknownLayer(id))?;
        let to = to_index.min(self.layers.len() - 1);
        if from != to {
            let layer = self.layers.remove(from);
            self.layers.insert(to, layer);
        }
        Ok(())
    }

    pub fn set_visible(&mut self, id: LayerId, visible: bool) -> EditorResult<()> {
        let layer = self.get_mut(id).ok_or(EditorError::UnknownLayer(id))?;
        layer.visible = visible;
        Ok(())
    }

    pub fn rename(&mut self, id: LayerId, name: &str) -> EditorResult<()> {
        let layer = self.get_mut(id).ok_or(EditorError::UnknownLayer(id))?;
        layer.name = name.trim().to_string();
        Ok(())
    }

    /// Flatten the given layers into one world-sized raster layer anchored at the world origin.
    pub fn merge(&mut self, ids: &[LayerId], fonts: &TextRenderer) -> EditorResult<LayerId> {
        let mut indices = Vec::with_capacity(ids.len());
        for id in ids {
            let idx = self.index_of(*id).ok_or(EditorError::UnknownLayer(*id))?;
            if !indices.contains(&idx) {
                indices.push(idx);
            }
        }
        if indices.len() < 2 {
            return Err(EditorError::StructuralConstraintViolation(
                "Select at least two layers to merge",
            ));
        }
        indices.sort_unstable();

        let top_idx = indices[indices.len() - 1];
        let mut merged = Surface::try_new(self.width, self.height)?;
        for &idx in &indices {
            let layer = &self.layers[idx];
            layer.draw_onto(&mut merged, layer.position, fonts);
        }

        // Removing from the top keeps the lower indices valid.
        for &idx in indices.iter().rev() {
            self.layers.remove(idx);
        }
        let insert_at = top_idx + 1 - indices.len();
        let id = self.allocate_id();
        self.layers.insert(
            insert_at,
            Layer {
                id,
                name: format!("Merged {}", id.0),
                visible: true,
                position: Vec2::ZERO,
                kind: LayerKind::Raster(merged),
            },
        );
        self.active = id;
        log::debug!("Merged {} layers into {id}", indices.len());
        Ok(id)
    }
}

impl Layer {
    /// Draw this layer into `target` with its origin at `offset` (target pixel space).
    pub fn draw_onto(&self, target: &mut Surface, offset: Vec2, fonts: &TextRenderer) {
        match &self.kind {
            LayerKind::Raster(surface) => {
                target.draw_surface(surface, offset.x.round() as i32, offset.y.round() as i32)
            }
            LayerKind::Text(content) => fonts.draw(content, target, offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::layer::TextStyle;
    use eframe::egui::Color32;

    #[test]
    fn ids_increase_and_new_layers_go_on_top() {
        let mut store = LayerStore::new(16, 16);
        let first = store.active_id();
        let second = store.add_layer();
        assert!(second > first);
        assert_eq!(store.layers().last().map(|l| l.id), Some(second));
        assert_eq!(store.active_id(), second);
    }

    #[test]
    fn deleting_the_only_layer_is_rejected() {
        let mut store = LayerStore::new(8, 8);
        let err = store.delete_active().unwrap_err();
        assert!(matches!(err, EditorError::StructuralConstraintViolation(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_activates_the_layer_below() {
        let mut store = LayerStore::new(8, 8);
        let bottom = store.active_id();
        store.add_layer();
        store.delete_active().unwrap();
        assert_eq!(store.active_id(), bottom);
    }

    #[test]
    fn merge_needs_two_distinct_layers() {
        let mut store = LayerStore::new(8, 8);
        let fonts = TextRenderer::new();
        let id = store.active_id();
        assert!(store.merge(&[id, id], &fonts).is_err());
        assert!(store.merge(&[id], &fonts).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn merge_unions_disjoint_regions() {
        let mut store = LayerStore::new(20, 20);
        let fonts = TextRenderer::new();
        let below = store.add_layer();
        let mid = store.add_layer();
        let top = store.add_layer();
        store.raster_surface_mut(below).unwrap().set(1, 1, Color32::RED);
        store.raster_surface_mut(top).unwrap().set(10, 10, Color32::BLUE);

        let merged = store.merge(&[top, below], &fonts).unwrap();
        let ids: Vec<_> = store.layers().iter().map(|l| l.id).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[2], merged);
        assert_eq!(ids[1], mid);
        let surface = store.get(merged).and_then(|l| l.surface()).unwrap();
        assert_eq!(surface.get(1, 1), Some(Color32::RED));
        assert_eq!(surface.get(10, 10), Some(Color32::BLUE));
        assert_eq!(store.active_id(), merged);
    }

    #[test]
    fn merge_keeps_raster_pixels_under_offset_text() {
        let mut store = LayerStore::new(300, 200);
        let fonts = TextRenderer::new();
        let raster = store.active_id();
        store.raster_surface_mut(raster).unwrap().set(30, 20, Color32::BLACK);
        let content = TextContent {
            text: "Hi".into(),
            style: TextStyle::default(),
        };
        let text = store.add_text_layer(content.clone(), Vec2::new(150.0, 100.0));

        let merged = store.merge(&[raster, text], &fonts).unwrap();
        let layer = store.get(merged).unwrap();
        assert_eq!(layer.position, Vec2::ZERO);
        let surface = layer.surface().unwrap();
        assert_eq!(surface.get(30, 20), Some(Color32::BLACK));
        let glyphs = fonts.bounds(&content, Vec2::new(150.0, 100.0));
        let (x, y, w, h) = surface.content_bounds().unwrap();
        assert_eq!((x, y), (30, 20));
        assert!(x as f32 + w as f32 > glyphs.x && y as f32 + h as f32 > glyphs.y);
    }

    #[test]
    fn reorder_clamps_target_index() {
        let mut store = LayerStore::new(4, 4);
        let bottom = store.active_id();
        store.add_layer();
        store.reorder(bottom, 99).unwrap();
        assert_eq!(store.index_of(bottom), Some(1));
    }

    #[test]
    fn world_only_grows() {
        let mut store = LayerStore::new(10, 10);
        assert!(!store.grow_world(5, 5));
        assert!(store.grow_world(12, 8));
        assert_eq!((store.width(), store.height()), (12, 10));
        let s = store.layers()[0].surface().unwrap();
        assert_eq!((s.width(), s.height()), (12, 10));
    }
}
