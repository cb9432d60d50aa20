//! Floating rectangular selection: extract, move, resize, commit.

pub mod transform;

pub use transform::{hit_test, resize_rect, HandleDir, HitZone};

use crate::canvas::layer::LayerId;
use crate::canvas::store::LayerStore;
use crate::canvas::surface::Surface;
use crate::error::{EditorError, EditorResult};
use crate::utils::vector::{Rect, Vec2};

/// What the pointer is doing to an active selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    Idle,
    Dragging { grab: Vec2 },
    Resizing { handle: HandleDir, start: Vec2, anchor: Rect },
}

/// A region lifted out of its layer, floating above the hole it left.
#[derive(Debug)]
pub struct Selection {
    pub layer: LayerId,
    pub rect: Rect,
    pub buffer: Surface,
    base: Surface,
    pub interaction: Interaction,
}

impl Selection {
    pub fn is_resized(&self) -> bool {
        let (_, _, w, h) = self.rect.to_pixels();
        w != self.buffer.width() || h != self.buffer.height()
    }
}

#[derive(Debug)]
pub enum SelectionState {
    Idle,
    Creating { layer: LayerId, start: Vec2, current: Vec2 },
    Active(Selection),
}

/// Outcome of a select-tool press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressResult {
    /// The press grabbed the active selection.
    Grabbed,
    /// The press landed outside; the caller commits and starts a new selection.
    Missed,
}

pub struct SelectionEngine {
    state: SelectionState,
    min_size: f32,
    handle_radius: f32,
    handle_margin: f32,
    resize_floor: f32,
}

impl SelectionEngine {
    pub fn new(min_size: f32, handle_radius: f32, handle_margin: f32, resize_floor: f32) -> Self {
        Self {
            state: SelectionState::Idle,
            min_size,
            handle_radius,
            handle_margin,
            resize_floor,
        }
    }

    pub fn active(&self) -> Option<&Selection> {
        match &self.state {
            SelectionState::Active(sel) => Some(sel),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active().is_some()
    }

    pub fn is_creating(&self) -> bool {
        matches!(self.state, SelectionState::Creating { .. })
    }

    /// The rubber-band rectangle while creating.
    pub fn marquee(&self) -> Option<Rect> {
        match self.state {
            SelectionState::Creating { start, current, .. } => Some(Rect::from_corners(start, current)),
            _ => None,
        }
    }

    pub fn begin_create(&mut self, layer: LayerId, pos: Vec2) {
        self.state = SelectionState::Creating {
            layer,
            start: pos,
            current: pos,
        };
    }

    /// Route a select-tool press to the active selection.
    pub fn press(&mut self, pos: Vec2, scale: f32) -> PressResult {
        let SelectionState::Active(sel) = &mut self.state else {
            return PressResult::Missed;
        };
        match hit_test(&sel.rect, pos, scale, self.handle_radius, self.handle_margin) {
            HitZone::Handle(handle) => {
                sel.interaction = Interaction::Resizing {
                    handle,
                    start: pos,
                    anchor: sel.rect,
                };
                PressResult::Grabbed
            }
            HitZone::Inside => {
                sel.interaction = Interaction::Dragging {
                    grab: pos - Vec2::new(sel.rect.x, sel.rect.y),
                };
                PressResult::Grabbed
            }
            HitZone::Outside => PressResult::Missed,
        }
    }

    /// Returns true when something visible changed.
    pub fn pointer_move(&mut self, pos: Vec2) -> bool {
        match &mut self.state {
            SelectionState::Idle => false,
            SelectionState::Creating { current, .. } => {
                *current = pos;
                true
            }
            SelectionState::Active(sel) => match sel.interaction {
                Interaction::Idle => false,
                Interaction::Dragging { grab } => {
                    let origin = pos - grab;
                    sel.rect.x = origin.x;
                    sel.rect.y = origin.y;
                    true
                }
                Interaction::Resizing { handle, start, anchor } => {
                    sel.rect = resize_rect(&anchor, handle, pos - start, self.resize_floor);
                    true
                }
            },
        }
    }

    /// Finish the current interaction. A finished creation extracts its region.
    pub fn release(&mut self, store: &mut LayerStore) -> EditorResult<()> {
        match std::mem::replace(&mut self.state, SelectionState::Idle) {
            SelectionState::Creating { layer, start, current } => {
                let rect = Rect::from_corners(start, current);
                if rect.w < self.min_size || rect.h < self.min_size {
                    return Err(EditorError::InvalidGeometry);
                }
                self.extract(store, layer, rect)
            }
            SelectionState::Active(mut sel) => {
                sel.interaction = Interaction::Idle;
                self.state = SelectionState::Active(sel);
                Ok(())
            }
            SelectionState::Idle => Ok(()),
        }
    }

    /// Lift `rect` (world units) out of `layer` into a floating buffer and clear it from the layer.
    pub fn extract(&mut self, store: &mut LayerStore, layer: LayerId, rect: Rect) -> EditorResult<()> {
        let position = store.get(layer).ok_or(EditorError::UnknownLayer(layer))?.position;
        let local = rect.translated(-position);
        let (x, y, w, h) = local.to_pixels();
        let surface = store.raster_surface_mut(layer)?;
        let buffer = surface.copy_region(x, y, w, h);
        surface.clear_rect(x, y, w, h);
        let base = surface.try_clone()?;
        log::debug!("Selection extracted {w}x{h} at ({x}, {y}) from layer {layer}");
        self.state = SelectionState::Active(Selection {
            layer,
            rect: Rect::new(x as f32 + position.x, y as f32 + position.y, w as f32, h as f32),
            buffer,
            base,
            interaction: Interaction::Idle,
        });
        Ok(())
    }

    /// Float an external image (paste) over `layer` with its top-left corner at `origin`.
    pub fn float_image(
        &mut self,
        store: &LayerStore,
        layer: LayerId,
        image: Surface,
        origin: Vec2,
    ) -> EditorResult<()> {
        let target = store.get(layer).ok_or(EditorError::UnknownLayer(layer))?;
        let base = target.surface().ok_or(EditorError::NotRaster(layer))?.try_clone()?;
        let rect = Rect::new(
            origin.x.round(),
            origin.y.round(),
            image.width() as f32,
            image.height() as f32,
        );
        self.state = SelectionState::Active(Selection {
            layer,
            rect,
            buffer: image,
            base,
            interaction: Interaction::Idle,
        });
        Ok(())
    }

    /// Write the floating buffer back at its current rect. Returns the layer written to.
    pub fn commit(&mut self, store: &mut LayerStore) -> Option<LayerId> {
        let state = std::mem::replace(&mut self.state, SelectionState::Idle);
        let SelectionState::Active(sel) = state else {
            return None;
        };
        let position = store.get(sel.layer)?.position;
        let (x, y, w, h) = sel.rect.translated(-position).to_pixels();
        let surface = match store.raster_surface_mut(sel.layer) {
            Ok(surface) => surface,
            Err(err) => {
                log::warn!("Selection dropped on commit: {err}");
                return None;
            }
        };
        surface.restore_from(&sel.base);
        surface.draw_surface_scaled(&sel.buffer, x, y, w, h);
        log::debug!("Selection committed {w}x{h} at ({x}, {y}) into layer {}", sel.layer);
        Some(sel.layer)
    }

    /// Drop any selection state without writing pixels back.
    pub fn discard(&mut self) {
        if self.is_active() {
            log::debug!("Selection discarded");
        }
        self.state = SelectionState::Idle;
    }

    /// Abort pointer interaction (lost capture); keeps an active selection where it is.
    pub fn cancel_interaction(&mut self) {
        match &mut self.state {
            SelectionState::Creating { .. } => self.state = SelectionState::Idle,
            SelectionState::Active(sel) => sel.interaction = Interaction::Idle,
            SelectionState::Idle => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::Color32;

    fn engine() -> SelectionEngine {
        SelectionEngine::new(3.0, 8.0, 8.0, 4.0)
    }

    fn patterned_store() -> LayerStore {
        let mut store = LayerStore::new(64, 64);
        let id = store.active_id();
        let surface = store.raster_surface_mut(id).unwrap();
        for y in 0..64 {
            for x in 0..64 {
                let a = ((x * 7 + y * 3) % 256) as u8;
                surface.set(x, y, Color32::from_rgba_premultiplied(a / 2, a / 3, a / 4, a));
            }
        }
        store
    }

    #[test]
    fn small_drag_is_rejected() {
        let mut store = patterned_store();
        let mut sel = engine();
        sel.begin_create(store.active_id(), Vec2::new(10.0, 10.0));
        sel.pointer_move(Vec2::new(11.5, 40.0));
        assert_eq!(sel.release(&mut store), Err(EditorError::InvalidGeometry));
        assert!(!sel.is_active());
    }

    #[test]
    fn extract_then_commit_in_place_is_identical() {
        let mut store = patterned_store();
        let id = store.active_id();
        let before = store.get(id).unwrap().surface().unwrap().clone();
        let mut sel = engine();
        sel.begin_create(id, Vec2::new(5.0, 6.0));
        sel.pointer_move(Vec2::new(40.0, 33.0));
        sel.release(&mut store).unwrap();
        assert!(sel.is_active());
        assert_eq!(sel.commit(&mut store), Some(id));
        assert_eq!(store.get(id).unwrap().surface().unwrap(), &before);
    }

    #[test]
    fn dragging_moves_without_resizing() {
        let mut store = LayerStore::new(64, 64);
        let id = store.active_id();
        store.raster_surface_mut(id).unwrap().fill(Color32::RED);
        let mut sel = engine();
        sel.extract(&mut store, id, Rect::new(10.0, 10.0, 20.0, 20.0)).unwrap();
        assert_eq!(sel.press(Vec2::new(20.0, 20.0), 1.0), PressResult::Grabbed);
        sel.pointer_move(Vec2::new(30.0, 25.0));
        sel.release(&mut store).unwrap();
        let active = sel.active().unwrap();
        assert_eq!(active.rect, Rect::new(20.0, 15.0, 20.0, 20.0));
        assert!(!active.is_resized());

        sel.commit(&mut store);
        let surface = store.get(id).unwrap().surface().unwrap();
        assert_eq!(surface.get(12, 12), Some(Color32::TRANSPARENT));
        assert_eq!(surface.get(35, 30), Some(Color32::RED));
    }

    #[test]
    fn resize_commit_resamples() {
        let mut store = LayerStore::new(64, 64);
        let id = store.active_id();
        store.raster_surface_mut(id).unwrap().clear_rect(0, 0, 64, 64);
        for x in 0..10 {
            store.raster_surface_mut(id).unwrap().set(x, 0, Color32::BLUE);
        }
        let mut sel = engine();
        sel.extract(&mut store, id, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        assert_eq!(sel.press(Vec2::new(10.0, 10.0), 1.0), PressResult::Grabbed);
        sel.pointer_move(Vec2::new(20.0, 20.0));
        sel.release(&mut store).unwrap();
        assert!(sel.active().unwrap().is_resized());
        sel.commit(&mut store);
        let surface = store.get(id).unwrap().surface().unwrap();
        assert_eq!(surface.get(19, 1), Some(Color32::BLUE));
        assert_eq!(surface.get(19, 2), Some(Color32::TRANSPARENT));
    }

    #[test]
    fn commit_after_layer_deleted_is_dropped() {
        let mut store = LayerStore::new(16, 16);
        store.add_layer();
        let id = store.active_id();
        let mut sel = engine();
        sel.extract(&mut store, id, Rect::new(0.0, 0.0, 8.0, 8.0)).unwrap();
        store.delete_active().unwrap();
        assert_eq!(sel.commit(&mut store), None);
        assert!(!sel.is_active());
    }

    #[test]
    fn press_outside_misses() {
        let mut store = LayerStore::new(64, 64);
        let id = store.active_id();
        let mut sel = engine();
        sel.extract(&mut store, id, Rect::new(10.0, 10.0, 20.0, 20.0)).unwrap();
        assert_eq!(sel.press(Vec2::new(50.0, 50.0), 1.0), PressResult::Missed);
    }
}
