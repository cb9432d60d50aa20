//! Screen/world mapping under pan and zoom.

pub mod gesture;

pub use gesture::Gesture;

use crate::utils::vector::Vec2;

/// Presentation state of the canvas. Never touches layer geometry.
#[derive(Clone, Debug)]
pub struct ViewState {
    pub scale: f32,
    pub offset: Vec2,
    pub min_scale: f32,
    pub max_scale: f32,
    pub overflow_margin: f32,
    viewport: Vec2,
    world: Vec2,
}

impl ViewState {
    pub fn new(min_scale: f32, max_scale: f32, overflow_margin: f32) -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
            min_scale: min_scale.min(max_scale),
            max_scale,
            overflow_margin,
            viewport: Vec2::ZERO,
            world: Vec2::ZERO,
        }
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.offset) / self.scale
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world * self.scale + self.offset
    }

    /// Update viewport and world extents; the minimum scale becomes the fit-to-viewport scale.
    pub fn resize(&mut self, viewport: Vec2, world: Vec2) {
        self.viewport = viewport;
        self.world = world;
        if world.x > 0.0 && world.y > 0.0 && viewport.x > 0.0 && viewport.y > 0.0 {
            let fit = (viewport.x / world.x).min(viewport.y / world.y);
            self.min_scale = fit.min(self.max_scale);
        }
        self.scale = self.scale.clamp(self.min_scale, self.max_scale);
        self.clamp_offset();
    }

    /// Zoom to `target` (clamped) keeping the world point under `anchor` fixed on screen.
    /// Returns false when the clamped scale does not change.
    pub fn zoom_at_point(&mut self, anchor: Vec2, target: f32) -> bool {
        if !target.is_finite() || target <= 0.0 {
            return false;
        }
        let next = target.clamp(self.min_scale, self.max_scale);
        if (next - self.scale).abs() < 1e-4 {
            return false;
        }
        let world = self.screen_to_world(anchor);
        self.scale = next;
        self.offset = anchor - world * next;
        true
    }

    /// Multiply the current scale by `factor` about `anchor`, then clamp the offset.
    pub fn zoom_by(&mut self, anchor: Vec2, factor: f32) -> bool {
        let changed = self.zoom_at_point(anchor, self.scale * factor);
        if changed {
            self.clamp_offset();
        }
        changed
    }

    pub fn zoom_about_center(&mut self, factor: f32) -> bool {
        self.zoom_by(self.viewport * 0.5, factor)
    }

    pub fn reset(&mut self) {
        self.scale = 1.0_f32.clamp(self.min_scale, self.max_scale);
        self.offset = Vec2::ZERO;
        self.clamp_offset();
    }

    pub fn pan_to(&mut self, offset: Vec2) {
        self.offset = offset;
        self.clamp_offset();
    }

    /// Center content smaller than the viewport; otherwise keep it within the overflow margin.
    pub fn clamp_offset(&mut self) {
        self.offset.x = clamp_axis(
            self.offset.x,
            self.viewport.x,
            self.world.x * self.scale,
            self.overflow_margin,
        );
        self.offset.y = clamp_axis(
            self.offset.y,
            self.viewport.y,
            self.world.y * self.scale,
            self.overflow_margin,
        );
    }
}

fn clamp_axis(offset: f32, viewport: f32, scaled: f32, margin: f32) -> f32 {
    if scaled < viewport {
        (viewport - scaled) * 0.5
    } else {
        offset.clamp(viewport - scaled - margin, margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ViewState {
        let mut v = ViewState::new(0.35, 4.0, 120.0);
        v.resize(Vec2::new(800.0, 600.0), Vec2::new(1600.0, 1200.0));
        v
    }

    #[test]
    fn resize_recomputes_min_scale() {
        let v = view();
        assert!((v.min_scale - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut v = view();
        v.offset = Vec2::new(-37.0, -12.5);
        let anchor = Vec2::new(310.0, 222.0);
        for target in [0.5, 0.8, 1.3, 2.7, 4.0] {
            let before = v.screen_to_world(anchor);
            v.zoom_at_point(anchor, target);
            let after = v.screen_to_world(anchor);
            assert!((before - after).length() < 1e-3, "target {target}");
        }
    }

    #[test]
    fn zoom_clamps_scale() {
        let mut v = view();
        v.zoom_at_point(Vec2::ZERO, 100.0);
        assert_eq!(v.scale, 4.0);
        v.zoom_at_point(Vec2::ZERO, 0.01);
        assert_eq!(v.scale, v.min_scale);
    }

    #[test]
    fn small_content_is_centered() {
        let mut v = ViewState::new(0.1, 4.0, 120.0);
        v.resize(Vec2::new(800.0, 600.0), Vec2::new(400.0, 300.0));
        v.scale = 1.0;
        v.pan_to(Vec2::new(-500.0, 900.0));
        assert_eq!(v.offset, Vec2::new(200.0, 150.0));
    }

    #[test]
    fn large_content_stays_within_margin() {
        let mut v = view();
        v.scale = 1.0;
        v.pan_to(Vec2::new(500.0, -5000.0));
        assert_eq!(v.offset.x, 120.0);
        assert_eq!(v.offset.y, 600.0 - 1200.0 - 120.0);
    }

    #[test]
    fn transforms_are_inverse() {
        let mut v = view();
        v.zoom_at_point(Vec2::new(100.0, 100.0), 1.7);
        let p = Vec2::new(123.0, 456.0);
        let back = v.world_to_screen(v.screen_to_world(p));
        assert!((back - p).length() < 1e-3);
    }
}
