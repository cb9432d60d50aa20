use crate::utils::vector::{distance, Vec2};
use crate::viewport::ViewState;

/// Two-pointer pan and pinch-zoom, anchored at the midpoint where it started.
#[derive(Clone, Debug)]
pub struct Gesture {
    start_mid: Vec2,
    start_distance: f32,
    start_scale: f32,
    start_offset: Vec2,
    sensitivity: f32,
}

impl Gesture {
    pub fn begin(a: Vec2, b: Vec2, view: &ViewState, sensitivity: f32) -> Self {
        Self {
            start_mid: a.midpoint(b),
            start_distance: distance(a, b).max(1.0),
            start_scale: view.scale,
            start_offset: view.offset,
            sensitivity,
        }
    }

    /// Apply zoom and translation in one offset update.
    pub fn update(&self, a: Vec2, b: Vec2, view: &mut ViewState) {
        let mid = a.midpoint(b);
        let ratio = distance(a, b).max(1.0) / self.start_distance;
        let target = self.start_scale * ratio.powf(self.sensitivity);
        let scale = target.clamp(view.min_scale, view.max_scale);

        let world = (self.start_mid - self.start_offset) / self.start_scale;
        view.scale = scale;
        view.offset = self.start_mid - world * scale + (mid - self.start_mid);
        view.clamp_offset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ViewState {
        let mut v = ViewState::new(0.1, 8.0, 10_000.0);
        v.resize(Vec2::new(400.0, 400.0), Vec2::new(4000.0, 4000.0));
        v.scale = 1.0;
        v.offset = Vec2::new(-100.0, -100.0);
        v
    }

    #[test]
    fn pure_translation_moves_offset_by_midpoint_delta() {
        let mut v = view();
        let g = Gesture::begin(Vec2::new(100.0, 100.0), Vec2::new(200.0, 100.0), &v, 1.35);
        g.update(Vec2::new(130.0, 120.0), Vec2::new(230.0, 120.0), &mut v);
        assert!((v.scale - 1.0).abs() < 1e-6);
        assert!((v.offset - Vec2::new(-70.0, -80.0)).length() < 1e-4);
    }

    #[test]
    fn pinch_keeps_start_midpoint_anchored() {
        let mut v = view();
        let a = Vec2::new(100.0, 200.0);
        let b = Vec2::new(300.0, 200.0);
        let g = Gesture::begin(a, b, &v, 1.35);
        let anchor_world = v.screen_to_world(a.midpoint(b));
        g.update(Vec2::new(50.0, 200.0), Vec2::new(350.0, 200.0), &mut v);
        assert!((v.scale - 1.5f32.powf(1.35)).abs() < 1e-4);
        let after = v.screen_to_world(a.midpoint(b));
        assert!((after - anchor_world).length() < 1e-3);
    }
}
