use crate::brush_engine::brush::Brush;
use crate::canvas::surface::Surface;
use crate::utils::{profiler::ScopeTimer, vector::Vec2};

/// Per-stroke state: the brush in use and the last sampled position.
pub struct StrokeState {
    pub brush: Brush,
    pub last_pos: Option<Vec2>,
    _timer: ScopeTimer,
}

impl StrokeState {
    /// Start a stroke at `pos` with an initial dab.
    pub fn begin(brush: Brush, surface: &mut Surface, pos: Vec2) -> Self {
        brush.dab(surface, pos);
        Self {
            brush,
            last_pos: Some(pos),
            _timer: ScopeTimer::new("stroke"),
        }
    }

    /// Draw the segment from the previous sample to `pos`.
    pub fn add_point(&mut self, surface: &mut Surface, pos: Vec2) {
        match self.last_pos {
            Some(prev) if prev == pos => return,
            Some(prev) => self.brush.segment(surface, prev, pos),
            None => self.brush.dab(surface, pos),
        }
        self.last_pos = Some(pos);
    }
}
