use eframe::egui::Color32;

use crate::canvas::surface::{CompositeMode, Surface};
use crate::utils::vector::{distance_to_segment, Vec2};

/// Round hard-edged brush shared by the freehand tools and shape outlines.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Brush {
    pub color: Color32,
    pub diameter: f32,
    pub mode: CompositeMode,
}

impl Brush {
    pub fn new(color: Color32, diameter: f32, mode: CompositeMode) -> Self {
        Self {
            color,
            diameter: diameter.max(1.0),
            mode,
        }
    }

    pub fn radius(&self) -> f32 {
        self.diameter * 0.5
    }

    /// Color written for each covered pixel. Erasing removes full coverage.
    fn ink(&self) -> Color32 {
        match self.mode {
            CompositeMode::Paint => self.color,
            CompositeMode::Erase => Color32::BLACK,
        }
    }

    /// Paint a capsule from `a` to `b`. Pixel centers within the radius are covered.
    pub fn segment(&self, surface: &mut Surface, a: Vec2, b: Vec2) {
        let mut mask = CoverageMask::around(&[a, b], self.radius(), surface);
        mask.add_capsule(a, b, self.radius());
        mask.apply(surface, self.ink(), self.mode);
    }

    /// Single round dab at `p`.
    pub fn dab(&self, surface: &mut Surface, p: Vec2) {
        self.segment(surface, p, p);
    }

    /// Stroke a connected path, covering every pixel once even where capsules overlap.
    pub fn polyline(&self, surface: &mut Surface, points: &[Vec2], closed: bool) {
        if points.is_empty() {
            return;
        }
        let r = self.radius();
        let mut mask = CoverageMask::around(points, r, surface);
        for pair in points.windows(2) {
            mask.add_capsule(pair[0], pair[1], r);
        }
        if closed && points.len() > 2 {
            mask.add_capsule(points[points.len() - 1], points[0], r);
        }
        if points.len() == 1 {
            mask.add_capsule(points[0], points[0], r);
        }
        mask.apply(surface, self.ink(), self.mode);
    }
}

/// Boolean coverage over a clipped pixel window of a surface.
pub(crate) struct CoverageMask {
    x0: i32,
    y0: i32,
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl CoverageMask {
    /// Window covering `points` grown by `pad`, clipped to `surface`.
    pub(crate) fn around(points: &[Vec2], pad: f32, surface: &Surface) -> Self {
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let x0 = ((min_x - pad).floor() as i32).max(0);
        let y0 = ((min_y - pad).floor() as i32).max(0);
        let x1 = ((max_x + pad).ceil() as i32 + 1).min(surface.width() as i32);
        let y1 = ((max_y + pad).ceil() as i32 + 1).min(surface.height() as i32);
        let width = (x1 - x0).max(0) as usize;
        let height = (y1 - y0).max(0) as usize;
        Self {
            x0,
            y0,
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    fn center(&self, col: usize, row: usize) -> Vec2 {
        Vec2::new(
            (self.x0 + col as i32) as f32 + 0.5,
            (self.y0 + row as i32) as f32 + 0.5,
        )
    }

    pub(crate) fn add_capsule(&mut self, a: Vec2, b: Vec2, r: f32) {
        let min_x = a.x.min(b.x) - r;
        let max_x = a.x.max(b.x) + r;
        let min_y = a.y.min(b.y) - r;
        let max_y = a.y.max(b.y) + r;
        for row in 0..self.height {
            for col in 0..self.width {
                let c = self.center(col, row);
                if c.x < min_x || c.x > max_x || c.y < min_y || c.y > max_y {
                    continue;
                }
                if distance_to_segment(c, a, b) <= r {
                    self.bits[row * self.width + col] = true;
                }
            }
        }
    }

    /// Even-odd fill of a closed polygon, sampled at pixel centers.
    pub(crate) fn add_polygon(&mut self, points: &[Vec2]) {
        if points.len() < 3 {
            return;
        }
        let mut crossings = Vec::new();
        for row in 0..self.height {
            let y = (self.y0 + row as i32) as f32 + 0.5;
            crossings.clear();
            for i in 0..points.len() {
                let a = points[i];
                let b = points[(i + 1) % points.len()];
                if (a.y <= y && b.y > y) || (b.y <= y && a.y > y) {
                    let t = (y - a.y) / (b.y - a.y);
                    crossings.push(a.x + t * (b.x - a.x));
                }
            }
            crossings.sort_by(f32::total_cmp);
            for span in crossings.chunks_exact(2) {
                for col in 0..self.width {
                    let x = (self.x0 + col as i32) as f32 + 0.5;
                    if x >= span[0] && x < span[1] {
                        self.bits[row * self.width + col] = true;
                    }
                }
            }
        }
    }

    pub(crate) fn apply(&self, surface: &mut Surface, color: Color32, mode: CompositeMode) {
        for row in 0..self.height {
            for col in 0..self.width {
                if self.bits[row * self.width + col] {
                    surface.blend(self.x0 + col as i32, self.y0 + row as i32, color, mode);
                }
            }
        }
    }
}
