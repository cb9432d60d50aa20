use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use crate::brush_engine::brush::{Brush, CoverageMask};
use crate::canvas::surface::Surface;
use crate::error::{EditorError, EditorResult};
use crate::utils::vector::{distance, Rect, Vec2};

const STAR_SPIKES: usize = 5;
const STAR_INNER_RATIO: f32 = 0.45;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Line,
    Rectangle,
    Ellipse,
    Triangle,
    Star,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Line,
        ShapeKind::Rectangle,
        ShapeKind::Ellipse,
        ShapeKind::Triangle,
        ShapeKind::Star,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::Line => "Line",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Ellipse => "Ellipse",
            ShapeKind::Triangle => "Triangle",
            ShapeKind::Star => "Star",
        }
    }
}

/// Apply the constrain modifier: lines snap to 45 degree steps, other shapes become square.
pub fn constrain_point(kind: ShapeKind, start: Vec2, current: Vec2) -> Vec2 {
    let d = current - start;
    match kind {
        ShapeKind::Line => {
            let length = d.length();
            if length < 0.001 {
                return current;
            }
            let snapped = (d.y.atan2(d.x) / FRAC_PI_4).round() * FRAC_PI_4;
            start + Vec2::new(snapped.cos(), snapped.sin()) * length
        }
        _ => {
            let side = d.x.abs().max(d.y.abs());
            Vec2::new(
                start.x + if d.x >= 0.0 { side } else { -side },
                start.y + if d.y >= 0.0 { side } else { -side },
            )
        }
    }
}

fn ellipse_points(rect: &Rect) -> Vec<Vec2> {
    let c = rect.center();
    let (rx, ry) = (rect.w * 0.5, rect.h * 0.5);
    let steps = ((rx + ry) * 0.5).clamp(24.0, 256.0) as usize;
    (0..steps)
        .map(|i| {
            let t = i as f32 / steps as f32 * TAU;
            Vec2::new(c.x + rx * t.cos(), c.y + ry * t.sin())
        })
        .collect()
}

fn star_points(rect: &Rect) -> Vec<Vec2> {
    let c = rect.center();
    let outer = (rect.w.min(rect.h) * 0.5).max(1.0);
    let inner = outer * STAR_INNER_RATIO;
    let step = PI / STAR_SPIKES as f32;
    (0..STAR_SPIKES * 2)
        .map(|i| {
            let angle = -FRAC_PI_2 + step * i as f32;
            let r = if i % 2 == 0 { outer } else { inner };
            Vec2::new(c.x + angle.cos() * r, c.y + angle.sin() * r)
        })
        .collect()
}

/// Closed outline of a shape spanning `start`..`end`. Lines are returned as two points.
pub fn outline(kind: ShapeKind, start: Vec2, end: Vec2) -> Vec<Vec2> {
    let rect = Rect::from_corners(start, end);
    match kind {
        ShapeKind::Line => vec![start, end],
        ShapeKind::Rectangle => vec![
            Vec2::new(rect.x, rect.y),
            Vec2::new(rect.right(), rect.y),
            Vec2::new(rect.right(), rect.bottom()),
            Vec2::new(rect.x, rect.bottom()),
        ],
        ShapeKind::Ellipse => ellipse_points(&rect),
        ShapeKind::Triangle => vec![
            Vec2::new(rect.x + rect.w * 0.5, rect.y),
            Vec2::new(rect.right(), rect.bottom()),
            Vec2::new(rect.x, rect.bottom()),
        ],
        ShapeKind::Star => star_points(&rect),
    }
}

/// True when the drag spans no area (or no length for lines).
pub fn is_collapsed(kind: ShapeKind, start: Vec2, end: Vec2) -> bool {
    match kind {
        ShapeKind::Line => distance(start, end) < 1.0,
        _ => {
            let rect = Rect::from_corners(start, end);
            rect.w < 1.0 || rect.h < 1.0
        }
    }
}

/// Rasterize a shape with the brush color, either filled or outlined with the brush width.
pub fn draw_shape(
    surface: &mut Surface,
    kind: ShapeKind,
    start: Vec2,
    end: Vec2,
    brush: &Brush,
    fill: bool,
) -> EditorResult<()> {
    if is_collapsed(kind, start, end) {
        return Err(EditorError::InvalidGeometry);
    }
    let points = outline(kind, start, end);
    if fill && kind != ShapeKind::Line {
        let mut mask = CoverageMask::around(&points, 0.0, surface);
        mask.add_polygon(&points);
        mask.apply(surface, brush.color, brush.mode);
    } else {
        brush.polyline(surface, &points, kind != ShapeKind::Line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::surface::CompositeMode;
    use eframe::egui::Color32;

    fn brush() -> Brush {
        Brush::new(Color32::RED, 2.0, CompositeMode::Paint)
    }

    #[test]
    fn line_snaps_to_45_degrees() {
        let p = constrain_point(ShapeKind::Line, Vec2::ZERO, Vec2::new(10.0, 9.0));
        assert!((p.x - p.y).abs() < 1e-4);
        let p = constrain_point(ShapeKind::Line, Vec2::ZERO, Vec2::new(10.0, 1.0));
        assert!(p.y.abs() < 1e-4);
    }

    #[test]
    fn boxes_become_square() {
        let p = constrain_point(ShapeKind::Rectangle, Vec2::new(10.0, 10.0), Vec2::new(4.0, 30.0));
        assert_eq!(p, Vec2::new(-10.0, 30.0));
    }

    #[test]
    fn star_has_ten_vertices_with_top_spike() {
        let pts = outline(ShapeKind::Star, Vec2::ZERO, Vec2::new(100.0, 60.0));
        assert_eq!(pts.len(), 10);
        assert!((pts[0].x - 50.0).abs() < 1e-3);
        assert!((pts[0].y - 0.0).abs() < 1e-3);
        let inner = distance(pts[1], Vec2::new(50.0, 30.0));
        assert!((inner - 30.0 * 0.45).abs() < 1e-3);
    }

    #[test]
    fn collapsed_shape_is_rejected_without_drawing() {
        let mut s = Surface::new(20, 20);
        let err = draw_shape(&mut s, ShapeKind::Rectangle, Vec2::new(5.0, 5.0), Vec2::new(15.0, 5.2), &brush(), true);
        assert_eq!(err, Err(EditorError::InvalidGeometry));
        assert!(s.is_fully_transparent());
    }

    #[test]
    fn filled_rectangle_covers_interior() {
        let mut s = Surface::new(30, 30);
        draw_shape(&mut s, ShapeKind::Rectangle, Vec2::new(5.0, 5.0), Vec2::new(20.0, 20.0), &brush(), true).unwrap();
        assert_eq!(s.get(12, 12), Some(Color32::RED));
        assert_eq!(s.get(25, 25), Some(Color32::TRANSPARENT));
    }

    #[test]
    fn outlined_rectangle_leaves_interior_empty() {
        let mut s = Surface::new(30, 30);
        draw_shape(&mut s, ShapeKind::Rectangle, Vec2::new(5.0, 5.0), Vec2::new(20.0, 20.0), &brush(), false).unwrap();
        assert_eq!(s.get(12, 12), Some(Color32::TRANSPARENT));
        assert_eq!(s.get(12, 5), Some(Color32::RED));
    }
}
