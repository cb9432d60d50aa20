use crate::utils::vector::{distance, Rect, Vec2};

/// Compass direction of one of the eight resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleDir {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl HandleDir {
    pub const ALL: [HandleDir; 8] = [
        HandleDir::NW,
        HandleDir::N,
        HandleDir::NE,
        HandleDir::E,
        HandleDir::SE,
        HandleDir::S,
        HandleDir::SW,
        HandleDir::W,
    ];

    /// Handle location on `rect` (corners and edge midpoints).
    pub fn position(self, rect: &Rect) -> Vec2 {
        let c = rect.center();
        match self {
            HandleDir::N => Vec2::new(c.x, rect.y),
            HandleDir::NE => Vec2::new(rect.right(), rect.y),
            HandleDir::E => Vec2::new(rect.right(), c.y),
            HandleDir::SE => Vec2::new(rect.right(), rect.bottom()),
            HandleDir::S => Vec2::new(c.x, rect.bottom()),
            HandleDir::SW => Vec2::new(rect.x, rect.bottom()),
            HandleDir::W => Vec2::new(rect.x, c.y),
            HandleDir::NW => Vec2::new(rect.x, rect.y),
        }
    }

    fn moves_left(self) -> bool {
        matches!(self, HandleDir::W | HandleDir::NW | HandleDir::SW)
    }

    fn moves_right(self) -> bool {
        matches!(self, HandleDir::E | HandleDir::NE | HandleDir::SE)
    }

    fn moves_top(self) -> bool {
        matches!(self, HandleDir::N | HandleDir::NE | HandleDir::NW)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, HandleDir::S | HandleDir::SE | HandleDir::SW)
    }
}

/// Result of hit-testing a pointer against an active selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitZone {
    Handle(HandleDir),
    Inside,
    Outside,
}

/// Classify `pos` (world units). Radii are in screen pixels and divided by `scale`.
pub fn hit_test(rect: &Rect, pos: Vec2, scale: f32, handle_radius: f32, handle_margin: f32) -> HitZone {
    let scale = scale.max(f32::EPSILON);
    let radius = handle_radius / scale;
    let nearest = HandleDir::ALL
        .into_iter()
        .map(|dir| (dir, distance(dir.position(rect), pos)))
        .filter(|(_, d)| *d <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((dir, _)) = nearest {
        return HitZone::Handle(dir);
    }
    if rect.inset(handle_margin / scale).contains(pos) {
        HitZone::Inside
    } else {
        HitZone::Outside
    }
}

/// Move the edges owned by `dir` by `delta`; the opposite edges stay where `anchor` had them.
pub fn resize_rect(anchor: &Rect, dir: HandleDir, delta: Vec2, floor: f32) -> Rect {
    let mut left = anchor.x;
    let mut right = anchor.right();
    let mut top = anchor.y;
    let mut bottom = anchor.bottom();

    if dir.moves_left() {
        left = (left + delta.x).min(right - floor);
    }
    if dir.moves_right() {
        right = (right + delta.x).max(left + floor);
    }
    if dir.moves_top() {
        top = (top + delta.y).min(bottom - floor);
    }
    if dir.moves_bottom() {
        bottom = (bottom + delta.y).max(top + floor);
    }
    Rect::new(left, top, right - left, bottom - top)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT: Rect = Rect::new(100.0, 100.0, 200.0, 100.0);

    #[test]
    fn handles_win_over_inside() {
        assert_eq!(
            hit_test(&RECT, Vec2::new(102.0, 99.0), 1.0, 8.0, 8.0),
            HitZone::Handle(HandleDir::NW)
        );
        assert_eq!(
            hit_test(&RECT, Vec2::new(200.0, 200.0), 1.0, 8.0, 8.0),
            HitZone::Handle(HandleDir::S)
        );
        assert_eq!(hit_test(&RECT, Vec2::new(150.0, 150.0), 1.0, 8.0, 8.0), HitZone::Inside);
        assert_eq!(hit_test(&RECT, Vec2::new(50.0, 50.0), 1.0, 8.0, 8.0), HitZone::Outside);
    }

    #[test]
    fn handle_radius_is_measured_on_screen() {
        // 8 screen px at scale 4 is 2 world units.
        assert_eq!(hit_test(&RECT, Vec2::new(104.0, 103.0), 4.0, 8.0, 8.0), HitZone::Inside);
        assert_eq!(
            hit_test(&RECT, Vec2::new(101.0, 100.0), 4.0, 8.0, 8.0),
            HitZone::Handle(HandleDir::NW)
        );
    }

    #[test]
    fn margin_band_is_outside() {
        assert_eq!(hit_test(&RECT, Vec2::new(150.0, 103.0), 1.0, 8.0, 8.0), HitZone::Outside);
    }

    #[test]
    fn east_resize_keeps_west_edge() {
        let r = resize_rect(&RECT, HandleDir::E, Vec2::new(50.0, 30.0), 4.0);
        assert_eq!(r, Rect::new(100.0, 100.0, 250.0, 100.0));
    }

    #[test]
    fn corner_resize_clamps_at_floor() {
        let r = resize_rect(&RECT, HandleDir::NW, Vec2::new(500.0, 500.0), 4.0);
        assert_eq!(r, Rect::new(296.0, 196.0, 4.0, 4.0));
    }
}
