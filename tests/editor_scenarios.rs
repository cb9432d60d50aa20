use std::time::Duration;

use eframe::egui::Color32;
use rusty_illustrator::app::{
    Key, MemoryClipboard, Modifiers, PointerButton, PointerEvent, PointerId, PointerKind,
};
use rusty_illustrator::brush_engine::ShapeKind;
use rusty_illustrator::canvas::{FontFamily, TextStyle};
use rusty_illustrator::utils::vector::Vec2;
use rusty_illustrator::viewport::ViewState;
use rusty_illustrator::{EditorConfig, EditorSession, Tool};

fn session_with(clipboard: MemoryClipboard) -> EditorSession {
    let mut config = EditorConfig::default();
    config.world_width = 300;
    config.world_height = 200;
    let mut session = EditorSession::new(config, Box::new(clipboard));
    // Viewport equal to the world: screen and world coordinates coincide.
    session.resize_viewport(300.0, 200.0);
    session
}

fn session() -> EditorSession {
    session_with(MemoryClipboard::new())
}

fn mouse(x: f32, y: f32) -> PointerEvent {
    PointerEvent {
        id: PointerId(1),
        kind: PointerKind::Mouse,
        button: PointerButton::Primary,
        pos: Vec2::new(x, y),
        modifiers: Modifiers::default(),
    }
}

fn shifted(x: f32, y: f32) -> PointerEvent {
    PointerEvent {
        modifiers: Modifiers {
            shift: true,
            command: false,
        },
        ..mouse(x, y)
    }
}

fn drag(session: &mut EditorSession, from: (f32, f32), to: (f32, f32)) {
    session.pointer_down(mouse(from.0, from.1));
    session.pointer_move(mouse((from.0 + to.0) * 0.5, (from.1 + to.1) * 0.5));
    session.pointer_move(mouse(to.0, to.1));
    session.pointer_up(mouse(to.0, to.1));
}

fn active_alpha(session: &EditorSession, x: i32, y: i32) -> u8 {
    session
        .store()
        .active()
        .and_then(|l| l.surface())
        .and_then(|s| s.get(x, y))
        .map_or(0, |p| p.a())
}

fn fill_red(session: &mut EditorSession, from: (f32, f32), to: (f32, f32)) {
    session.set_color(Color32::RED);
    session.set_shape_fill(true);
    session.set_tool(Tool::Shape(ShapeKind::Rectangle));
    drag(session, from, to);
    session.set_shape_fill(false);
}

#[test]
fn stroke_then_undo_leaves_blank_layer() {
    let mut s = session();
    s.set_size(4.0);
    drag(&mut s, (10.0, 10.0), (100.0, 10.0));
    assert!(active_alpha(&s, 50, 10) > 0);
    assert_eq!(active_alpha(&s, 50, 20), 0);
    assert_eq!(s.history().len(), 1);

    assert!(s.undo().succeeded);
    let surface = s.store().active().and_then(|l| l.surface()).unwrap();
    assert!(surface.is_fully_transparent());
}

#[test]
fn undo_n_times_restores_initial_pixels() {
    let mut s = session();
    for row in [20.0, 60.0, 100.0] {
        drag(&mut s, (20.0, row), (200.0, row));
    }
    assert_eq!(s.history().len(), 3);
    for _ in 0..3 {
        s.undo();
    }
    assert!(s.history().is_empty());
    let surface = s.store().active().and_then(|l| l.surface()).unwrap();
    assert!(surface.is_fully_transparent());
    // Nothing left to undo.
    assert!(s.undo().succeeded);
}

#[test]
fn zoom_keeps_anchor_fixed() {
    let mut view = ViewState::new(0.35, 4.0, 120.0);
    view.resize(Vec2::new(800.0, 600.0), Vec2::new(1600.0, 1200.0));
    view.zoom_at_point(Vec2::new(400.0, 300.0), 1.0);
    let anchor = Vec2::new(123.0, 456.0);
    let before = view.screen_to_world(anchor);
    assert!(view.zoom_at_point(anchor, 2.5));
    let after = view.screen_to_world(anchor);
    assert!((before - after).length() < 1e-3);
    assert_eq!(view.scale, 2.5);
}

#[test]
fn selecting_a_filled_region_lifts_its_pixels() {
    let mut s = session();
    s.set_color(Color32::RED);
    s.set_shape_fill(true);
    s.set_tool(Tool::Shape(ShapeKind::Rectangle));
    drag(&mut s, (0.0, 0.0), (300.0, 200.0));
    assert_eq!(active_alpha(&s, 100, 100), 255);

    s.set_tool(Tool::Select);
    drag(&mut s, (50.0, 50.0), (150.0, 150.0));
    let sel = s.selection().active().expect("selection is active");
    assert_eq!((sel.buffer.width(), sel.buffer.height()), (100, 100));
    assert!(sel.buffer.pixels().iter().all(|p| *p == Color32::RED));
    assert_eq!(active_alpha(&s, 100, 100), 0);
    assert_eq!(active_alpha(&s, 160, 100), 255);
}

#[test]
fn escape_commits_selection_in_place() {
    let mut s = session();
    s.set_color(Color32::RED);
    s.set_shape_fill(true);
    s.set_tool(Tool::Shape(ShapeKind::Rectangle));
    drag(&mut s, (0.0, 0.0), (300.0, 200.0));
    s.set_tool(Tool::Select);
    drag(&mut s, (50.0, 50.0), (150.0, 150.0));

    s.key_down(Key::Escape, Modifiers::default());
    assert!(!s.selection().is_active());
    assert_eq!(active_alpha(&s, 100, 100), 255);
}

#[test]
fn moved_selection_lands_at_new_position() {
    let mut s = session();
    s.set_color(Color32::RED);
    s.set_shape_fill(true);
    s.set_tool(Tool::Shape(ShapeKind::Rectangle));
    drag(&mut s, (20.0, 20.0), (60.0, 60.0));
    s.set_tool(Tool::Select);
    drag(&mut s, (10.0, 10.0), (70.0, 70.0));
    drag(&mut s, (40.0, 40.0), (190.0, 90.0));
    s.set_tool(Tool::Brush);

    assert_eq!(active_alpha(&s, 40, 40), 0);
    assert_eq!(active_alpha(&s, 190, 90), 255);
}

#[test]
fn merging_disjoint_layers_keeps_both() {
    let mut s = session();
    let bottom = s.store().active_id();
    drag(&mut s, (20.0, 20.0), (60.0, 20.0));
    s.add_layer();
    let top = s.store().active_id();
    drag(&mut s, (20.0, 150.0), (60.0, 150.0));

    assert!(s.merge_layers(&[bottom, top]).succeeded);
    assert_eq!(s.store().len(), 1);
    assert!(active_alpha(&s, 40, 20) > 0);
    assert!(active_alpha(&s, 40, 150) > 0);
    assert!(!s.store().contains(bottom));
    assert!(!s.store().contains(top));
}

#[test]
fn merge_needs_two_layers() {
    let mut s = session();
    let only = s.store().active_id();
    let outcome = s.merge_layers(&[only]);
    assert!(!outcome.succeeded);
    assert_eq!(s.store().len(), 1);
}

#[test]
fn deleting_last_layer_is_rejected() {
    let mut s = session();
    let outcome = s.delete_layer();
    assert!(!outcome.succeeded);
    assert!(outcome.message.is_some());
    assert_eq!(s.store().len(), 1);

    s.add_layer();
    assert!(s.delete_layer().succeeded);
    assert_eq!(s.store().len(), 1);
}

#[test]
fn paste_floats_clipboard_image_on_new_layer() {
    let clipboard = MemoryClipboard::new();
    clipboard.set_contents(Some(image::RgbaImage::from_pixel(
        20,
        10,
        image::Rgba([0, 0, 255, 255]),
    )));
    let mut s = session_with(clipboard);
    assert_eq!(s.store().len(), 1);

    assert!(s.paste().succeeded);
    let outcomes = s.wait_for_jobs(Duration::from_secs(5));
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].succeeded);
    assert_eq!(s.store().len(), 2);
    assert_eq!(s.tool(), Tool::Select);
    let sel = s.selection().active().expect("pasted image floats");
    assert_eq!((sel.buffer.width(), sel.buffer.height()), (20, 10));

    s.key_down(Key::Escape, Modifiers::default());
    assert_eq!(active_alpha(&s, 150, 100), 255);
}

#[test]
fn paste_with_empty_clipboard_reports() {
    let mut s = session();
    s.paste();
    let outcomes = s.wait_for_jobs(Duration::from_secs(5));
    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].succeeded);
    assert_eq!(s.store().len(), 1);
}

#[test]
fn copy_writes_flattened_canvas() {
    let clipboard = MemoryClipboard::new();
    let mut s = session_with(clipboard.clone());
    drag(&mut s, (10.0, 10.0), (100.0, 10.0));
    s.copy();
    s.wait_for_jobs(Duration::from_secs(5));
    let image = clipboard.contents().expect("clipboard written");
    assert_eq!(image.dimensions(), (300, 200));
    // Black stroke over the white background.
    assert_eq!(image.get_pixel(50, 10).0, [0, 0, 0, 255]);
    assert_eq!(image.get_pixel(50, 100).0, [255, 255, 255, 255]);
}

#[test]
fn text_is_committed_as_a_layer() {
    let mut s = session();
    s.set_tool(Tool::Text);
    s.pointer_down(mouse(40.0, 40.0));
    s.pointer_up(mouse(40.0, 40.0));
    assert!(s.text_edit().is_some());
    s.text_input("Hi");
    s.key_down(Key::Enter, Modifiers::default());

    assert!(s.text_edit().is_none());
    assert_eq!(s.store().len(), 2);
    let text = s.store().active().and_then(|l| l.text()).expect("text layer");
    assert_eq!(text.text, "Hi");

    s.undo();
    let text = s.store().active().and_then(|l| l.text());
    assert!(text.is_none_or(|t| t.text.is_empty()));
}

#[test]
fn merging_raster_under_offset_text_keeps_the_stroke() {
    let mut s = session();
    let raster = s.store().active_id();
    drag(&mut s, (20.0, 20.0), (40.0, 20.0));
    s.set_tool(Tool::Text);
    s.pointer_down(mouse(150.0, 100.0));
    s.pointer_up(mouse(150.0, 100.0));
    s.text_input("Hi");
    s.key_down(Key::Enter, Modifiers::default());
    let text = s.store().active_id();
    assert_eq!(s.flatten().unwrap().get(30, 20), Some(Color32::BLACK));

    assert!(s.merge_layers(&[raster, text]).succeeded);
    assert_eq!(s.store().len(), 1);
    let after = s.flatten().unwrap();
    assert_eq!(after.get(30, 20), Some(Color32::BLACK));
    let glyph_inked = (150..220)
        .flat_map(|x| (100..150).map(move |y| (x, y)))
        .any(|(x, y)| after.get(x, y).is_some_and(|p| p != Color32::WHITE));
    assert!(glyph_inked);
}

#[test]
fn undo_discards_floating_selection_and_restores_pixels() {
    let mut s = session();
    fill_red(&mut s, (0.0, 0.0), (300.0, 200.0));
    s.set_tool(Tool::Select);
    drag(&mut s, (50.0, 50.0), (150.0, 150.0));
    assert!(s.selection().is_active());
    assert_eq!(active_alpha(&s, 100, 100), 0);

    s.undo();
    assert!(!s.selection().is_active());
    assert_eq!(active_alpha(&s, 100, 100), 255);
    assert_eq!(s.history().len(), 1);
}

#[test]
fn corner_handle_resize_scales_on_commit() {
    let mut s = session();
    fill_red(&mut s, (20.0, 20.0), (60.0, 60.0));
    s.set_tool(Tool::Select);
    drag(&mut s, (10.0, 10.0), (70.0, 70.0));

    // Bottom-right handle sits on the corner at (70, 70).
    drag(&mut s, (70.0, 70.0), (130.0, 130.0));
    let sel = s.selection().active().expect("selection stays active");
    assert_eq!((sel.rect.w, sel.rect.h), (120.0, 120.0));
    assert!(sel.is_resized());

    s.set_tool(Tool::Brush);
    assert!(!s.selection().is_active());
    assert_eq!(active_alpha(&s, 100, 100), 255);
    assert_eq!(active_alpha(&s, 15, 15), 0);
    assert_eq!(active_alpha(&s, 125, 125), 0);
}

#[test]
fn shape_preview_leaves_no_trail() {
    let mut s = session();
    s.set_tool(Tool::Shape(ShapeKind::Rectangle));
    s.pointer_down(mouse(20.0, 20.0));
    s.pointer_move(mouse(200.0, 150.0));
    s.pointer_move(mouse(60.0, 60.0));
    s.pointer_up(mouse(60.0, 60.0));

    assert!(active_alpha(&s, 60, 40) > 0);
    assert_eq!(active_alpha(&s, 200, 100), 0);
    assert_eq!(active_alpha(&s, 100, 150), 0);
    assert_eq!(s.history().len(), 1);
}

#[test]
fn shift_snaps_lines_to_diagonal() {
    let mut s = session();
    s.set_tool(Tool::Shape(ShapeKind::Line));
    s.pointer_down(shifted(20.0, 20.0));
    s.pointer_move(shifted(120.0, 110.0));
    s.pointer_up(shifted(120.0, 110.0));

    assert!(active_alpha(&s, 100, 100) > 0);
    assert_eq!(active_alpha(&s, 120, 110), 0);
}

#[test]
fn shift_makes_boxes_square() {
    let mut s = session();
    s.set_tool(Tool::Shape(ShapeKind::Rectangle));
    s.pointer_down(shifted(20.0, 20.0));
    s.pointer_move(shifted(120.0, 60.0));
    s.pointer_up(shifted(120.0, 60.0));

    assert!(active_alpha(&s, 70, 120) > 0);
    assert_eq!(active_alpha(&s, 70, 60), 0);
}

#[test]
fn double_click_reopens_text_with_its_style() {
    let mut s = session();
    s.set_text_style(TextStyle {
        family: FontFamily::Mono,
        weight: 700,
        size: 40.0,
        color: Color32::BLUE,
    });
    s.set_tool(Tool::Text);
    s.pointer_down(mouse(40.0, 40.0));
    s.pointer_up(mouse(40.0, 40.0));
    s.text_input("Hi");
    s.key_down(Key::Enter, Modifiers::default());
    let layer = s.store().active_id();

    s.set_text_style(TextStyle::default());
    s.set_color(Color32::RED);
    s.add_layer();

    s.double_click(Vec2::new(45.0, 50.0));
    let edit = s.text_edit().expect("editor reopened");
    assert_eq!(edit.target, Some(layer));
    assert_eq!(edit.content.text, "Hi");
    assert_eq!(s.store().active_id(), layer);
    assert_eq!(s.text_style().family, FontFamily::Mono);
    assert_eq!(s.text_style().weight, 700);
    assert_eq!(s.text_style().size, 40.0);
    assert_eq!(s.color(), Color32::BLUE);
}

#[test]
fn pending_paste_lands_on_state_at_completion() {
    let clipboard = MemoryClipboard::new();
    clipboard.set_contents(Some(image::RgbaImage::from_pixel(
        8,
        8,
        image::Rgba([0, 255, 0, 255]),
    )));
    let mut s = session_with(clipboard);
    s.paste();

    // The session changes while the read is in flight.
    s.add_layer();
    let switched = s.store().active_id();
    s.set_tool(Tool::Eraser);

    let outcomes = s.wait_for_jobs(Duration::from_secs(5));
    assert!(outcomes.iter().all(|o| o.succeeded));
    assert_eq!(s.store().len(), 3);
    let pasted = s.store().active_id();
    assert_ne!(pasted, switched);
    assert_eq!(s.store().index_of(pasted), Some(2));
    assert_eq!(s.selection().active().map(|sel| sel.layer), Some(pasted));
    assert_eq!(s.tool(), Tool::Select);
}

#[test]
fn eraser_clears_along_its_path() {
    let mut s = session();
    drag(&mut s, (10.0, 10.0), (100.0, 10.0));
    s.set_tool(Tool::Eraser);
    s.set_size(10.0);
    drag(&mut s, (40.0, 10.0), (60.0, 10.0));

    assert_eq!(active_alpha(&s, 50, 10), 0);
    assert!(active_alpha(&s, 20, 10) > 0);
    assert!(active_alpha(&s, 90, 10) > 0);
    assert_eq!(s.history().len(), 2);

    s.undo();
    assert!(active_alpha(&s, 50, 10) > 0);
}
