use std::time::Duration;

use eframe::egui;
use eframe::egui::{Color32, TextureHandle, TextureOptions};

use crate::app::clipboard::ArboardClipboard;
use crate::app::input_handler::{Key, Modifiers, PointerButton, PointerEvent, PointerId, PointerKind};
use crate::app::session::EditorSession;
use crate::app::state::EditorConfig;
use crate::ui;
use crate::ui::notices::NoticeBoard;
use crate::ui::PanelState;
use crate::utils::profiler::ScopeTimer;
use crate::utils::vector::Vec2;

const MOUSE: PointerId = PointerId(0);
const LINE_HEIGHT: f32 = 40.0;

/// egui application: forwards input to the session and shows its composited frame.
pub struct IllustratorApp {
    session: EditorSession,
    panel: PanelState,
    notices: NoticeBoard,
    texture: Option<TextureHandle>,
    viewport: egui::Vec2,
    active_touches: usize,
}

impl IllustratorApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: EditorConfig) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());
        let session = EditorSession::new(config, Box::new(ArboardClipboard));
        let panel = PanelState {
            color_hex: crate::utils::color::Color::from_color32(session.color()).to_hex(),
            ..Default::default()
        };
        Self {
            session,
            panel,
            notices: NoticeBoard::default(),
            texture: None,
            viewport: egui::Vec2::ZERO,
            active_touches: 0,
        }
    }

    fn handle_events(&mut self, ctx: &egui::Context, rect: egui::Rect, hovered: bool) {
        let events = ctx.input(|i| i.events.clone());
        let typing_elsewhere = ctx.wants_keyboard_input();
        let to_screen = |pos: egui::Pos2| Vec2::new(pos.x - rect.min.x, pos.y - rect.min.y);

        for event in events {
            match event {
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    modifiers,
                } => {
                    // Touch input is also reported as an emulated mouse.
                    if self.active_touches > 0 {
                        continue;
                    }
                    let Some(button) = map_button(button) else {
                        continue;
                    };
                    let ev = PointerEvent {
                        id: MOUSE,
                        kind: PointerKind::Mouse,
                        button,
                        pos: to_screen(pos),
                        modifiers: map_modifiers(modifiers),
                    };
                    if pressed {
                        if hovered {
                            self.session.pointer_down(ev);
                        }
                    } else {
                        self.session.pointer_up(ev);
                    }
                }
                egui::Event::PointerMoved(pos) => {
                    if self.active_touches > 0 {
                        continue;
                    }
                    let modifiers = ctx.input(|i| i.modifiers);
                    self.session.pointer_move(PointerEvent {
                        id: MOUSE,
                        kind: PointerKind::Mouse,
                        button: PointerButton::Primary,
                        pos: to_screen(pos),
                        modifiers: map_modifiers(modifiers),
                    });
                }
                egui::Event::PointerGone => self.session.lost_capture(MOUSE),
                egui::Event::Touch { id, phase, pos, .. } => {
                    let ev = PointerEvent {
                        id: PointerId(id.0.wrapping_add(1)),
                        kind: PointerKind::Touch,
                        button: PointerButton::Primary,
                        pos: to_screen(pos),
                        modifiers: Modifiers::default(),
                    };
                    match phase {
                        egui::TouchPhase::Start => {
                            self.active_touches += 1;
                            if rect.contains(pos) {
                                self.session.pointer_down(ev);
                            }
                        }
                        egui::TouchPhase::Move => self.session.pointer_move(ev),
                        egui::TouchPhase::End => {
                            self.active_touches = self.active_touches.saturating_sub(1);
                            self.session.pointer_up(ev);
                        }
                        egui::TouchPhase::Cancel => {
                            self.active_touches = self.active_touches.saturating_sub(1);
                            self.session.lost_capture(ev.id);
                        }
                    }
                }
                egui::Event::MouseWheel {
                    unit,
                    delta,
                    modifiers,
                } => {
                    if !hovered {
                        continue;
                    }
                    let dy = match unit {
                        egui::MouseWheelUnit::Point => -delta.y,
                        egui::MouseWheelUnit::Line => -delta.y * LINE_HEIGHT,
                        egui::MouseWheelUnit::Page => -delta.y * rect.height(),
                    };
                    let pos = ctx.input(|i| i.pointer.hover_pos()).unwrap_or(rect.center());
                    self.session.wheel(to_screen(pos), dy, modifiers.ctrl);
                }
                egui::Event::Key {
                    key,
                    pressed,
                    modifiers,
                    ..
                } => {
                    if typing_elsewhere {
                        continue;
                    }
                    let Some(key) = map_key(key) else {
                        continue;
                    };
                    if pressed {
                        self.session.key_down(key, map_modifiers(modifiers));
                    } else {
                        self.session.key_up(key);
                    }
                }
                egui::Event::Text(text) => {
                    if !typing_elsewhere && self.session.text_edit().is_some() {
                        self.session.text_input(&text);
                    }
                }
                egui::Event::Copy if !typing_elsewhere => {
                    self.session.key_down(Key::C, Modifiers { shift: false, command: true });
                }
                // Only fires when the clipboard holds text; the toolbar button covers images.
                egui::Event::Paste(_) if !typing_elsewhere => {
                    self.session.key_down(Key::V, Modifiers { shift: false, command: true });
                }
                egui::Event::WindowFocused(false) => self.session.focus_lost(),
                _ => {}
            }
        }
    }

    fn upload_frame(&mut self, ctx: &egui::Context) {
        let _timer = ScopeTimer::new("frame_upload");
        let frame = self.session.frame();
        if frame.width() == 0 || frame.height() == 0 {
            return;
        }
        let image = frame.to_color_image();
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture("viewport", image, TextureOptions::NEAREST));
            }
        }
    }
}

impl eframe::App for IllustratorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for outcome in self.session.poll_jobs() {
            if let Some(msg) = outcome.message {
                log::debug!("Job outcome: {msg}");
            }
        }

        ui::top_bar::top_bar(&mut self.session, &mut self.panel, ctx);
        ui::layers::layers_window(ctx, &mut self.session, &mut self.panel);
        ui::text_settings::text_settings_window(ctx, &mut self.session);

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::from_rgb(0xe5, 0xe7, 0xeb)))
            .show(ctx, |ui| {
                let (rect, response) =
                    ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
                if rect.size() != self.viewport {
                    self.viewport = rect.size();
                    self.session.resize_viewport(rect.width(), rect.height());
                }

                self.handle_events(ctx, rect, response.hovered());
                if response.double_clicked() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        self.session
                            .double_click(Vec2::new(pos.x - rect.min.x, pos.y - rect.min.y));
                    }
                }

                if self.session.tick() || self.texture.is_none() {
                    self.upload_frame(ctx);
                }
                if let Some(texture) = &self.texture {
                    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                    let size = texture.size_vec2();
                    ui.painter().image(
                        texture.id(),
                        egui::Rect::from_min_size(rect.min, size),
                        uv,
                        Color32::WHITE,
                    );
                }
            });

        let max = self.session.config().max_notices;
        for notice in self.session.take_notices() {
            self.notices.push(notice, max);
        }
        self.notices.show(ctx);

        if self.session.compositor().needs_redraw() {
            ctx.request_repaint();
        } else if self.session.pending_jobs() > 0 {
            ctx.request_repaint_after(Duration::from_millis(16));
        }
    }
}

fn map_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        _ => None,
    }
}

fn map_modifiers(modifiers: egui::Modifiers) -> Modifiers {
    Modifiers {
        shift: modifiers.shift,
        command: modifiers.command,
    }
}

fn map_key(key: egui::Key) -> Option<Key> {
    Some(match key {
        egui::Key::Space => Key::Space,
        egui::Key::Escape => Key::Escape,
        egui::Key::Enter => Key::Enter,
        egui::Key::Backspace => Key::Backspace,
        egui::Key::Z => Key::Z,
        egui::Key::C => Key::C,
        egui::Key::V => Key::V,
        egui::Key::Plus | egui::Key::Equals => Key::Plus,
        egui::Key::Minus => Key::Minus,
        egui::Key::Num0 => Key::Zero,
        _ => return None,
    })
}
