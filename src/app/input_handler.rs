use crate::app::session::EditorSession;
use crate::app::tools::Tool;
use crate::utils::vector::Vec2;
use crate::viewport::Gesture;

/// Identifier of one input device contact (mouse, pen or a single finger).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Pen,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    /// Ctrl, or Cmd on macOS.
    pub command: bool,
}

/// Pointer sample in viewport (screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub id: PointerId,
    pub kind: PointerKind,
    pub button: PointerButton,
    pub pos: Vec2,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Escape,
    Enter,
    Backspace,
    Z,
    C,
    V,
    Plus,
    Minus,
    Zero,
}

/// Which interaction owns the pointer stream.
#[derive(Debug, Clone)]
pub(crate) enum Capture {
    None,
    Pan {
        pointer: PointerId,
        start_pointer: Vec2,
        start_offset: Vec2,
    },
    Tool {
        pointer: PointerId,
        kind: PointerKind,
        last: Vec2,
    },
    Gesture {
        a: (PointerId, Vec2),
        b: (PointerId, Vec2),
        gesture: Gesture,
    },
}

impl EditorSession {
    pub fn pointer_down(&mut self, ev: PointerEvent) {
        match self.capture.clone() {
            Capture::None => {}
            Capture::Tool {
                pointer,
                kind: PointerKind::Touch,
                last,
            } if ev.kind == PointerKind::Touch && ev.id != pointer => {
                let world = self.view.screen_to_world(last);
                self.tool_up(world, false);
                self.start_gesture((pointer, last), (ev.id, ev.pos));
                return;
            }
            _ => return,
        }

        let pan = ev.kind == PointerKind::Mouse
            && (ev.button == PointerButton::Middle
                || (ev.button == PointerButton::Primary && self.space_held));
        if pan {
            self.capture = Capture::Pan {
                pointer: ev.id,
                start_pointer: ev.pos,
                start_offset: self.view.offset,
            };
            return;
        }
        if ev.button != PointerButton::Primary {
            return;
        }

        let world = self.view.screen_to_world(ev.pos);
        self.tool_down(world, ev.modifiers.shift);
        // Touches are always captured so a second finger can start a gesture.
        if self.op.is_some() || ev.kind == PointerKind::Touch {
            self.capture = Capture::Tool {
                pointer: ev.id,
                kind: ev.kind,
                last: ev.pos,
            };
        }
    }

    fn start_gesture(&mut self, a: (PointerId, Vec2), b: (PointerId, Vec2)) {
        let gesture = Gesture::begin(a.1, b.1, &self.view, self.config.view.gesture_sensitivity);
        log::debug!("Two-pointer gesture started");
        self.capture = Capture::Gesture { a, b, gesture };
    }

    pub fn pointer_move(&mut self, ev: PointerEvent) {
        match &mut self.capture {
            Capture::None => {}
            Capture::Pan {
                pointer,
                start_pointer,
                start_offset,
            } => {
                if *pointer != ev.id {
                    return;
                }
                let offset = *start_offset + (ev.pos - *start_pointer);
                self.view.pan_to(offset);
                self.request_redraw();
            }
            Capture::Tool { pointer, last, .. } => {
                if *pointer != ev.id {
                    return;
                }
                *last = ev.pos;
                let world = self.view.screen_to_world(ev.pos);
                self.tool_move(world, ev.modifiers.shift);
            }
            Capture::Gesture { a, b, gesture } => {
                if a.0 == ev.id {
                    a.1 = ev.pos;
                } else if b.0 == ev.id {
                    b.1 = ev.pos;
                } else {
                    return;
                }
                gesture.update(a.1, b.1, &mut self.view);
                self.request_redraw();
            }
        }
    }

    pub fn pointer_up(&mut self, ev: PointerEvent) {
        match self.capture.clone() {
            Capture::None => {}
            Capture::Pan { pointer, .. } if pointer == ev.id => {
                self.capture = Capture::None;
            }
            Capture::Tool { pointer, .. } if pointer == ev.id => {
                self.capture = Capture::None;
                let world = self.view.screen_to_world(ev.pos);
                self.tool_up(world, ev.modifiers.shift);
            }
            Capture::Gesture { a, b, .. } if a.0 == ev.id || b.0 == ev.id => {
                self.capture = Capture::None;
            }
            _ => {}
        }
    }

    /// Pointer capture was lost: end whatever that pointer was doing.
    pub fn lost_capture(&mut self, id: PointerId) {
        let owned = match &self.capture {
            Capture::None => false,
            Capture::Pan { pointer, .. } | Capture::Tool { pointer, .. } => *pointer == id,
            Capture::Gesture { a, b, .. } => a.0 == id || b.0 == id,
        };
        if owned {
            self.cancel_interaction();
        }
    }

    /// Window blur or focus loss.
    pub fn focus_lost(&mut self) {
        self.space_held = false;
        self.cancel_interaction();
        self.close_text_editor(true);
    }

    /// Terminate pan, gesture or tool work and reset transient state.
    pub(crate) fn cancel_interaction(&mut self) {
        if !matches!(self.capture, Capture::None) {
            log::debug!("Interaction cancelled");
        }
        self.capture = Capture::None;
        self.cancel_tool_op();
    }

    /// Mouse wheel zoom anchored at the pointer.
    pub fn wheel(&mut self, pos: Vec2, delta_y: f32, ctrl: bool) {
        let intensity = if ctrl {
            self.config.view.wheel_intensity_ctrl
        } else {
            self.config.view.wheel_intensity
        };
        if self.view.zoom_by(pos, (-delta_y * intensity).exp()) {
            self.request_redraw();
        }
    }

    pub fn double_click(&mut self, pos: Vec2) {
        if self.tool != Tool::Text {
            return;
        }
        let world = self.view.screen_to_world(pos);
        self.reopen_text_at(world);
    }

    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) {
        if self.text_edit.is_some() {
            match key {
                Key::Enter => self.close_text_editor(true),
                Key::Escape => self.close_text_editor(false),
                Key::Backspace => {
                    if let Some(edit) = &mut self.text_edit {
                        edit.backspace();
                    }
                    self.request_redraw();
                }
                Key::Z if modifiers.command => {
                    self.undo();
                }
                _ => {}
            }
            return;
        }
        if modifiers.command {
            let step = self.config.view.zoom_step;
            match key {
                Key::Z => {
                    self.undo();
                }
                Key::C => {
                    self.copy();
                }
                Key::V => {
                    self.paste();
                }
                Key::Plus => {
                    self.view.zoom_about_center(step);
                }
                Key::Minus => {
                    self.view.zoom_about_center(1.0 / step);
                }
                Key::Zero => self.view.reset(),
                _ => {}
            }
            self.request_redraw();
            return;
        }
        match key {
            Key::Space => self.space_held = true,
            // Commits the floating selection where it is.
            Key::Escape => {
                self.cancel_interaction();
                self.commit_selection();
            }
            _ => {}
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if key == Key::Space {
            self.space_held = false;
        }
    }
}
