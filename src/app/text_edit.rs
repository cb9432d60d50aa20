use crate::canvas::layer::{LayerId, TextContent, TextStyle};
use crate::utils::vector::Vec2;

/// Inline text editor state. `target` is set when an existing text layer was reopened.
#[derive(Clone, Debug, PartialEq)]
pub struct TextEdit {
    pub anchor: Vec2,
    pub content: TextContent,
    pub target: Option<LayerId>,
}

impl TextEdit {
    pub fn new(anchor: Vec2, style: TextStyle) -> Self {
        Self {
            anchor,
            content: TextContent {
                text: String::new(),
                style,
            },
            target: None,
        }
    }

    pub fn reopen(layer: LayerId, anchor: Vec2, content: TextContent) -> Self {
        Self {
            anchor,
            content,
            target: Some(layer),
        }
    }

    pub fn text(&self) -> &str {
        &self.content.text
    }

    /// Append typed text; control characters are dropped (single line).
    pub fn insert(&mut self, input: &str) {
        self.content.text.extend(input.chars().filter(|c| !c.is_control()));
    }

    pub fn backspace(&mut self) {
        self.content.text.pop();
    }

    /// Text to commit, or `None` if only whitespace was typed.
    pub fn committed_text(&self) -> Option<&str> {
        let trimmed = self.content.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Keep a new anchor inside the world so the editor stays reachable.
pub fn clamp_anchor(pos: Vec2, world: Vec2, font_size: f32) -> Vec2 {
    Vec2::new(
        pos.x.min(world.x - 8.0).max(0.0),
        pos.y.min(world.y - font_size).max(0.0),
    )
}
