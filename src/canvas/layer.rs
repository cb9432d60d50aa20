use std::fmt;

use eframe::egui::Color32;

use crate::canvas::surface::Surface;
use crate::utils::vector::Vec2;

/// Stable layer identity. Ids are handed out in increasing order and never reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Font faces bundled with the editor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FontFamily {
    Sans,
    Mono,
}

impl FontFamily {
    pub fn label(&self) -> &'static str {
        match self {
            FontFamily::Sans => "Sans",
            FontFamily::Mono => "Mono",
        }
    }
}

/// Font attributes and color of a text layer.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub family: FontFamily,
    pub weight: u16, // 100..=900
    pub size: f32,
    pub color: Color32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            family: FontFamily::Sans,
            weight: 400,
            size: 32.0,
            color: Color32::BLACK,
        }
    }
}

impl TextStyle {
    pub fn is_bold(&self) -> bool {
        self.weight >= 600
    }
}

/// Text layer payload; it is measured and rasterized every time it is drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct TextContent {
    pub text: String,
    pub style: TextStyle,
}

#[derive(Debug)]
pub enum LayerKind {
    Raster(Surface),
    Text(TextContent),
}

/// Single layer with its own visibility and placement in world space.
#[derive(Debug)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub position: Vec2,
    pub kind: LayerKind,
}

impl Layer {
    pub fn is_raster(&self) -> bool {
        matches!(self.kind, LayerKind::Raster(_))
    }

    pub fn surface(&self) -> Option<&Surface> {
        match &self.kind {
            LayerKind::Raster(surface) => Some(surface),
            LayerKind::Text(_) => None,
        }
    }

    pub fn surface_mut(&mut self) -> Option<&mut Surface> {
        match &mut self.kind {
            LayerKind::Raster(surface) => Some(surface),
            LayerKind::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&TextContent> {
        match &self.kind {
            LayerKind::Text(content) => Some(content),
            LayerKind::Raster(_) => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut TextContent> {
        match &mut self.kind {
            LayerKind::Text(content) => Some(content),
            LayerKind::Raster(_) => None,
        }
    }

    /// Convert a world position into this layer's local pixel space.
    pub fn to_local(&self, world: Vec2) -> Vec2 {
        world - self.position
    }
}
