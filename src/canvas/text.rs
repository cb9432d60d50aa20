use ab_glyph::{point, Font, FontArc, PxScale, ScaleFont};
use eframe::egui::Color32;

use crate::canvas::layer::{FontFamily, TextContent};
use crate::canvas::surface::{CompositeMode, Surface};
use crate::utils::vector::{Rect, Vec2};

/// Lays out and rasterizes single-line text with the bundled font faces.
pub struct TextRenderer {
    sans: Option<FontArc>,
    mono: Option<FontArc>,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        let load = |name: &str, bytes: &'static [u8]| match FontArc::try_from_slice(bytes) {
            Ok(font) => Some(font),
            Err(err) => {
                log::error!("Failed to load bundled font {name}: {err}");
                None
            }
        };
        Self {
            sans: load("Ubuntu-Light", epaint_default_fonts::UBUNTU_LIGHT),
            mono: load("Hack-Regular", epaint_default_fonts::HACK_REGULAR),
        }
    }

    fn font(&self, family: FontFamily) -> Option<&FontArc> {
        match family {
            FontFamily::Sans => self.sans.as_ref().or(self.mono.as_ref()),
            FontFamily::Mono => self.mono.as_ref().or(self.sans.as_ref()),
        }
    }

    /// Extra horizontal passes used to fake heavier weights.
    fn bold_passes(content: &TextContent) -> i32 {
        if content.style.is_bold() {
            (content.style.size / 24.0).ceil().max(1.0) as i32
        } else {
            0
        }
    }

    /// Width and height of the text box whose top-left corner is the layer position.
    pub fn measure(&self, content: &TextContent) -> Vec2 {
        let Some(font) = self.font(content.style.family) else {
            return Vec2::ZERO;
        };
        let scaled = font.as_scaled(PxScale::from(content.style.size));
        let mut width = 0.0;
        let mut last = None;
        for ch in content.text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = last {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            last = Some(id);
        }
        let extra = Self::bold_passes(content) as f32;
        Vec2::new(width + extra, scaled.ascent() - scaled.descent())
    }

    /// World-space box covered by a text layer placed at `position`.
    pub fn bounds(&self, content: &TextContent, position: Vec2) -> Rect {
        let size = self.measure(content);
        Rect::new(position.x, position.y, size.x, size.y)
    }

    /// Rasterize `content` with its top edge at `origin` (pixel space of `target`).
    pub fn draw(&self, content: &TextContent, target: &mut Surface, origin: Vec2) {
        let Some(font) = self.font(content.style.family) else {
            return;
        };
        if content.text.is_empty() || content.style.size <= 0.0 {
            return;
        }
        let scale = PxScale::from(content.style.size);
        let scaled = font.as_scaled(scale);
        let ascent = scaled.ascent();
        let color = content.style.color;
        let passes = Self::bold_passes(content);

        let mut caret = 0.0;
        let mut last = None;
        for ch in content.text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = last {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(origin.x + caret, origin.y + ascent));
            caret += scaled.h_advance(id);
            last = Some(id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            let mut coverage = Vec::new();
            outlined.draw(|gx, gy, cov| coverage.push((gx as i32, gy as i32, cov)));
            for pass in 0..=passes {
                for &(gx, gy, cov) in &coverage {
                    if cov <= 0.0 {
                        continue;
                    }
                    let px = bounds.min.x as i32 + gx + pass;
                    let py = bounds.min.y as i32 + gy;
                    target.blend(px, py, scale_coverage(color, cov), CompositeMode::Paint);
                }
            }
        }
    }
}

/// Scale a premultiplied color by a 0..1 coverage factor.
pub fn scale_coverage(color: Color32, coverage: f32) -> Color32 {
    let c = coverage.clamp(0.0, 1.0);
    if c >= 1.0 {
        return color;
    }
    let s = |v: u8| (v as f32 * c).round() as u8;
    Color32::from_rgba_premultiplied(s(color.r()), s(color.g()), s(color.b()), s(color.a()))
}
