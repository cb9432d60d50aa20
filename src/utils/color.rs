use eframe::egui::Color32;

/// Simple RGBA color stored as floats in 0..1, unpremultiplied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Construct from 0-255 channel values.
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    pub fn black() -> Self {
        Self::rgba(0, 0, 0, 255)
    }

    /// Solid white convenience color.
    pub fn white() -> Self {
        Self::rgba(255, 255, 255, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, ch) in out.iter_mut().zip(digits.chars()) {
                    let v = ch.to_digit(16)? as u8;
                    *slot = v * 16 + v;
                }
                Some(Self::rgba(out[0], out[1], out[2], 255))
            }
            6 => Some(Self::rgba(
                channel(digits.get(0..2)?)?,
                channel(digits.get(2..4)?)?,
                channel(digits.get(4..6)?)?,
                255,
            )),
            8 => Some(Self::rgba(
                channel(digits.get(0..2)?)?,
                channel(digits.get(2..4)?)?,
                channel(digits.get(4..6)?)?,
                channel(digits.get(6..8)?)?,
            )),
            _ => None,
        }
    }

    /// `#rrggbb` form used by the control panel.
    pub fn to_hex(&self) -> String {
        let [r, g, b, _] = self.to_color32().to_srgba_unmultiplied();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Convert to egui's 8-bit color format (premultiplied storage).
    pub fn to_color32(&self) -> Color32 {
        Color32::from_rgba_unmultiplied(
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            (self.a * 255.0).round() as u8,
        )
    }

    /// Convert from egui's 8-bit color format.
    pub fn from_color32(c: Color32) -> Self {
        let [r, g, b, a] = c.to_srgba_unmultiplied();
        Self::rgba(r, g, b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!(Color::from_hex("#f00"), Some(Color::rgba(255, 0, 0, 255)));
        assert_eq!(Color::from_hex("2563eb").map(|c| c.to_hex()), Some("#2563eb".to_string()));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn opaque_colors_survive_color32_round_trip() {
        let c = Color::rgba(10, 200, 30, 255);
        assert_eq!(Color::from_color32(c.to_color32()), c);
    }
}
