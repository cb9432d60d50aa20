use eframe::egui::{Color32, ColorImage};

use crate::error::{EditorError, EditorResult};

/// How a drawing operation combines its color with the destination pixel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompositeMode {
    /// Source-over.
    Paint,
    /// Reduce destination alpha by the source alpha.
    Erase,
}

/// Row-major buffer of premultiplied pixels. Every raster layer owns one.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<Color32>,
}

impl Surface {
    /// Fully transparent surface.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Color32::TRANSPARENT)
    }

    pub fn filled(width: usize, height: usize, color: Color32) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    /// Allocate without aborting when memory is short.
    pub fn try_new(width: usize, height: usize) -> EditorResult<Self> {
        let len = width * height;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| EditorError::ResourceExhaustion { bytes: len * 4 })?;
        pixels.resize(len, Color32::TRANSPARENT);
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Fallible deep copy used for history snapshots.
    pub fn try_clone(&self) -> EditorResult<Self> {
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(self.pixels.len())
            .map_err(|_| EditorError::ResourceExhaustion {
                bytes: self.pixels.len() * 4,
            })?;
        pixels.extend_from_slice(&self.pixels);
        Ok(Self {
            width: self.width,
            height: self.height,
            pixels,
        })
    }

    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Color32>) -> Option<Self> {
        (pixels.len() == width * height).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Color32] {
        &self.pixels
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.len() * 4
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Color32> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    pub fn set(&mut self, x: i32, y: i32, color: Color32) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Combine `color` into one pixel; out-of-bounds writes are dropped.
    #[inline]
    pub fn blend(&mut self, x: i32, y: i32, color: Color32, mode: CompositeMode) {
        if let Some(i) = self.index(x, y) {
            let dst = self.pixels[i];
            self.pixels[i] = match mode {
                CompositeMode::Paint => alpha_over(color, dst),
                CompositeMode::Erase => blend_erase(color, dst),
            };
        }
    }

    pub fn fill(&mut self, color: Color32) {
        self.pixels.fill(color);
    }

    pub fn clear(&mut self) {
        self.fill(Color32::TRANSPARENT);
    }

    /// Overwrite this surface with `other`, which must have the same size.
    pub fn restore_from(&mut self, other: &Surface) {
        if other.width == self.width && other.height == self.height {
            self.pixels.copy_from_slice(&other.pixels);
        } else {
            *self = other.clone();
        }
    }

    /// Pixel range `[x0, x1) x [y0, y1)` of a rect after clipping to the surface.
    fn clip(&self, x: i32, y: i32, w: usize, h: usize) -> Option<(usize, usize, usize, usize)> {
        let x0 = x.max(0) as usize;
        let y0 = y.max(0) as usize;
        let x1 = (x + w as i32).clamp(0, self.width as i32) as usize;
        let y1 = (y + h as i32).clamp(0, self.height as i32) as usize;
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    pub fn clear_rect(&mut self, x: i32, y: i32, w: usize, h: usize) {
        if let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) {
            for row in y0..y1 {
                let start = row * self.width;
                self.pixels[start + x0..start + x1].fill(Color32::TRANSPARENT);
            }
        }
    }

    /// Copy a `w x h` region starting at `(x, y)`; pixels outside the surface read as transparent.
    pub fn copy_region(&self, x: i32, y: i32, w: usize, h: usize) -> Surface {
        let mut out = Surface::new(w, h);
        if let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) {
            let dx = (x0 as i32 - x) as usize;
            let dy = (y0 as i32 - y) as usize;
            let len = x1 - x0;
            for row in y0..y1 {
                let src = row * self.width + x0;
                let dst = (row - y0 + dy) * w + dx;
                out.pixels[dst..dst + len].copy_from_slice(&self.pixels[src..src + len]);
            }
        }
        out
    }

    /// Source-over `src` with its top-left corner at `(dx, dy)`.
    pub fn draw_surface(&mut self, src: &Surface, dx: i32, dy: i32) {
        let Some((x0, y0, x1, y1)) = self.clip(dx, dy, src.width, src.height) else {
            return;
        };
        for row in y0..y1 {
            let src_row = (row as i32 - dy) as usize * src.width;
            let dst_row = row * self.width;
            for col in x0..x1 {
                let s = src.pixels[src_row + (col as i32 - dx) as usize];
                if s.a() == 0 {
                    continue;
                }
                let d = &mut self.pixels[dst_row + col];
                *d = alpha_over(s, *d);
            }
        }
    }

    /// Source-over `src` stretched to `w x h` with nearest-neighbour sampling.
    pub fn draw_surface_scaled(&mut self, src: &Surface, dx: i32, dy: i32, w: usize, h: usize) {
        if w == src.width && h == src.height {
            self.draw_surface(src, dx, dy);
            return;
        }
        if src.width == 0 || src.height == 0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip(dx, dy, w, h) else {
            return;
        };
        for row in y0..y1 {
            let ty = (row as i32 - dy) as usize;
            let sy = ((ty * src.height) / h).min(src.height - 1);
            for col in x0..x1 {
                let tx = (col as i32 - dx) as usize;
                let sx = ((tx * src.width) / w).min(src.width - 1);
                let s = src.pixels[sy * src.width + sx];
                if s.a() == 0 {
                    continue;
                }
                let d = &mut self.pixels[row * self.width + col];
                *d = alpha_over(s, *d);
            }
        }
    }

    /// Grow to at least `w x h`, keeping existing pixels anchored at the top-left.
    pub fn grow_to(&mut self, w: usize, h: usize) {
        let new_w = self.width.max(w);
        let new_h = self.height.max(h);
        if new_w == self.width && new_h == self.height {
            return;
        }
        let mut grown = Surface::new(new_w, new_h);
        for row in 0..self.height {
            let src = row * self.width;
            let dst = row * new_w;
            grown.pixels[dst..dst + self.width].copy_from_slice(&self.pixels[src..src + self.width]);
        }
        *self = grown;
    }

    pub fn is_fully_transparent(&self) -> bool {
        self.pixels.iter().all(|p| p.a() == 0)
    }

    /// Bounding box `(x, y, w, h)` of all non-transparent pixels.
    pub fn content_bounds(&self) -> Option<(i32, i32, usize, usize)> {
        let mut min_x = usize::MAX;
        let mut min_y = usize::MAX;
        let mut max_x = 0;
        let mut max_y = 0;
        let mut found = false;
        for (i, p) in self.pixels.iter().enumerate() {
            if p.a() > 0 {
                let (x, y) = (i % self.width, i / self.width);
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
                found = true;
            }
        }
        found.then(|| (min_x as i32, min_y as i32, max_x - min_x + 1, max_y - min_y + 1))
    }

    pub fn to_color_image(&self) -> ColorImage {
        let mut img = ColorImage::new([self.width, self.height], Color32::TRANSPARENT);
        img.pixels.copy_from_slice(&self.pixels);
        img
    }

    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for px in &self.pixels {
            bytes.extend_from_slice(&px.to_srgba_unmultiplied());
        }
        image::RgbaImage::from_raw(self.width as u32, self.height as u32, bytes)
            .unwrap_or_else(|| image::RgbaImage::new(self.width as u32, self.height as u32))
    }

    pub fn from_rgba_image(img: &image::RgbaImage) -> Self {
        let pixels = img
            .pixels()
            .map(|p| Color32::from_rgba_unmultiplied(p[0], p[1], p[2], p[3]))
            .collect();
        Self {
            width: img.width() as usize,
            height: img.height() as usize,
            pixels,
        }
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Color32] {
        &mut self.pixels
    }

    /// Fill a clipped rectangle with an opaque or blended color.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: usize, h: usize, color: Color32) {
        if let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) {
            for row in y0..y1 {
                for col in x0..x1 {
                    let d = &mut self.pixels[row * self.width + col];
                    *d = alpha_over(color, *d);
                }
            }
        }
    }
}

/// Erase blend mode: reduce destination alpha by the source alpha.
pub fn blend_erase(src: Color32, dst: Color32) -> Color32 {
    let src_a = src.a() as u32;
    let inv = 255 - src_a;
    let out_a = (dst.a() as u32 * inv + 127) / 255;
    let out_r = (dst.r() as u32 * inv + 127) / 255;
    let out_g = (dst.g() as u32 * inv + 127) / 255;
    let out_b = (dst.b() as u32 * inv + 127) / 255;
    Color32::from_rgba_premultiplied(
        out_r.min(255) as u8,
        out_g.min(255) as u8,
        out_b.min(255) as u8,
        out_a.min(255) as u8,
    )
}

/// Standard "source over" alpha compositing for premultiplied colors.
pub fn alpha_over(src: Color32, dst: Color32) -> Color32 {
    let src_a = src.a() as u32;
    if src_a == 255 {
        return src;
    }
    let dst_a = dst.a() as u32;
    let inv = 255 - src_a;
    let out_a = src_a + (dst_a * inv + 127) / 255;
    if out_a == 0 {
        return Color32::TRANSPARENT;
    }

    let out_r = src.r() as u32 + (dst.r() as u32 * inv + 127) / 255;
    let out_g = src.g() as u32 + (dst.g() as u32 * inv + 127) / 255;
    let out_b = src.b() as u32 + (dst.b() as u32 * inv + 127) / 255;

    Color32::from_rgba_premultiplied(
        out_r.min(255) as u8,
        out_g.min(255) as u8,
        out_b.min(255) as u8,
        out_a.min(255) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_region_pads_out_of_bounds_with_transparency() {
        let src = Surface::filled(4, 4, Color32::RED);
        let region = src.copy_region(2, 2, 4, 4);
        assert_eq!(region.get(0, 0), Some(Color32::RED));
        assert_eq!(region.get(1, 1), Some(Color32::RED));
        assert_eq!(region.get(2, 2), Some(Color32::TRANSPARENT));
    }

    #[test]
    fn draw_onto_transparent_is_bit_identical() {
        let mut src = Surface::new(3, 3);
        src.set(1, 1, Color32::from_rgba_premultiplied(40, 20, 10, 90));
        src.set(0, 2, Color32::BLUE);
        let mut dst = Surface::new(3, 3);
        dst.draw_surface(&src, 0, 0);
        assert_eq!(dst, src);
    }

    #[test]
    fn erase_removes_coverage() {
        let mut s = Surface::filled(2, 2, Color32::RED);
        s.blend(0, 0, Color32::BLACK, CompositeMode::Erase);
        assert_eq!(s.get(0, 0), Some(Color32::TRANSPARENT));
        assert_eq!(s.get(1, 0), Some(Color32::RED));
    }

    #[test]
    fn grow_keeps_content_top_left() {
        let mut s = Surface::filled(2, 2, Color32::GREEN);
        s.grow_to(4, 3);
        assert_eq!((s.width(), s.height()), (4, 3));
        assert_eq!(s.get(1, 1), Some(Color32::GREEN));
        assert_eq!(s.get(3, 2), Some(Color32::TRANSPARENT));
        s.grow_to(1, 1);
        assert_eq!((s.width(), s.height()), (4, 3));
    }

    #[test]
    fn nearest_resample_doubles_pixels() {
        let mut s = Surface::new(2, 1);
        s.set(0, 0, Color32::RED);
        s.set(1, 0, Color32::BLUE);
        let mut big = Surface::new(4, 2);
        big.draw_surface_scaled(&s, 0, 0, 4, 2);
        assert_eq!(big.get(1, 1), Some(Color32::RED));
        assert_eq!(big.get(2, 0), Some(Color32::BLUE));
    }

    #[test]
    fn content_bounds_tracks_opaque_pixels() {
        let mut s = Surface::new(10, 10);
        assert_eq!(s.content_bounds(), None);
        s.set(2, 3, Color32::RED);
        s.set(5, 7, Color32::RED);
        assert_eq!(s.content_bounds(), Some((2, 3, 4, 5)));
    }
}
