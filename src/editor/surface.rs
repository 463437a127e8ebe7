//! An owned RGBA drawing surface for the editor overlay.
//!
//! Brush strokes are rendered as densely stamped circles along each pointer
//! segment (step 1px), which gives round caps and joins without a path
//! rasterizer. The surface also draws the crop spotlight and computes the
//! destination-out punch for inpainting.

use image::{Rgba, RgbaImage};

pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// A fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width.max(1), height.max(1), Rgba([0, 0, 0, 0])),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        for px in self.pixels.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }

    /// True if any pixel has paint on it.
    pub fn has_coverage(&self) -> bool {
        self.pixels.pixels().any(|p| p[3] > 0)
    }

    /// Stamp one filled circle. Writes the color as-is; overlapping stamps of
    /// the same translucent color stay at that color's alpha.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
        if radius <= 0.0 {
            return;
        }
        let (w, h) = (self.width(), self.height());
        let radius_sq = radius * radius;
        let min_x = (cx - radius).max(0.0) as u32;
        let max_x = ((cx + radius) as u32).min(w.saturating_sub(1));
        let min_y = (cy - radius).max(0.0) as u32;
        let max_y = ((cy + radius) as u32).min(h.saturating_sub(1));
        if min_x > max_x || min_y > max_y {
            return;
        }

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= radius_sq {
                    self.pixels.put_pixel(x, y, color);
                }
            }
        }
    }

    /// Stroke a segment with round caps by stamping circles every pixel of
    /// travel.
    pub fn stroke_line(
        &mut self,
        start: (f32, f32),
        end: (f32, f32),
        stroke_width: f32,
        color: Rgba<u8>,
    ) {
        let radius = stroke_width / 2.0;
        let dx = end.0 - start.0;
        let dy = end.1 - start.1;
        let distance = (dx * dx + dy * dy).sqrt();

        if distance < 0.1 {
            self.fill_circle(start.0, start.1, radius, color);
            return;
        }

        let steps = distance.ceil() as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.fill_circle(start.0 + dx * t, start.1 + dy * t, radius, color);
        }
    }

    /// Fill the whole surface with one color.
    pub fn fill(&mut self, color: Rgba<u8>) {
        for px in self.pixels.pixels_mut() {
            *px = color;
        }
    }

    /// Make a rectangle fully transparent (the crop spotlight window).
    pub fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let (sw, sh) = (self.width(), self.height());
        let x0 = x.max(0.0) as u32;
        let y0 = y.max(0.0) as u32;
        let x1 = ((x + w) as u32).min(sw);
        let y1 = ((y + h) as u32).min(sh);
        for py in y0..y1 {
            for px in x0..x1 {
                self.pixels.put_pixel(px, py, Rgba([0, 0, 0, 0]));
            }
        }
    }

    /// Stroke a rectangle outline of the given border width, drawn just
    /// outside the rectangle edges.
    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, border: f32, color: Rgba<u8>) {
        let b = border.max(1.0);
        // top, bottom, left, right bands
        self.fill_band(x - b, y - b, w + 2.0 * b, b, color);
        self.fill_band(x - b, y + h, w + 2.0 * b, b, color);
        self.fill_band(x - b, y, b, h, color);
        self.fill_band(x + w, y, b, h, color);
    }

    fn fill_band(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba<u8>) {
        let (sw, sh) = (self.width(), self.height());
        let x0 = x.max(0.0) as u32;
        let y0 = y.max(0.0) as u32;
        let x1 = ((x + w).max(0.0) as u32).min(sw);
        let y1 = ((y + h).max(0.0) as u32).min(sh);
        for py in y0..y1 {
            for px in x0..x1 {
                self.pixels.put_pixel(px, py, color);
            }
        }
    }

    /// Copy `base` and make it fully transparent wherever this surface has
    /// any paint coverage. This is what the inpainting model receives: the
    /// hole marks the region to regenerate.
    pub fn punch_out(&self, base: &RgbaImage) -> RgbaImage {
        let mut out = base.clone();
        for (x, y, px) in self.pixels.enumerate_pixels() {
            if px[3] > 0 && x < out.width() && y < out.height() {
                out.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAINT: Rgba<u8> = Rgba([236, 72, 153, 178]);

    #[test]
    fn new_surface_has_no_coverage() {
        let surface = Surface::new(20, 20);
        assert!(!surface.has_coverage());
    }

    #[test]
    fn circle_stamp_covers_center_not_corner() {
        let mut surface = Surface::new(20, 20);
        surface.fill_circle(10.0, 10.0, 5.0, PAINT);
        assert_eq!(surface.pixels().get_pixel(10, 10)[3], 178);
        assert_eq!(surface.pixels().get_pixel(0, 0)[3], 0);
        // overlapping stamps never accumulate alpha
        surface.fill_circle(10.0, 10.0, 5.0, PAINT);
        assert_eq!(surface.pixels().get_pixel(10, 10)[3], 178);
    }

    #[test]
    fn stroke_is_continuous_between_distant_points() {
        let mut surface = Surface::new(40, 10);
        surface.stroke_line((2.0, 5.0), (38.0, 5.0), 4.0, PAINT);
        for x in 2..38 {
            assert!(surface.pixels().get_pixel(x, 5)[3] > 0, "gap at x={x}");
        }
    }

    #[test]
    fn punch_out_zeroes_painted_pixels_only() {
        let base = RgbaImage::from_pixel(10, 10, Rgba([50, 60, 70, 255]));
        let mut surface = Surface::new(10, 10);
        surface.fill_circle(3.0, 3.0, 2.0, PAINT);

        let punched = surface.punch_out(&base);
        assert_eq!(punched.get_pixel(3, 3)[3], 0);
        assert_eq!(*punched.get_pixel(8, 8), Rgba([50, 60, 70, 255]));
    }

    #[test]
    fn spotlight_clears_window_and_strokes_border() {
        let mut surface = Surface::new(30, 30);
        surface.fill(Rgba([0, 0, 0, 128]));
        surface.clear_rect(10.0, 10.0, 10.0, 10.0);
        surface.stroke_rect(10.0, 10.0, 10.0, 10.0, 2.0, Rgba([255, 255, 255, 204]));

        assert_eq!(surface.pixels().get_pixel(15, 15)[3], 0);
        assert_eq!(surface.pixels().get_pixel(2, 2)[3], 128);
        assert_eq!(surface.pixels().get_pixel(9, 15)[3], 204);
    }
}
