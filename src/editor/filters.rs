//! Color filter stack: brightness, contrast, grayscale, sepia.
//!
//! The four adjustments compose in that fixed order, each clamping to 8-bit
//! range, matching a CSS `filter` chain. Brightness and contrast are
//! percentages with 100 = identity; grayscale and sepia are 0..100 mix
//! amounts. Alpha passes through untouched.

use image::RgbaImage;
use rayon::prelude::*;

pub const BRIGHTNESS_DEFAULT: u32 = 100;
pub const CONTRAST_DEFAULT: u32 = 100;
pub const GRAYSCALE_DEFAULT: u32 = 0;
pub const SEPIA_DEFAULT: u32 = 0;

pub const BRIGHTNESS_MAX: u32 = 200;
pub const CONTRAST_MAX: u32 = 200;
pub const GRAYSCALE_MAX: u32 = 100;
pub const SEPIA_MAX: u32 = 100;

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FilterValues {
    pub brightness: u32,
    pub contrast: u32,
    pub grayscale: u32,
    pub sepia: u32,
}

impl Default for FilterValues {
    fn default() -> Self {
        Self {
            brightness: BRIGHTNESS_DEFAULT,
            contrast: CONTRAST_DEFAULT,
            grayscale: GRAYSCALE_DEFAULT,
            sepia: SEPIA_DEFAULT,
        }
    }
}

impl FilterValues {
    /// Human-readable descriptor of the active stack, e.g.
    /// `brightness(120%) contrast(100%) grayscale(0%) sepia(30%)`.
    pub fn descriptor(&self) -> String {
        format!(
            "brightness({}%) contrast({}%) grayscale({}%) sepia({}%)",
            self.brightness, self.contrast, self.grayscale, self.sepia
        )
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Bake the stack into a new image, row-parallel.
    pub fn bake(&self, image: &RgbaImage) -> RgbaImage {
        if self.is_identity() {
            return image.clone();
        }

        let brightness = self.brightness as f32 / 100.0;
        let contrast = self.contrast as f32 / 100.0;
        let grayscale = self.grayscale as f32 / 100.0;
        let sepia = self.sepia as f32 / 100.0;

        let (w, h) = (image.width(), image.height());
        let mut raw = image.as_raw().clone();
        let stride = w as usize * 4;

        raw.par_chunks_mut(stride).for_each(|row| {
            for px in row.chunks_exact_mut(4) {
                let mut r = px[0] as f32 / 255.0;
                let mut g = px[1] as f32 / 255.0;
                let mut b = px[2] as f32 / 255.0;

                // brightness: linear multiplier
                r = (r * brightness).clamp(0.0, 1.0);
                g = (g * brightness).clamp(0.0, 1.0);
                b = (b * brightness).clamp(0.0, 1.0);

                // contrast: pivot around mid-gray
                r = ((r - 0.5) * contrast + 0.5).clamp(0.0, 1.0);
                g = ((g - 0.5) * contrast + 0.5).clamp(0.0, 1.0);
                b = ((b - 0.5) * contrast + 0.5).clamp(0.0, 1.0);

                // grayscale: mix toward Rec. 709 luminance
                if grayscale > 0.0 {
                    let lum = 0.2126 * r + 0.7152 * g + 0.0722 * b;
                    r += (lum - r) * grayscale;
                    g += (lum - g) * grayscale;
                    b += (lum - b) * grayscale;
                }

                // sepia: mix toward the sepia matrix result
                if sepia > 0.0 {
                    let sr = (0.393 * r + 0.769 * g + 0.189 * b).min(1.0);
                    let sg = (0.349 * r + 0.686 * g + 0.168 * b).min(1.0);
                    let sb = (0.272 * r + 0.534 * g + 0.131 * b).min(1.0);
                    r += (sr - r) * sepia;
                    g += (sg - g) * sepia;
                    b += (sb - b) * sepia;
                }

                px[0] = (r * 255.0).round() as u8;
                px[1] = (g * 255.0).round() as u8;
                px[2] = (b * 255.0).round() as u8;
            }
        });

        // length is unchanged, so this cannot fail
        RgbaImage::from_raw(w, h, raw).unwrap_or_else(|| image.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([200, 100, 50, 255]));
        img.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        img.put_pixel(3, 3, Rgba([255, 255, 255, 128]));
        img
    }

    #[test]
    fn descriptor_lists_all_four_clauses() {
        let filters = FilterValues {
            brightness: 120,
            contrast: 80,
            grayscale: 0,
            sepia: 45,
        };
        assert_eq!(
            filters.descriptor(),
            "brightness(120%) contrast(80%) grayscale(0%) sepia(45%)"
        );
    }

    #[test]
    fn identity_bake_changes_nothing() {
        let img = sample();
        assert_eq!(FilterValues::default().bake(&img), img);
    }

    #[test]
    fn zero_brightness_blacks_out_but_keeps_alpha() {
        let filters = FilterValues {
            brightness: 0,
            ..FilterValues::default()
        };
        let out = filters.bake(&sample());
        assert_eq!(*out.get_pixel(1, 1), Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(3, 3)[3], 128);
    }

    #[test]
    fn full_grayscale_equalizes_channels() {
        let filters = FilterValues {
            grayscale: 100,
            ..FilterValues::default()
        };
        let out = filters.bake(&sample());
        let px = out.get_pixel(1, 1);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    #[test]
    fn contrast_pushes_values_away_from_midgray() {
        let filters = FilterValues {
            contrast: 200,
            ..FilterValues::default()
        };
        let out = filters.bake(&sample());
        let px = out.get_pixel(1, 1); // from (200, 100, 50)
        assert!(px[0] > 200);
        assert!(px[2] < 50);
    }

    #[test]
    fn bake_is_deterministic() {
        let filters = FilterValues {
            brightness: 130,
            contrast: 85,
            grayscale: 40,
            sepia: 25,
        };
        let img = sample();
        assert_eq!(filters.bake(&img), filters.bake(&img));
    }

    #[test]
    fn sepia_result_is_warm() {
        let filters = FilterValues {
            sepia: 100,
            ..FilterValues::default()
        };
        let out = filters.bake(&sample());
        let px = out.get_pixel(1, 1);
        assert!(px[0] >= px[1] && px[1] >= px[2]);
    }
}
