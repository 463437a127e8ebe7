//! Reusable UI widgets: reference upload slots and the editor toolbar.

pub mod toolbar;
pub mod upload;

use egui::{Color32, ColorImage};
use image::RgbaImage;

/// Convert pixel data to an egui texture image.
pub(crate) fn rgba_to_color_image(img: &RgbaImage) -> ColorImage {
    let size = [img.width() as usize, img.height() as usize];
    let pixels: Vec<Color32> = img
        .pixels()
        .map(|p| Color32::from_rgba_unmultiplied(p[0], p[1], p[2], p[3]))
        .collect();
    ColorImage { size, pixels }
}
