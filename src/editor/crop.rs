//! Crop rectangle tracking and the linked resize fields.
//!
//! Dragging sweeps out a normalized rectangle; the overlay redraws a dimming
//! scrim with a clear spotlight and a white border on every move. Applying
//! maps the rendered-space rectangle to native pixels and then scales to the
//! resize target. No rectangle means the full image (resize-only apply).

use egui::{Pos2, Rect, Vec2};
use image::{Rgba, RgbaImage, imageops};

use crate::editor::mapper::CoordMapper;
use crate::editor::surface::Surface;

const SCRIM: Rgba<u8> = Rgba([0, 0, 0, 128]);
const BORDER: Rgba<u8> = Rgba([255, 255, 255, 204]);
const BORDER_WIDTH: f32 = 2.0;

#[derive(Default)]
pub struct CropTracker {
    anchor: Option<Pos2>,
    /// Selected region in rendered coordinates, if any.
    pub rect: Option<Rect>,
}

impl CropTracker {
    /// Anchor a new drag; any previous selection is discarded.
    pub fn pointer_down(&mut self, surface: &mut Surface, pos: Pos2) {
        self.anchor = Some(pos);
        self.rect = None;
        surface.clear();
    }

    /// Update the rectangle and redraw the spotlight overlay.
    pub fn pointer_move(&mut self, surface: &mut Surface, pos: Pos2) {
        let Some(anchor) = self.anchor else {
            return;
        };
        let rect = Rect::from_two_pos(anchor, pos);
        self.rect = Some(rect);

        surface.fill(SCRIM);
        surface.clear_rect(rect.min.x, rect.min.y, rect.width(), rect.height());
        surface.stroke_rect(
            rect.min.x,
            rect.min.y,
            rect.width(),
            rect.height(),
            BORDER_WIDTH,
            BORDER,
        );
    }

    /// End the drag. The rectangle (and its overlay) persist until apply,
    /// cancel, or the next drag.
    pub fn pointer_up(&mut self) {
        self.anchor = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }
}

/// Width/height fields linked through the image's native aspect ratio.
#[derive(Clone, Copy)]
pub struct ResizeTarget {
    pub width: u32,
    pub height: u32,
}

impl ResizeTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Editing width recomputes height from the aspect ratio.
    pub fn set_width(&mut self, width: u32, aspect: f32) {
        self.width = width;
        self.height = (width as f32 / aspect).round().max(1.0) as u32;
    }

    /// Editing height recomputes width from the aspect ratio.
    pub fn set_height(&mut self, height: u32, aspect: f32) {
        self.height = height;
        self.width = (height as f32 * aspect).round().max(1.0) as u32;
    }
}

/// Apply crop + resize against the native image. `rect` is in rendered
/// coordinates; `None` keeps the full frame.
pub fn apply_crop(
    native: &RgbaImage,
    rect: Option<Rect>,
    mapper: &CoordMapper,
    target: ResizeTarget,
) -> RgbaImage {
    let (mut sx, mut sy, mut sw, mut sh) = (0u32, 0u32, native.width(), native.height());

    if let Some(rect) = rect {
        let scale_x = mapper.scale_x();
        let scale_y = mapper.scale_y();
        sx = ((rect.min.x * scale_x).max(0.0) as u32).min(native.width().saturating_sub(1));
        sy = ((rect.min.y * scale_y).max(0.0) as u32).min(native.height().saturating_sub(1));
        sw = ((rect.width() * scale_x) as u32)
            .max(1)
            .min(native.width() - sx);
        sh = ((rect.height() * scale_y) as u32)
            .max(1)
            .min(native.height() - sy);
    }

    let cropped = imageops::crop_imm(native, sx, sy, sw, sh).to_image();
    if cropped.width() == target.width && cropped.height() == target.height {
        cropped
    } else {
        imageops::resize(
            &cropped,
            target.width.max(1),
            target.height.max(1),
            imageops::FilterType::Triangle,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, 0, 255]))
    }

    #[test]
    fn drag_normalizes_any_direction() {
        let mut surface = Surface::new(100, 100);
        let mut tracker = CropTracker::default();

        // drag up-left
        tracker.pointer_down(&mut surface, Pos2::new(80.0, 70.0));
        tracker.pointer_move(&mut surface, Pos2::new(20.0, 30.0));
        tracker.pointer_up();

        let rect = tracker.rect.unwrap();
        assert_eq!(rect.min, Pos2::new(20.0, 30.0));
        assert_eq!(rect.width(), 60.0);
        assert_eq!(rect.height(), 40.0);

        // spotlight: clear inside, scrim outside
        assert_eq!(surface.pixels().get_pixel(50, 50)[3], 0);
        assert_eq!(surface.pixels().get_pixel(5, 5)[3], 128);
    }

    #[test]
    fn new_drag_discards_previous_rect() {
        let mut surface = Surface::new(100, 100);
        let mut tracker = CropTracker::default();

        tracker.pointer_down(&mut surface, Pos2::new(10.0, 10.0));
        tracker.pointer_move(&mut surface, Pos2::new(40.0, 40.0));
        tracker.pointer_up();
        assert!(tracker.rect.is_some());

        tracker.pointer_down(&mut surface, Pos2::new(60.0, 60.0));
        assert!(tracker.rect.is_none());
        assert!(!surface.has_coverage());
    }

    #[test]
    fn no_rect_means_full_image_resize_only() {
        let native = gradient(200, 100);
        let mapper = CoordMapper::fit(200, 100, Vec2::new(200.0, 100.0));

        let out = apply_crop(&native, None, &mapper, ResizeTarget::new(100, 50));
        assert_eq!((out.width(), out.height()), (100, 50));
    }

    #[test]
    fn rect_maps_rendered_to_native_pixels() {
        let native = gradient(200, 200);
        // rendered at half size, so scale factors are 2.0
        let mapper = CoordMapper::fit(200, 200, Vec2::new(100.0, 100.0));
        let rect = Rect::from_min_size(Pos2::new(10.0, 20.0), Vec2::new(30.0, 40.0));

        let out = apply_crop(&native, Some(rect), &mapper, ResizeTarget::new(60, 80));
        assert_eq!((out.width(), out.height()), (60, 80));
        // top-left pixel comes from native (20, 40)
        assert_eq!(out.get_pixel(0, 0)[0], 20);
        assert_eq!(out.get_pixel(0, 0)[1], 40);
    }

    #[test]
    fn resize_linkage_keeps_aspect() {
        let aspect = 1000.0 / 2000.0;
        let mut target = ResizeTarget::new(1000, 2000);

        target.set_width(500, aspect);
        assert_eq!(target.height, 1000);

        target.set_height(333, aspect);
        assert_eq!(target.width, 167); // rounds, drift of +-1 is accepted
    }
}
