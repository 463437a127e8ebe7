//! Magic-brush mask strokes on the overlay surface.
//!
//! A click stamps a single dot; a drag strokes segments between successive
//! pointer positions. The translucent pink highlight shows the user what
//! they have marked; the punch-out step treats any coverage as "selected".

use egui::Pos2;
use image::Rgba;

use crate::editor::surface::Surface;

/// Highlight color of painted mask regions (pink at 70% opacity).
pub const MASK_COLOR: Rgba<u8> = Rgba([236, 72, 153, 178]);

#[derive(Default)]
pub struct MaskPainter {
    last_pos: Option<(f32, f32)>,
}

impl MaskPainter {
    /// Begin a stroke: stamp a dot so single clicks leave a mark.
    pub fn pointer_down(&mut self, surface: &mut Surface, pos: Pos2, brush_size: f32) {
        surface.fill_circle(pos.x, pos.y, brush_size / 2.0, MASK_COLOR);
        self.last_pos = Some((pos.x, pos.y));
    }

    /// Continue a stroke from the previous position.
    pub fn pointer_move(&mut self, surface: &mut Surface, pos: Pos2, brush_size: f32) {
        if let Some(last) = self.last_pos {
            surface.stroke_line(last, (pos.x, pos.y), brush_size, MASK_COLOR);
        }
        self.last_pos = Some((pos.x, pos.y));
    }

    /// End the stroke. The painted mask stays on the surface.
    pub fn pointer_up(&mut self) {
        self.last_pos = None;
    }

    pub fn is_painting(&self) -> bool {
        self.last_pos.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_without_drag_leaves_a_dot() {
        let mut surface = Surface::new(50, 50);
        let mut painter = MaskPainter::default();

        painter.pointer_down(&mut surface, Pos2::new(25.0, 25.0), 10.0);
        painter.pointer_up();

        assert!(surface.has_coverage());
        assert_eq!(*surface.pixels().get_pixel(25, 25), MASK_COLOR);
        assert_eq!(surface.pixels().get_pixel(40, 40)[3], 0);
    }

    #[test]
    fn drag_connects_sparse_pointer_samples() {
        let mut surface = Surface::new(100, 20);
        let mut painter = MaskPainter::default();

        painter.pointer_down(&mut surface, Pos2::new(5.0, 10.0), 6.0);
        // pointer events arrive sparsely on fast drags
        painter.pointer_move(&mut surface, Pos2::new(50.0, 10.0), 6.0);
        painter.pointer_move(&mut surface, Pos2::new(95.0, 10.0), 6.0);
        painter.pointer_up();

        for x in 5..95 {
            assert!(surface.pixels().get_pixel(x, 10)[3] > 0, "gap at x={x}");
        }
        assert!(!painter.is_painting());
    }

    #[test]
    fn strokes_accumulate_across_gestures() {
        let mut surface = Surface::new(60, 60);
        let mut painter = MaskPainter::default();

        painter.pointer_down(&mut surface, Pos2::new(10.0, 10.0), 8.0);
        painter.pointer_up();
        painter.pointer_down(&mut surface, Pos2::new(50.0, 50.0), 8.0);
        painter.pointer_up();

        assert!(surface.pixels().get_pixel(10, 10)[3] > 0);
        assert!(surface.pixels().get_pixel(50, 50)[3] > 0);
        // a new gesture does not start from the old endpoint
        assert_eq!(surface.pixels().get_pixel(30, 30)[3], 0);
    }
}
