//! Mapping between the on-screen (rendered) canvas and native image pixels.
//!
//! The editor shows the image letterboxed inside its container: fit to the
//! container width first, and if the resulting height overflows, fit to the
//! height instead. Pointer input arrives in rendered coordinates; the crop
//! applies in native coordinates, scaled by nativeW/renderedW per axis.

use egui::{Pos2, Vec2};

#[derive(Clone, Copy)]
pub struct CoordMapper {
    native_w: u32,
    native_h: u32,
    rendered: Vec2,
}

impl CoordMapper {
    /// Fit a native image into a container, preserving aspect ratio.
    pub fn fit(native_w: u32, native_h: u32, container: Vec2) -> Self {
        let aspect = native_w.max(1) as f32 / native_h.max(1) as f32;

        let mut rendered_w = container.x;
        let mut rendered_h = container.x / aspect;
        if rendered_h > container.y {
            rendered_h = container.y;
            rendered_w = container.y * aspect;
        }

        Self {
            native_w,
            native_h,
            rendered: Vec2::new(rendered_w.max(1.0), rendered_h.max(1.0)),
        }
    }

    pub fn rendered_size(&self) -> Vec2 {
        self.rendered
    }

    pub fn rendered_w(&self) -> u32 {
        self.rendered.x.round().max(1.0) as u32
    }

    pub fn rendered_h(&self) -> u32 {
        self.rendered.y.round().max(1.0) as u32
    }

    pub fn native_size(&self) -> (u32, u32) {
        (self.native_w, self.native_h)
    }

    pub fn scale_x(&self) -> f32 {
        self.native_w as f32 / self.rendered.x
    }

    pub fn scale_y(&self) -> f32 {
        self.native_h as f32 / self.rendered.y
    }

    /// Rendered point to native pixel coordinates.
    pub fn to_native(&self, p: Pos2) -> (f32, f32) {
        (p.x * self.scale_x(), p.y * self.scale_y())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tall_image_fits_height_and_maps_back_to_native() {
        // 1000x2000 native inside a 300x200 container: width-fit would be
        // 300x600, which overflows, so it height-fits to 100x200.
        let mapper = CoordMapper::fit(1000, 2000, Vec2::new(300.0, 200.0));
        assert_eq!(mapper.rendered_w(), 100);
        assert_eq!(mapper.rendered_h(), 200);

        let (nx, ny) = mapper.to_native(Pos2::new(50.0, 100.0));
        assert_eq!(nx, 500.0);
        assert_eq!(ny, 1000.0);
    }

    #[test]
    fn wide_image_fits_width() {
        let mapper = CoordMapper::fit(1600, 900, Vec2::new(400.0, 400.0));
        assert_eq!(mapper.rendered_w(), 400);
        assert_eq!(mapper.rendered_h(), 225);
        assert_eq!(mapper.scale_x(), 4.0);
    }

    #[test]
    fn exact_fit_is_identity_scale() {
        let mapper = CoordMapper::fit(200, 100, Vec2::new(200.0, 100.0));
        assert_eq!(mapper.scale_x(), 1.0);
        assert_eq!(mapper.scale_y(), 1.0);
    }
}
