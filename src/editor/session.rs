//! Edit session state: active tool, overlay, and the apply/cancel flow.
//!
//! A session opens over the current result image and owns everything the
//! editor touches: the native pixels, the fit-scaled rendered copy the tools
//! operate on, the overlay surface, and the per-tool state. Switching tools
//! keeps the session; cancel discards it wholesale. Apply produces a plan
//! that is either resolved locally (filters, crop) or sent to the inpainting
//! model (magic brush).

use egui::{Pos2, Vec2};
use image::RgbaImage;
use thiserror::Error;

use crate::api::types::InlineImage;
use crate::editor::crop::{self, CropTracker, ResizeTarget};
use crate::editor::filters::FilterValues;
use crate::editor::mapper::CoordMapper;
use crate::editor::mask::MaskPainter;
use crate::editor::surface::Surface;
use crate::io;

/// Instruction sent with a remove-mode inpaint.
pub const REMOVE_INSTRUCTION: &str =
    "Fill in the transparent area, matching the surrounding style, texture, and lighting seamlessly.";

/// History labels for locally applied edits.
pub const FILTERS_LABEL: &str = "Applied image filters.";
pub const CROP_LABEL: &str = "Cropped or resized image.";

pub const BRUSH_MIN: f32 = 5.0;
pub const BRUSH_MAX: f32 = 100.0;
const BRUSH_DEFAULT: f32 = 40.0;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum EditTool {
    Magic,
    Crop,
    Filters,
}

#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub enum MagicMode {
    #[default]
    Remove,
    Add,
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error("add-mode inpaint requires a description")]
    MissingAddPrompt,
    #[error("{0}")]
    Encode(String),
}

/// What apply resolved to.
pub enum ApplyPlan {
    /// Send the punched-out reference to the generation model.
    Inpaint {
        reference: InlineImage,
        instruction: String,
    },
    /// Replace the result image directly.
    Local { image: RgbaImage, label: String },
}

pub struct EditSession {
    pub tool: EditTool,
    pub magic_mode: MagicMode,
    pub brush_size: f32,
    pub add_prompt: String,
    pub filters: FilterValues,
    pub resize: ResizeTarget,
    pub mapper: CoordMapper,
    pub overlay: Surface,
    pub mask: MaskPainter,
    pub crop: CropTracker,
    /// An apply is in flight; input and tool switches are ignored.
    pub is_applying: bool,
    pub error: Option<String>,

    native: RgbaImage,
    /// Native pixels scaled to the rendered size; tools operate here.
    rendered: RgbaImage,
}

impl EditSession {
    /// Open a session over `native`, letterboxed into `container`.
    pub fn open(native: RgbaImage, container: Vec2, tool: EditTool) -> Self {
        let mapper = CoordMapper::fit(native.width(), native.height(), container);
        let rendered = image::imageops::resize(
            &native,
            mapper.rendered_w(),
            mapper.rendered_h(),
            image::imageops::FilterType::Triangle,
        );
        let overlay = Surface::new(mapper.rendered_w(), mapper.rendered_h());
        let resize = ResizeTarget::new(native.width(), native.height());

        Self {
            tool,
            magic_mode: MagicMode::default(),
            brush_size: BRUSH_DEFAULT,
            add_prompt: String::new(),
            filters: FilterValues::default(),
            resize,
            mapper,
            overlay,
            mask: MaskPainter::default(),
            crop: CropTracker::default(),
            is_applying: false,
            error: None,
            native,
            rendered,
        }
    }

    /// Native width / height, for the resize linkage.
    pub fn native_aspect(&self) -> f32 {
        let (w, h) = self.mapper.native_size();
        w.max(1) as f32 / h.max(1) as f32
    }

    pub fn rendered(&self) -> &RgbaImage {
        &self.rendered
    }

    /// The rendered copy with the current filter stack, for live preview.
    pub fn filtered_preview(&self) -> RgbaImage {
        self.filters.bake(&self.rendered)
    }

    /// Switch tools in place; overlay and per-tool state carry over so a
    /// painted mask is not lost by a stray click on another tab.
    pub fn set_tool(&mut self, tool: EditTool) {
        if !self.is_applying {
            self.tool = tool;
        }
    }

    // -- pointer routing ---------------------------------------------------

    pub fn pointer_down(&mut self, pos: Pos2) {
        if self.is_applying {
            return;
        }
        match self.tool {
            EditTool::Magic => self.mask.pointer_down(&mut self.overlay, pos, self.brush_size),
            EditTool::Crop => self.crop.pointer_down(&mut self.overlay, pos),
            EditTool::Filters => {}
        }
    }

    pub fn pointer_move(&mut self, pos: Pos2) {
        if self.is_applying {
            return;
        }
        match self.tool {
            EditTool::Magic => self.mask.pointer_move(&mut self.overlay, pos, self.brush_size),
            EditTool::Crop => self.crop.pointer_move(&mut self.overlay, pos),
            EditTool::Filters => {}
        }
    }

    pub fn pointer_up(&mut self) {
        match self.tool {
            EditTool::Magic => self.mask.pointer_up(),
            EditTool::Crop => self.crop.pointer_up(),
            EditTool::Filters => {}
        }
    }

    // -- apply -------------------------------------------------------------

    /// Resolve the current tool into an apply plan. Does not flip
    /// `is_applying`; the caller does that once the plan is dispatched.
    pub fn build_apply_plan(&self) -> Result<ApplyPlan, EditError> {
        match self.tool {
            EditTool::Magic => {
                if self.magic_mode == MagicMode::Add && self.add_prompt.trim().is_empty() {
                    return Err(EditError::MissingAddPrompt);
                }
                let punched = self.overlay.punch_out(&self.rendered);
                let reference = io::encode_png(&punched).map_err(EditError::Encode)?;
                let instruction = match self.magic_mode {
                    MagicMode::Remove => REMOVE_INSTRUCTION.to_string(),
                    MagicMode::Add => format!("{} in the transparent area.", self.add_prompt),
                };
                Ok(ApplyPlan::Inpaint {
                    reference,
                    instruction,
                })
            }
            EditTool::Filters => Ok(ApplyPlan::Local {
                image: self.filters.bake(&self.rendered),
                label: FILTERS_LABEL.to_string(),
            }),
            EditTool::Crop => Ok(ApplyPlan::Local {
                image: crop::apply_crop(&self.native, self.crop.rect, &self.mapper, self.resize),
                label: CROP_LABEL.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn session(tool: EditTool) -> EditSession {
        let native = RgbaImage::from_pixel(200, 100, Rgba([90, 120, 150, 255]));
        EditSession::open(native, Vec2::new(200.0, 100.0), tool)
    }

    #[test]
    fn add_mode_requires_a_description() {
        let mut s = session(EditTool::Magic);
        s.magic_mode = MagicMode::Add;
        s.add_prompt = "   ".to_string();
        assert!(matches!(
            s.build_apply_plan(),
            Err(EditError::MissingAddPrompt)
        ));

        s.add_prompt = "a small red boat".to_string();
        match s.build_apply_plan().unwrap() {
            ApplyPlan::Inpaint { instruction, .. } => {
                assert_eq!(instruction, "a small red boat in the transparent area.");
            }
            _ => panic!("expected inpaint plan"),
        }
    }

    #[test]
    fn remove_mode_uses_the_fill_instruction() {
        let mut s = session(EditTool::Magic);
        s.pointer_down(Pos2::new(50.0, 50.0));
        s.pointer_up();

        match s.build_apply_plan().unwrap() {
            ApplyPlan::Inpaint {
                reference,
                instruction,
            } => {
                assert_eq!(instruction, REMOVE_INSTRUCTION);
                assert_eq!(reference.mime_type, "image/png");
                // the punched reference really has a transparent hole
                let punched = crate::io::decode_inline(&reference).unwrap();
                assert_eq!(punched.get_pixel(50, 50)[3], 0);
                assert_eq!(punched.get_pixel(5, 5)[3], 255);
            }
            _ => panic!("expected inpaint plan"),
        }
    }

    #[test]
    fn crop_without_rect_applies_resize_only() {
        let mut s = session(EditTool::Crop);
        let aspect = s.native_aspect();
        s.resize.set_width(100, aspect);

        match s.build_apply_plan().unwrap() {
            ApplyPlan::Local { image, label } => {
                assert_eq!(label, CROP_LABEL);
                assert_eq!((image.width(), image.height()), (100, 50));
            }
            _ => panic!("expected local plan"),
        }
    }

    #[test]
    fn filters_bake_into_a_local_plan() {
        let mut s = session(EditTool::Filters);
        s.filters.grayscale = 100;

        match s.build_apply_plan().unwrap() {
            ApplyPlan::Local { image, label } => {
                assert_eq!(label, FILTERS_LABEL);
                let px = image.get_pixel(10, 10);
                assert_eq!(px[0], px[1]);
                assert_eq!(px[1], px[2]);
            }
            _ => panic!("expected local plan"),
        }
    }

    #[test]
    fn input_is_ignored_while_applying() {
        let mut s = session(EditTool::Magic);
        s.is_applying = true;
        s.pointer_down(Pos2::new(50.0, 50.0));
        s.pointer_up();
        assert!(!s.overlay.has_coverage());

        s.set_tool(EditTool::Crop);
        assert!(s.tool == EditTool::Magic);
    }
}
