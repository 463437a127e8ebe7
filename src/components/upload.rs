//! A labelled reference-image upload slot with preview and remove button.

use egui::{TextureHandle, TextureOptions, Vec2};

use crate::components::rgba_to_color_image;
use crate::io::{self, SourceImage};
use crate::{log_warn, t};

const PREVIEW_HEIGHT: f32 = 96.0;

pub struct UploadSlot {
    label_key: &'static str,
    pub image: Option<SourceImage>,
    texture: Option<TextureHandle>,
}

impl UploadSlot {
    pub fn new(label_key: &'static str) -> Self {
        Self {
            label_key,
            image: None,
            texture: None,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.image.is_some()
    }

    pub fn clear(&mut self) {
        self.image = None;
        self.texture = None;
    }

    /// Draw the slot. Returns true when the slot content changed.
    pub fn ui(&mut self, ui: &mut egui::Ui, enabled: bool) -> bool {
        let mut changed = false;
        ui.label(t!(self.label_key));

        match &self.image {
            Some(source) => {
                let texture = self.texture.get_or_insert_with(|| {
                    ui.ctx().load_texture(
                        format!("upload-{}", self.label_key),
                        rgba_to_color_image(&source.pixels),
                        TextureOptions::LINEAR,
                    )
                });
                let aspect = source.pixels.width().max(1) as f32
                    / source.pixels.height().max(1) as f32;
                let sized = egui::load::SizedTexture::from_handle(texture);
                ui.add(
                    egui::Image::from_texture(sized)
                        .fit_to_exact_size(Vec2::new(PREVIEW_HEIGHT * aspect, PREVIEW_HEIGHT)),
                );
                if ui
                    .add_enabled(enabled, egui::Button::new(t!("upload.remove")))
                    .clicked()
                {
                    self.clear();
                    changed = true;
                }
            }
            None => {
                if ui
                    .add_enabled(enabled, egui::Button::new(t!("upload.pick")))
                    .clicked()
                    && let Some(path) = io::pick_image_file()
                {
                    match io::load_source_image(&path) {
                        Ok(source) => {
                            self.image = Some(source);
                            self.texture = None;
                            changed = true;
                        }
                        Err(e) => {
                            log_warn!("could not load upload {:?}: {}", path, e);
                        }
                    }
                }
            }
        }
        changed
    }
}
