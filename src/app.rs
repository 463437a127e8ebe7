//! Root application state and the eframe update loop.
//!
//! All remote calls run on spawned worker threads and report back over one
//! mpsc channel polled at the top of `update()`. Each kind of call owns a
//! busy flag (`is_loading`, `is_enhancing`, `is_analyzing`, and the session's
//! `is_applying`); a flag stays set until its call resolves, so at most one
//! call per kind is ever in flight.

use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use eframe::egui;
use egui::{Color32, TextureHandle, TextureOptions, Vec2};
use image::RgbaImage;

use crate::api::GeminiClient;
use crate::api::error::{ApiError, looks_blocked};
use crate::api::types::{AspectRatio, InlineImage, StylePreset};
use crate::components::rgba_to_color_image;
use crate::components::toolbar::{self, ToolbarAction};
use crate::components::upload::UploadSlot;
use crate::editor::filters::FilterValues;
use crate::editor::mapper::CoordMapper;
use crate::editor::session::EditError;
use crate::editor::{ApplyPlan, EditSession, EditTool};
use crate::io;
use crate::settings::AppSettings;
use crate::{i18n, log_err, log_info, t};

const ERROR_RED: Color32 = Color32::from_rgb(248, 113, 113);
const LOADING_KEYS: [&str; 5] = [
    "loading.msg1",
    "loading.msg2",
    "loading.msg3",
    "loading.msg4",
    "loading.msg5",
];
const LOADING_ROTATE_SECS: f32 = 2.5;
const ALTERNATIVE_THUMB: f32 = 110.0;

// ============================================================================
// WORKER OUTCOMES — background API calls report back over one channel
// ============================================================================

/// Why a generation call was made; decides where its result lands.
enum GenPurpose {
    /// A fresh prompt submission; carries the composed prompt for reuse.
    Fresh { prompt: String },
    /// Re-submission of the current image with the prompt that produced it.
    Variations,
    /// Quick text edit of the current image; carries the history label.
    TextEdit { label: String },
    /// Magic-brush inpaint from the edit session; carries the instruction.
    Inpaint { instruction: String },
}

enum ApiOutcome {
    Generation {
        result: Result<InlineImage, ApiError>,
        purpose: GenPurpose,
    },
    Enhanced(Result<String, ApiError>),
    Analyzed(Result<String, ApiError>),
}

// ============================================================================
// RESULT IMAGE — wire payload, decoded pixels, lazy display texture
// ============================================================================

struct ResultImage {
    inline: InlineImage,
    pixels: RgbaImage,
    texture: Option<TextureHandle>,
}

impl ResultImage {
    fn from_inline(inline: InlineImage) -> Result<Self, String> {
        let pixels = io::decode_inline(&inline)?;
        Ok(Self {
            inline,
            pixels,
            texture: None,
        })
    }

    fn from_pixels(pixels: RgbaImage) -> Result<Self, String> {
        let inline = io::encode_png(&pixels)?;
        Ok(Self {
            inline,
            pixels,
            texture: None,
        })
    }

    fn texture(&mut self, ctx: &egui::Context, name: &str) -> &TextureHandle {
        self.texture.get_or_insert_with(|| {
            ctx.load_texture(
                name.to_string(),
                rgba_to_color_image(&self.pixels),
                TextureOptions::LINEAR,
            )
        })
    }
}

// ============================================================================
// APP
// ============================================================================

pub struct StudioApp {
    settings: AppSettings,

    // prompt form
    prompt: String,
    original_prompt: String,
    displayed_prompt: String,
    aspect: AspectRatio,
    face_image1: UploadSlot,
    face_image2: UploadSlot,
    style_image: UploadSlot,

    // reverse-prompt analysis
    analysis_open: bool,
    analysis_image: UploadSlot,

    // results
    main_image: Option<ResultImage>,
    alternatives: Vec<ResultImage>,
    has_generated: bool,
    error: Option<String>,

    // quick text-edit bar
    edit_text: String,
    edit_error: Option<String>,

    // busy flags
    is_loading: bool,
    is_enhancing: bool,
    is_analyzing: bool,
    is_editing: bool,
    loading_since: Option<Instant>,

    // edit session
    session: Option<EditSession>,
    editor_base_tex: Option<TextureHandle>,
    editor_overlay_tex: Option<TextureHandle>,
    editor_baked_filters: FilterValues,
    /// Canvas area measured last frame; sessions open letterboxed into it.
    canvas_area: Vec2,

    outcome_tx: mpsc::Sender<ApiOutcome>,
    outcome_rx: mpsc::Receiver<ApiOutcome>,
}

impl StudioApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load();
        let language = if settings.language.is_empty() {
            i18n::detect_system_language()
        } else {
            settings.language.clone()
        };
        i18n::set_language(&language);
        log_info!("studio started (language {})", language);
        Self::from_settings(settings)
    }

    fn from_settings(settings: AppSettings) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel();
        Self {
            prompt: String::new(),
            original_prompt: String::new(),
            displayed_prompt: String::new(),
            aspect: AspectRatio::default(),
            face_image1: UploadSlot::new("upload.main"),
            face_image2: UploadSlot::new("upload.second"),
            style_image: UploadSlot::new("upload.style"),
            analysis_open: false,
            analysis_image: UploadSlot::new("analysis.slot"),
            main_image: None,
            alternatives: Vec::new(),
            has_generated: false,
            error: None,
            edit_text: String::new(),
            edit_error: None,
            is_loading: false,
            is_enhancing: false,
            is_analyzing: false,
            is_editing: false,
            loading_since: None,
            session: None,
            editor_base_tex: None,
            editor_overlay_tex: None,
            editor_baked_filters: FilterValues::default(),
            canvas_area: Vec2::new(800.0, 600.0),
            settings,
            outcome_tx,
            outcome_rx,
        }
    }

    /// True while any generate/enhance/analyze call is outstanding. The
    /// three share one gate: none of them may start while another runs.
    fn remote_call_in_flight(&self) -> bool {
        self.is_loading || self.is_enhancing || self.is_analyzing
    }

    /// True while any reference slot is filled. Style suffix, negative
    /// prompt, aspect clause, and enhancement are unavailable in that mode.
    fn editing_mode(&self) -> bool {
        self.face_image1.is_filled() || self.face_image2.is_filled() || self.style_image.is_filled()
    }

    fn reference_images(&self) -> Vec<InlineImage> {
        // order matters to the model: style reference first, then subjects
        [&self.style_image, &self.face_image1, &self.face_image2]
            .into_iter()
            .filter_map(|slot| slot.image.as_ref().map(|s| s.encoded.clone()))
            .collect()
    }

    // -- worker dispatch -----------------------------------------------------

    fn spawn_generation(
        &self,
        ctx: &egui::Context,
        prompt: String,
        images: Vec<InlineImage>,
        aspect: AspectRatio,
        negative: Option<String>,
        purpose: GenPurpose,
    ) {
        let sender = self.outcome_tx.clone();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let result = GeminiClient::from_env()
                .and_then(|client| client.generate(&prompt, &images, aspect, negative.as_deref()));
            let _ = sender.send(ApiOutcome::Generation { result, purpose });
            ctx.request_repaint();
        });
    }

    fn start_generate(&mut self, ctx: &egui::Context) {
        if self.remote_call_in_flight() {
            return;
        }
        if self.prompt.trim().is_empty() {
            self.error = Some(t!("err.prompt_empty"));
            return;
        }
        self.is_loading = true;
        self.loading_since = Some(Instant::now());
        self.has_generated = true;
        self.error = None;
        self.original_prompt.clear();

        let editing = self.editing_mode();
        let mut working = self.prompt.clone();
        if self.settings.style_preset != StylePreset::None && !editing {
            working = format!("{}, {}", working, self.settings.style_preset.suffix());
        }
        let negative = (!editing && !self.settings.negative_prompt.trim().is_empty())
            .then(|| self.settings.negative_prompt.clone());

        self.spawn_generation(
            ctx,
            working.clone(),
            self.reference_images(),
            self.aspect,
            negative,
            GenPurpose::Fresh { prompt: working },
        );
    }

    fn start_variations(&mut self, ctx: &egui::Context) {
        if self.remote_call_in_flight() {
            return;
        }
        let Some(main) = &self.main_image else { return };
        if self.displayed_prompt.is_empty() {
            self.error = Some(t!("err.no_variations"));
            return;
        }
        self.is_loading = true;
        self.loading_since = Some(Instant::now());
        self.error = None;

        let negative = (!self.settings.negative_prompt.is_empty())
            .then(|| self.settings.negative_prompt.clone());
        self.spawn_generation(
            ctx,
            self.displayed_prompt.clone(),
            vec![main.inline.clone()],
            self.aspect,
            negative,
            GenPurpose::Variations,
        );
    }

    fn start_text_edit(&mut self, ctx: &egui::Context) {
        let text = self.edit_text.trim().to_string();
        if text.is_empty() {
            return;
        }
        let Some(main) = &self.main_image else { return };
        self.is_editing = true;
        self.edit_error = None;

        self.spawn_generation(
            ctx,
            text.clone(),
            vec![main.inline.clone()],
            self.aspect,
            None,
            GenPurpose::TextEdit {
                label: format!("Edited with: \"{}\"", text),
            },
        );
    }

    fn start_enhance(&mut self, ctx: &egui::Context) {
        if self.remote_call_in_flight() {
            return;
        }
        if self.prompt.trim().is_empty() {
            self.error = Some(t!("err.enhance_empty"));
            return;
        }
        if self.editing_mode() {
            return;
        }
        self.is_enhancing = true;
        self.error = None;
        self.original_prompt = self.prompt.clone();

        let sender = self.outcome_tx.clone();
        let ctx = ctx.clone();
        let prompt = self.prompt.clone();
        thread::spawn(move || {
            let result = GeminiClient::from_env().and_then(|client| client.enhance_prompt(&prompt));
            let _ = sender.send(ApiOutcome::Enhanced(result));
            ctx.request_repaint();
        });
    }

    fn start_analyze(&mut self, ctx: &egui::Context) {
        if self.remote_call_in_flight() {
            return;
        }
        let Some(source) = &self.analysis_image.image else {
            return;
        };
        self.is_analyzing = true;
        self.error = None;

        let sender = self.outcome_tx.clone();
        let ctx = ctx.clone();
        let image = source.encoded.clone();
        thread::spawn(move || {
            let result = GeminiClient::from_env().and_then(|client| client.analyze_image(&image));
            let _ = sender.send(ApiOutcome::Analyzed(result));
            ctx.request_repaint();
        });
    }

    fn apply_edit(&mut self, ctx: &egui::Context) {
        let Some(session) = &mut self.session else {
            return;
        };
        session.error = None;
        if session.tool == EditTool::Filters {
            log_info!("applying filter stack: {}", session.filters.descriptor());
        }

        match session.build_apply_plan() {
            Ok(ApplyPlan::Local { image, label }) => match ResultImage::from_pixels(image) {
                Ok(result) => {
                    log_info!("applied local edit: {}", label);
                    self.set_main_image(result, label);
                    self.close_session();
                }
                Err(e) => {
                    session.error = Some(e);
                }
            },
            Ok(ApplyPlan::Inpaint {
                reference,
                instruction,
            }) => {
                session.is_applying = true;
                let aspect = self.aspect;
                self.spawn_generation(
                    ctx,
                    instruction.clone(),
                    vec![reference],
                    aspect,
                    None,
                    GenPurpose::Inpaint { instruction },
                );
            }
            Err(EditError::MissingAddPrompt) => {
                session.error = Some(t!("err.add_prompt_missing"));
            }
            Err(e) => {
                session.error = Some(e.to_string());
            }
        }
    }

    // -- outcome handling ----------------------------------------------------

    fn set_main_image(&mut self, result: ResultImage, displayed: String) {
        self.main_image = Some(result);
        self.alternatives.clear();
        self.displayed_prompt = displayed;
        self.edit_text.clear();
    }

    fn close_session(&mut self) {
        self.session = None;
        self.editor_base_tex = None;
        self.editor_overlay_tex = None;
        self.editor_baked_filters = FilterValues::default();
    }

    fn handle_outcome(&mut self, outcome: ApiOutcome) {
        match outcome {
            ApiOutcome::Generation { result, purpose } => self.handle_generation(result, purpose),
            ApiOutcome::Enhanced(result) => {
                self.is_enhancing = false;
                match result {
                    Ok(text) => self.prompt = text,
                    Err(e) => {
                        log_err!("enhance failed: {}", e);
                        self.error = Some(t!("err.enhance_failed", msg = e.bare_message()));
                    }
                }
            }
            ApiOutcome::Analyzed(result) => {
                self.is_analyzing = false;
                match result {
                    Ok(text) => {
                        self.prompt = text;
                        self.analysis_open = false;
                    }
                    Err(e) => {
                        log_err!("analysis failed: {}", e);
                        self.error = Some(e.user_message());
                    }
                }
            }
        }
    }

    fn handle_generation(&mut self, result: Result<InlineImage, ApiError>, purpose: GenPurpose) {
        match purpose {
            GenPurpose::Fresh { prompt } => {
                self.is_loading = false;
                self.loading_since = None;
                match result.map_err(|e| e.user_message()).and_then(|inline| {
                    ResultImage::from_inline(inline).map_err(|_| t!("err.bad_image_data"))
                }) {
                    Ok(image) => {
                        log_info!("generation succeeded");
                        self.set_main_image(image, prompt);
                    }
                    // the prior image (if any) stays on screen
                    Err(msg) => {
                        log_err!("generation failed: {}", msg);
                        self.error = Some(t!("err.generate_failed", msg = msg));
                    }
                }
            }
            GenPurpose::Variations => {
                self.is_loading = false;
                self.loading_since = None;
                match result.map_err(|e| e.user_message()).and_then(|inline| {
                    ResultImage::from_inline(inline).map_err(|_| t!("err.bad_image_data"))
                }) {
                    Ok(image) => {
                        self.main_image = Some(image);
                        self.alternatives.clear();
                    }
                    Err(msg) => {
                        log_err!("variations failed: {}", msg);
                        self.error = Some(t!("err.variations_failed", msg = msg));
                    }
                }
            }
            GenPurpose::TextEdit { label } => {
                self.is_editing = false;
                match result {
                    Ok(inline) => match ResultImage::from_inline(inline) {
                        Ok(image) => self.set_main_image(image, label),
                        Err(_) => self.edit_error = Some(t!("err.bad_image_data")),
                    },
                    Err(e) => {
                        log_err!("text edit failed: {}", e);
                        let msg = e.bare_message();
                        self.edit_error = Some(if looks_blocked(&msg) {
                            t!("err.edit_blocked")
                        } else {
                            msg
                        });
                    }
                }
            }
            GenPurpose::Inpaint { instruction } => match result {
                Ok(inline) => match ResultImage::from_inline(inline) {
                    Ok(image) => {
                        self.set_main_image(image, instruction);
                        self.close_session();
                    }
                    Err(_) => {
                        if let Some(session) = &mut self.session {
                            session.is_applying = false;
                            session.error = Some(t!("err.bad_image_data"));
                        }
                    }
                },
                Err(e) => {
                    log_err!("inpaint failed: {}", e);
                    let msg = e.bare_message();
                    let friendly = if looks_blocked(&msg) {
                        t!("err.apply_blocked")
                    } else if msg.to_lowercase().contains("text instead")
                        || msg.contains("texto em vez")
                    {
                        t!("err.apply_text")
                    } else {
                        t!("err.apply_failed", msg = msg)
                    };
                    if let Some(session) = &mut self.session {
                        session.is_applying = false;
                        session.error = Some(friendly);
                    }
                }
            },
        }
    }

    // -- UI: controls panel ----------------------------------------------------

    fn controls_panel(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.heading(t!("app.title"));
        ui.add_space(6.0);

        self.analysis_section(ctx, ui);
        ui.separator();

        // prompt
        ui.label(egui::RichText::new(t!("form.prompt_label")).strong());
        let hint = if self.editing_mode() {
            t!("form.prompt_placeholder_edit")
        } else {
            t!("form.prompt_placeholder")
        };
        let prompt_edit = ui.add(
            egui::TextEdit::multiline(&mut self.prompt)
                .hint_text(hint)
                .desired_rows(4)
                .desired_width(f32::INFINITY),
        );
        // a hand-edited prompt is no longer the enhanced one; drop the revert
        if prompt_edit.changed() && !self.is_enhancing {
            self.original_prompt.clear();
        }
        ui.horizontal(|ui| {
            let can_enhance = !self.remote_call_in_flight() && !self.editing_mode();
            if ui
                .add_enabled(can_enhance, egui::Button::new(t!("form.enhance")))
                .clicked()
            {
                self.start_enhance(ctx);
            }
            if self.is_enhancing {
                ui.spinner();
                ui.label(t!("form.enhancing"));
            }
            if !self.original_prompt.is_empty() && ui.button(t!("form.revert")).clicked() {
                self.prompt = self.original_prompt.clone();
                self.original_prompt.clear();
            }
        });

        ui.separator();

        // reference uploads
        let slots_enabled = !self.is_loading;
        self.face_image1.ui(ui, slots_enabled);
        self.face_image2.ui(ui, slots_enabled);
        self.style_image.ui(ui, slots_enabled);

        ui.separator();

        // aspect ratio (prompt-driven, unavailable when editing references)
        let editing = self.editing_mode();
        ui.label(egui::RichText::new(t!("form.aspect_label")).strong());
        ui.add_enabled_ui(!editing, |ui| {
            ui.horizontal(|ui| {
                for aspect in AspectRatio::ALL {
                    let label = format!("{} {}", t!(aspect.label_key()), aspect.as_str());
                    if ui.selectable_label(self.aspect == aspect, label).clicked() {
                        self.aspect = aspect;
                    }
                }
            });
        });

        // advanced settings (persisted)
        egui::CollapsingHeader::new(t!("form.advanced"))
            .default_open(false)
            .show(ui, |ui| {
                ui.add_enabled_ui(!editing, |ui| {
                    let mut settings_changed = false;

                    egui::ComboBox::from_label(t!("form.style_label"))
                        .selected_text(t!(self.settings.style_preset.label_key()))
                        .show_ui(ui, |ui| {
                            for preset in StylePreset::ALL {
                                if ui
                                    .selectable_value(
                                        &mut self.settings.style_preset,
                                        preset,
                                        t!(preset.label_key()),
                                    )
                                    .changed()
                                {
                                    settings_changed = true;
                                }
                            }
                        });

                    ui.label(t!("form.negative_label"));
                    if ui
                        .add(
                            egui::TextEdit::singleline(&mut self.settings.negative_prompt)
                                .hint_text(t!("form.negative_placeholder"))
                                .desired_width(f32::INFINITY),
                        )
                        .changed()
                    {
                        settings_changed = true;
                    }

                    if settings_changed {
                        self.settings.save();
                    }
                });
                if editing {
                    ui.small(t!("form.advanced_unavailable"));
                }
            });

        ui.add_space(8.0);

        // generate
        let generate = ui.add_enabled(
            !self.remote_call_in_flight(),
            egui::Button::new(if self.is_loading {
                t!("form.generating")
            } else {
                t!("form.generate")
            })
            .min_size(Vec2::new(ui.available_width(), 32.0)),
        );
        if generate.clicked() {
            self.start_generate(ctx);
        }

        if let Some(error) = &self.error {
            ui.add_space(6.0);
            ui.colored_label(ERROR_RED, error);
        }

        // language picker pinned to the bottom
        ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
            let current = i18n::current_language();
            let current_name = i18n::LANGUAGES
                .iter()
                .find(|(code, _)| *code == current)
                .map(|(_, name)| *name)
                .unwrap_or("English");
            egui::ComboBox::from_label(t!("form.language"))
                .selected_text(current_name)
                .show_ui(ui, |ui| {
                    for &(code, name) in i18n::LANGUAGES {
                        if ui.selectable_label(current == code, name).clicked() {
                            i18n::set_language(code);
                            self.settings.language = code.to_string();
                            self.settings.save();
                        }
                    }
                });
        });
    }

    fn analysis_section(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let header = ui.selectable_label(self.analysis_open, t!("analysis.header"));
        if header.clicked() {
            self.analysis_open = !self.analysis_open;
        }
        if !self.analysis_open {
            return;
        }

        ui.small(t!("analysis.hint"));
        self.analysis_image.ui(ui, !self.is_analyzing);
        let can_run = self.analysis_image.is_filled() && !self.remote_call_in_flight();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(can_run, egui::Button::new(t!("analysis.run")))
                .clicked()
            {
                self.start_analyze(ctx);
            }
            if self.is_analyzing {
                ui.spinner();
                ui.label(t!("analysis.running"));
            }
        });
    }

    // -- UI: display panel -----------------------------------------------------

    fn display_panel(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        if self.session.is_some() {
            self.editor_view(ctx, ui);
            return;
        }

        if self.is_loading {
            self.loading_view(ui);
            return;
        }

        if self.main_image.is_none() {
            ui.centered_and_justified(|ui| {
                ui.vertical_centered(|ui| {
                    if self.has_generated {
                        ui.heading(t!("display.failed_title"));
                        ui.label(t!("display.failed_body"));
                    } else {
                        ui.heading(t!("welcome.title"));
                        ui.label(t!("welcome.body"));
                    }
                });
            });
            return;
        }

        self.result_view(ctx, ui);
    }

    fn loading_view(&mut self, ui: &mut egui::Ui) {
        let elapsed = self
            .loading_since
            .map(|t| t.elapsed().as_secs_f32())
            .unwrap_or(0.0);
        let index = (elapsed / LOADING_ROTATE_SECS) as usize % LOADING_KEYS.len();
        ui.centered_and_justified(|ui| {
            ui.vertical_centered(|ui| {
                ui.spinner();
                ui.heading(t!("display.generating_title"));
                ui.label(t!(LOADING_KEYS[index]));
            });
        });
        // keep the message rotation ticking
        ui.ctx()
            .request_repaint_after(std::time::Duration::from_millis(250));
    }

    fn result_view(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        // action row
        ui.horizontal(|ui| {
            if ui.button(t!("display.download")).clicked() {
                self.download_main();
            }
            if ui
                .add_enabled(!self.is_editing, egui::Button::new(t!("display.variations")))
                .clicked()
            {
                self.start_variations(ctx);
            }
            if ui
                .add_enabled(!self.is_editing, egui::Button::new(t!("display.edit")))
                .clicked()
            {
                self.open_session();
            }
        });

        // quick text-edit bar
        ui.horizontal(|ui| {
            let field = egui::TextEdit::singleline(&mut self.edit_text)
                .hint_text(t!("editbar.placeholder"))
                .desired_width((ui.available_width() - 110.0).max(80.0));
            let response = ui.add_enabled(!self.is_editing, field);
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            let can_apply = !self.is_editing && !self.edit_text.trim().is_empty();
            let label = if self.is_editing {
                t!("editbar.applying")
            } else {
                t!("editbar.apply")
            };
            let clicked = ui.add_enabled(can_apply, egui::Button::new(label)).clicked();
            if self.is_editing {
                ui.spinner();
            }
            if (clicked || submitted) && can_apply {
                self.start_text_edit(ctx);
            }
        });
        if let Some(error) = &self.edit_error {
            ui.colored_label(ERROR_RED, error);
        }

        ui.separator();

        // alternatives strip
        let mut selected_alternative = None;
        if !self.alternatives.is_empty() {
            ui.label(egui::RichText::new(t!("alternatives.title")).strong());
            ui.horizontal(|ui| {
                for (idx, alt) in self.alternatives.iter_mut().enumerate() {
                    let texture = alt.texture(ctx, &format!("alternative-{idx}"));
                    let sized = egui::load::SizedTexture::from_handle(texture);
                    let thumb = egui::Image::from_texture(sized)
                        .fit_to_exact_size(Vec2::splat(ALTERNATIVE_THUMB));
                    let response = ui
                        .add(egui::ImageButton::new(thumb))
                        .on_hover_text(t!("alternatives.choose"));
                    if response.clicked() {
                        selected_alternative = Some(idx);
                    }
                }
            });
            ui.separator();
        }
        if let Some(idx) = selected_alternative {
            self.select_alternative(idx);
        }

        // main image, letterboxed into whatever is left
        let available = ui.available_size();
        self.canvas_area = available;
        if let Some(main) = &mut self.main_image {
            let mapper = CoordMapper::fit(main.pixels.width(), main.pixels.height(), available);
            let size = mapper.rendered_size();
            let texture = main.texture(ctx, "main-image");
            let sized = egui::load::SizedTexture::from_handle(texture);
            ui.with_layout(
                egui::Layout::centered_and_justified(egui::Direction::TopDown),
                |ui| {
                    ui.add(egui::Image::from_texture(sized).fit_to_exact_size(size));
                },
            );
        }
    }

    /// Promote an alternative to the main slot; the previous main joins the
    /// strip so no result is lost by browsing.
    fn select_alternative(&mut self, index: usize) {
        if index >= self.alternatives.len() {
            return;
        }
        let Some(previous_main) = self.main_image.take() else {
            return;
        };
        let chosen = self.alternatives.remove(index);
        self.alternatives.push(previous_main);
        self.main_image = Some(chosen);
    }

    fn download_main(&mut self) {
        let Some(main) = &self.main_image else { return };
        let Some(path) = io::pick_download_path(&main.inline.mime_type) else {
            return;
        };
        match io::save_inline_to(&path, &main.inline) {
            Ok(()) => log_info!("saved image to {:?}", path),
            Err(e) => {
                log_err!("save failed: {}", e);
                self.error = Some(e);
            }
        }
    }

    fn open_session(&mut self) {
        let Some(main) = &self.main_image else { return };
        // leave room for the toolbar below the canvas
        let container = Vec2::new(
            (self.canvas_area.x - 16.0).max(100.0),
            (self.canvas_area.y - 150.0).max(100.0),
        );
        self.session = Some(EditSession::open(
            main.pixels.clone(),
            container,
            EditTool::Magic,
        ));
        self.editor_base_tex = None;
        self.editor_overlay_tex = None;
        self.editor_baked_filters = FilterValues::default();
        self.edit_error = None;
    }

    // -- UI: edit session --------------------------------------------------

    fn editor_view(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let mut action = ToolbarAction::None;

        egui::TopBottomPanel::bottom("editor_toolbar").show_inside(ui, |ui| {
            if let Some(session) = &mut self.session {
                action = toolbar::show(ui, session);
            }
        });

        if let Some(session) = &mut self.session {
            let size = session.mapper.rendered_size();
            let mut overlay_changed = false;

            egui::CentralPanel::default().show_inside(ui, |ui| {
                ui.with_layout(
                    egui::Layout::centered_and_justified(egui::Direction::TopDown),
                    |ui| {
                        let (response, painter) =
                            ui.allocate_painter(size, egui::Sense::click_and_drag());
                        let origin = response.rect.min;

                        if let Some(pos) = response.interact_pointer_pos() {
                            let local = pos - origin;
                            let local =
                                egui::Pos2::new(local.x.clamp(0.0, size.x), local.y.clamp(0.0, size.y));
                            if response.drag_started() {
                                session.pointer_down(local);
                                overlay_changed = true;
                            } else if response.dragged() {
                                session.pointer_move(local);
                                overlay_changed = true;
                            }
                        }
                        if response.drag_released() {
                            session.pointer_up();
                        }

                        // base texture, re-baked when the filter preview moves
                        let wanted = if session.tool == EditTool::Filters {
                            session.filters
                        } else {
                            FilterValues::default()
                        };
                        if self.editor_base_tex.is_none() || self.editor_baked_filters != wanted {
                            let pixels = if wanted.is_identity() {
                                session.rendered().clone()
                            } else {
                                session.filtered_preview()
                            };
                            self.editor_base_tex = Some(ctx.load_texture(
                                "editor-base",
                                rgba_to_color_image(&pixels),
                                TextureOptions::LINEAR,
                            ));
                            self.editor_baked_filters = wanted;
                        }
                        if self.editor_overlay_tex.is_none() || overlay_changed {
                            self.editor_overlay_tex = Some(ctx.load_texture(
                                "editor-overlay",
                                rgba_to_color_image(session.overlay.pixels()),
                                TextureOptions::LINEAR,
                            ));
                        }

                        let uv =
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                        if let Some(tex) = &self.editor_base_tex {
                            painter.image(tex.id(), response.rect, uv, Color32::WHITE);
                        }
                        if let Some(tex) = &self.editor_overlay_tex {
                            painter.image(tex.id(), response.rect, uv, Color32::WHITE);
                        }

                        if session.is_applying {
                            painter.rect_filled(response.rect, 0.0, Color32::from_black_alpha(140));
                            painter.text(
                                response.rect.center(),
                                egui::Align2::CENTER_CENTER,
                                t!("display.edit_processing"),
                                egui::FontId::proportional(18.0),
                                Color32::WHITE,
                            );
                            painter.text(
                                response.rect.center() + egui::vec2(0.0, 24.0),
                                egui::Align2::CENTER_CENTER,
                                t!("display.edit_pixels"),
                                egui::FontId::proportional(13.0),
                                Color32::from_gray(200),
                            );
                        }
                    },
                );
            });
        }

        match action {
            ToolbarAction::Apply => self.apply_edit(ctx),
            ToolbarAction::Cancel => self.close_session(),
            ToolbarAction::None => {}
        }
    }
}

impl eframe::App for StudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.handle_outcome(outcome);
        }

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.controls_panel(ctx, ui);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.display_panel(ctx, ui);
        });

        // keep polling while any worker is in flight
        let applying = self
            .session
            .as_ref()
            .map(|s| s.is_applying)
            .unwrap_or(false);
        if self.is_loading || self.is_enhancing || self.is_analyzing || self.is_editing || applying {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::SourceImage;

    fn fresh_app() -> StudioApp {
        StudioApp::from_settings(AppSettings::default())
    }

    fn stub_upload() -> SourceImage {
        SourceImage {
            encoded: InlineImage {
                data: "QQ==".to_string(),
                mime_type: "image/png".to_string(),
            },
            pixels: RgbaImage::new(1, 1),
        }
    }

    #[test]
    fn remote_calls_share_one_gate() {
        let ctx = egui::Context::default();

        // generate does not start while an enhancement is outstanding
        let mut app = fresh_app();
        app.prompt = "a red fox".to_string();
        app.is_enhancing = true;
        app.start_generate(&ctx);
        assert!(!app.is_loading);

        // enhance does not start while an analysis is outstanding
        let mut app = fresh_app();
        app.prompt = "a red fox".to_string();
        app.is_analyzing = true;
        app.start_enhance(&ctx);
        assert!(!app.is_enhancing);

        // analyze does not start while a generation is outstanding
        let mut app = fresh_app();
        app.analysis_image.image = Some(stub_upload());
        app.is_loading = true;
        app.start_analyze(&ctx);
        assert!(!app.is_analyzing);

        // variations are generations and honor the same gate
        let mut app = fresh_app();
        app.displayed_prompt = "a red fox".to_string();
        app.is_enhancing = true;
        app.start_variations(&ctx);
        assert!(!app.is_loading);
    }

    #[test]
    fn free_gate_lets_a_generation_start() {
        let ctx = egui::Context::default();
        let mut app = fresh_app();
        app.prompt = "a red fox".to_string();
        app.start_generate(&ctx);
        assert!(app.is_loading);
        assert!(app.has_generated);
    }
}
