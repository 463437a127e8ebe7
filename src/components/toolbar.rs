//! Bottom toolbar of the edit session: tool tabs, per-tool options, and the
//! apply/cancel actions.

use egui::Color32;

use crate::editor::filters;
use crate::editor::session::{BRUSH_MAX, BRUSH_MIN, EditSession, EditTool, MagicMode};
use crate::t;

#[derive(PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    Apply,
    Cancel,
}

pub fn show(ui: &mut egui::Ui, session: &mut EditSession) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let busy = session.is_applying;

    ui.horizontal_wrapped(|ui| {
        for (tool, key) in [
            (EditTool::Magic, "editor.tool_magic"),
            (EditTool::Crop, "editor.tool_crop"),
            (EditTool::Filters, "editor.tool_filters"),
        ] {
            if ui
                .add_enabled(!busy, egui::SelectableLabel::new(session.tool == tool, t!(key)))
                .clicked()
            {
                session.set_tool(tool);
            }
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .add_enabled(!busy, egui::Button::new(t!("editor.apply")))
                .clicked()
            {
                action = ToolbarAction::Apply;
            }
            if ui
                .add_enabled(!busy, egui::Button::new(t!("editor.cancel")))
                .clicked()
            {
                action = ToolbarAction::Cancel;
            }
            if busy {
                ui.spinner();
            }
        });
    });

    ui.separator();

    match session.tool {
        EditTool::Magic => magic_options(ui, session, busy),
        EditTool::Crop => crop_options(ui, session, busy),
        EditTool::Filters => filter_options(ui, session, busy),
    }

    if let Some(error) = &session.error {
        ui.colored_label(Color32::from_rgb(248, 113, 113), error);
    }

    action
}

fn magic_options(ui: &mut egui::Ui, session: &mut EditSession, busy: bool) {
    ui.horizontal(|ui| {
        for (mode, key) in [
            (MagicMode::Remove, "editor.mode_remove"),
            (MagicMode::Add, "editor.mode_add"),
        ] {
            if ui
                .add_enabled(
                    !busy,
                    egui::SelectableLabel::new(session.magic_mode == mode, t!(key)),
                )
                .clicked()
            {
                session.magic_mode = mode;
            }
        }

        ui.label(t!("editor.brush_size"));
        ui.add_enabled(
            !busy,
            egui::Slider::new(&mut session.brush_size, BRUSH_MIN..=BRUSH_MAX),
        );
    });

    if session.magic_mode == MagicMode::Add {
        ui.add_enabled(
            !busy,
            egui::TextEdit::singleline(&mut session.add_prompt)
                .hint_text(t!("editor.add_placeholder"))
                .desired_width(f32::INFINITY),
        );
    }
}

fn crop_options(ui: &mut egui::Ui, session: &mut EditSession, busy: bool) {
    let aspect = session.native_aspect();
    ui.horizontal(|ui| {
        ui.label(t!("editor.crop_hint"));
        ui.separator();
        ui.label(t!("editor.resize_label"));

        ui.label(t!("editor.width"));
        let mut width = session.resize.width;
        if ui
            .add_enabled(!busy, egui::DragValue::new(&mut width).clamp_range(1..=16384))
            .changed()
        {
            session.resize.set_width(width, aspect);
        }
        ui.label(t!("editor.height"));
        let mut height = session.resize.height;
        if ui
            .add_enabled(!busy, egui::DragValue::new(&mut height).clamp_range(1..=16384))
            .changed()
        {
            session.resize.set_height(height, aspect);
        }
    });
}

fn filter_options(ui: &mut egui::Ui, session: &mut EditSession, busy: bool) {
    let rows: [(&str, u32, u32); 4] = [
        ("filter.brightness", filters::BRIGHTNESS_MAX, filters::BRIGHTNESS_DEFAULT),
        ("filter.contrast", filters::CONTRAST_MAX, filters::CONTRAST_DEFAULT),
        ("filter.grayscale", filters::GRAYSCALE_MAX, filters::GRAYSCALE_DEFAULT),
        ("filter.sepia", filters::SEPIA_MAX, filters::SEPIA_DEFAULT),
    ];

    for (key, max, default) in rows {
        let value = match key {
            "filter.brightness" => &mut session.filters.brightness,
            "filter.contrast" => &mut session.filters.contrast,
            "filter.grayscale" => &mut session.filters.grayscale,
            _ => &mut session.filters.sepia,
        };
        ui.horizontal(|ui| {
            ui.label(t!(key));
            ui.add_enabled(!busy, egui::Slider::new(value, 0..=max).suffix("%"));
            // double-click-to-reset convention from the slider, plus an
            // explicit reset button
            if ui.add_enabled(!busy, egui::Button::new("↺").small()).clicked() {
                *value = default;
            }
        });
    }
}
