// crates/gifconv-ui/src/modules/export_form.rs
//
// ExportForm: left-panel controls for one video → GIF conversion.
//
// Status banner (driven by AppContext::status):
//
//   Idle       → "Convert" enabled once the input passes validation
//   Running    → spinner, button disabled; a second start would be refused anyway
//   Done       → green banner with output path, frame count and file size
//   Failed     → red banner, file size "nan"
//   Rejected   → red banner with the validation message

use egui::{Margin, RichText, Ui};

use gifconv_core::commands::FormCommand;
use gifconv_core::helpers::format::format_percent;
use gifconv_core::job::QuantizeMethod;
use gifconv_core::paths::validate_input;
use gifconv_core::settings::{RESIZE_PERCENT_CHOICES, SPEED_CHOICES};

use super::{Panel, PanelView};
use crate::context::ExportStatus;
use crate::theme::{ACCENT, HEADER_BG, STATUS_ERR, STATUS_OK, TEXT_DIM};

const LABEL_W: f32 = 90.0;
const MAX_CLUSTERS: u32 = 16;
const MAX_WORKERS: usize = 64;

#[derive(Default)]
pub struct ExportForm;

impl Panel for ExportForm {
    fn name(&self) -> &str { "🎞 Video → GIF" }

    fn ui(&mut self, ui: &mut Ui, view: &PanelView<'_>, cmd: &mut Vec<FormCommand>) {
        let settings = view.settings;

        egui::Frame::new()
            .fill(HEADER_BG)
            .inner_margin(Margin { left: 8, right: 8, top: 6, bottom: 6 })
            .show(ui, |ui| {
                ui.label(RichText::new(self.name()).size(12.0).strong());
            });
        ui.add_space(6.0);

        // ── Paths ─────────────────────────────────────────────────────────────
        let mut input = settings.input.display().to_string();
        labeled(ui, "Video", |ui| {
            if ui.button("Browse…").clicked() {
                cmd.push(FormCommand::BrowseInput);
            }
            if ui.add(egui::TextEdit::singleline(&mut input).desired_width(f32::INFINITY)).changed() {
                cmd.push(FormCommand::SetInput(input.clone().into()));
            }
        });
        let input_check = validate_input(&settings.input);
        if let Err(e) = &input_check {
            if !settings.input.as_os_str().is_empty() {
                ui.label(RichText::new(e.to_string()).size(10.0).color(STATUS_ERR));
            }
        }

        let mut output = settings.output.display().to_string();
        labeled(ui, "Output", |ui| {
            if ui.button("Folder…").clicked() {
                cmd.push(FormCommand::BrowseOutputDir);
            }
            if ui.button("File…").clicked() {
                cmd.push(FormCommand::BrowseOutputFile);
            }
            if ui.add(
                egui::TextEdit::singleline(&mut output)
                    .hint_text("next to the video")
                    .desired_width(f32::INFINITY),
            ).changed() {
                cmd.push(FormCommand::SetOutput(output.clone().into()));
            }
        });

        ui.separator();

        // ── Parameters ────────────────────────────────────────────────────────
        labeled(ui, "Resize", |ui| {
            let mut percent = settings.resize_percent;
            egui::ComboBox::from_id_salt("resize_percent")
                .selected_text(format_percent(percent as f64 / 100.0))
                .show_ui(ui, |ui| {
                    for p in RESIZE_PERCENT_CHOICES {
                        ui.selectable_value(&mut percent, p, format_percent(p as f64 / 100.0));
                    }
                });
            if percent != settings.resize_percent {
                cmd.push(FormCommand::SetResizePercent(percent));
            }
        });

        labeled(ui, "Quantize", |ui| {
            let mut method = settings.quantize;
            egui::ComboBox::from_id_salt("quantize")
                .selected_text(method.label())
                .show_ui(ui, |ui| {
                    for m in QuantizeMethod::ALL {
                        ui.selectable_value(&mut method, m, m.label());
                    }
                });
            if method != settings.quantize {
                cmd.push(FormCommand::SetQuantize(method));
            }
        });

        labeled(ui, "Refine passes", |ui| {
            let mut clusters = settings.cluster_count;
            let enabled = settings.quantize != QuantizeMethod::None;
            ui.add_enabled(enabled, egui::DragValue::new(&mut clusters).range(0..=MAX_CLUSTERS))
                .on_hover_text("k-means passes over the palette after quantizing (0 = off)");
            if clusters != settings.cluster_count {
                cmd.push(FormCommand::SetClusterCount(clusters));
            }
        });

        labeled(ui, "Speed", |ui| {
            let mut speed = settings.playback_speed;
            egui::ComboBox::from_id_salt("playback_speed")
                .selected_text(format!("×{speed:.2}"))
                .show_ui(ui, |ui| {
                    for s in SPEED_CHOICES {
                        ui.selectable_value(&mut speed, s, format!("×{s:.2}"));
                    }
                });
            if speed != settings.playback_speed {
                cmd.push(FormCommand::SetPlaybackSpeed(speed));
            }
        });

        labeled(ui, "Workers", |ui| {
            let mut workers = settings.worker_count.max(1);
            ui.add(egui::DragValue::new(&mut workers).range(1..=MAX_WORKERS));
            if workers != settings.worker_count {
                cmd.push(FormCommand::SetWorkerCount(workers));
            }
        });

        ui.separator();

        // ── Export ────────────────────────────────────────────────────────────
        let can_start = !view.busy && input_check.is_ok();
        let button = egui::Button::new(RichText::new("Convert to GIF").strong().color(
            if can_start { ACCENT } else { TEXT_DIM },
        ))
        .min_size(egui::vec2(ui.available_width(), 30.0));
        let tip = if view.busy {
            "An export is already running"
        } else if input_check.is_err() {
            "Choose a supported video first"
        } else {
            "Convert with the settings above"
        };
        if ui.add_enabled(can_start, button).on_hover_text(tip).on_disabled_hover_text(tip).clicked() {
            cmd.push(FormCommand::StartExport);
        }

        ui.add_space(8.0);
        status_banner(ui, view.status, cmd);
    }
}

fn labeled(ui: &mut Ui, label: &str, add: impl FnOnce(&mut Ui)) {
    ui.horizontal(|ui| {
        ui.add_sized([LABEL_W, 18.0], egui::Label::new(RichText::new(label).color(TEXT_DIM)));
        add(ui);
    });
}

fn status_banner(ui: &mut Ui, status: &ExportStatus, cmd: &mut Vec<FormCommand>) {
    match status {
        ExportStatus::Idle => {}
        ExportStatus::Running { output } => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(format!("Converting to {}", output.display()));
            });
        }
        ExportStatus::Done { output, frames, duration_ms, size } => {
            ui.label(RichText::new("✓ Export finished").strong().color(STATUS_OK));
            ui.label(RichText::new(output.display().to_string()).size(10.0));
            ui.label(format!("{frames} frames @ {duration_ms:.1} ms   size: {size}"));
            if ui.small_button("Dismiss").clicked() {
                cmd.push(FormCommand::ClearStatus);
            }
        }
        ExportStatus::Failed { output, size } => {
            ui.label(RichText::new("✗ Export failed").strong().color(STATUS_ERR));
            ui.label(RichText::new(output.display().to_string()).size(10.0));
            ui.label(format!("size: {size}"));
            if ui.small_button("Dismiss").clicked() {
                cmd.push(FormCommand::ClearStatus);
            }
        }
        ExportStatus::Rejected(msg) => {
            ui.label(RichText::new(format!("✗ {msg}")).color(STATUS_ERR));
            if ui.small_button("Dismiss").clicked() {
                cmd.push(FormCommand::ClearStatus);
            }
        }
    }
}
