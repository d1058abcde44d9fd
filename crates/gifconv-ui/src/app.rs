// src/app.rs (gifconv-ui)
use std::path::PathBuf;

use eframe::egui;
use rfd::FileDialog;

use gifconv_core::commands::FormCommand;
use gifconv_core::paths::{OUTPUT_EXTENSION, SUPPORTED_INPUT_EXTENSIONS};
use gifconv_core::settings::ExportSettings;
use gifconv_media::{JobController, Pipeline};

use crate::context::AppContext;
use crate::modules::{export_form::ExportForm, preview::PreviewPanel, Panel, PanelView};
use crate::paths::settings_file;
use crate::theme::configure_style;

// ── App ───────────────────────────────────────────────────────────────────────

pub struct GifConvApp {
    settings:      ExportSettings,
    settings_path: PathBuf,
    context:       AppContext,
    form:          ExportForm,
    preview:       PreviewPanel,
    /// Commands emitted by panels each frame, processed after the UI pass
    pending_cmds:  Vec<FormCommand>,
}

impl GifConvApp {
    pub fn new(cc: &eframe::CreationContext<'_>, pipeline: Pipeline) -> Self {
        configure_style(&cc.egui_ctx);
        cc.egui_ctx.options_mut(|o| {
            o.theme_preference = egui::ThemePreference::Dark;
        });

        let settings_path = settings_file();
        let settings = ExportSettings::load(&settings_path).unwrap_or_else(|e| {
            log::warn!("[ui] ignoring {}: {e}", settings_path.display());
            ExportSettings::default()
        });

        Self {
            settings,
            settings_path,
            context:      AppContext::new(JobController::new(pipeline)),
            form:         ExportForm,
            preview:      PreviewPanel::new(),
            pending_cmds: Vec::new(),
        }
    }

    fn process_command(&mut self, cmd: FormCommand, ctx: &egui::Context) {
        if apply_setting(&mut self.settings, &cmd) {
            return;
        }
        match cmd {
            FormCommand::BrowseInput => {
                if let Some(path) = FileDialog::new()
                    .add_filter("Video", SUPPORTED_INPUT_EXTENSIONS)
                    .pick_file()
                {
                    self.settings.input = path;
                }
            }
            FormCommand::BrowseOutputFile => {
                let stem = self.settings.input.file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| "output".into());
                if let Some(path) = FileDialog::new()
                    .set_file_name(format!("{stem}.{OUTPUT_EXTENSION}"))
                    .add_filter("GIF", &[OUTPUT_EXTENSION])
                    .save_file()
                {
                    self.settings.output = path;
                }
            }
            FormCommand::BrowseOutputDir => {
                if let Some(dir) = FileDialog::new().pick_folder() {
                    self.settings.output = dir;
                }
            }
            FormCommand::StartExport => {
                self.save_settings();
                self.context.start_export(&self.settings, ctx);
            }
            FormCommand::ClearStatus => self.context.clear_status(),
            // Setters were consumed by apply_setting above.
            _ => {}
        }
    }

    fn save_settings(&self) {
        if let Err(e) = self.settings.save(&self.settings_path) {
            log::warn!("[ui] could not save settings: {e}");
        }
    }

    fn handle_drag_and_drop(&mut self, ctx: &egui::Context) {
        let files = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(path) = files.into_iter().filter_map(|f| f.path).next() {
            self.settings.input = path;
        }
    }
}

/// Apply a plain settings change. Returns `false` for commands that need
/// dialogs or the job controller.
fn apply_setting(settings: &mut ExportSettings, cmd: &FormCommand) -> bool {
    match cmd {
        FormCommand::SetInput(p)         => settings.input = p.clone(),
        FormCommand::SetOutput(p)        => settings.output = p.clone(),
        FormCommand::SetResizePercent(p) => settings.resize_percent = *p,
        FormCommand::SetQuantize(m)      => settings.quantize = *m,
        FormCommand::SetClusterCount(c)  => settings.cluster_count = *c,
        FormCommand::SetPlaybackSpeed(s) => settings.playback_speed = *s,
        FormCommand::SetWorkerCount(w)   => settings.worker_count = (*w).max(1),
        _ => return false,
    }
    true
}

// ── eframe::App ───────────────────────────────────────────────────────────────

impl eframe::App for GifConvApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.save_settings();
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_drag_and_drop(ctx);
        self.context.ingest_job_events();

        let preview = self.context.controller.preview();
        let view = PanelView {
            settings: &self.settings,
            status:   &self.context.status,
            busy:     self.context.is_busy(),
            preview:  &preview,
        };

        egui::TopBottomPanel::top("top_panel")
            .exact_height(32.0)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new("GIF Converter")
                            .strong().size(15.0).color(crate::theme::ACCENT),
                    );
                    ui.separator();
                    ui.label(egui::RichText::new("Drop a video file to select it").size(12.0).weak());
                });
            });

        egui::SidePanel::left("form_panel")
            .resizable(true)
            .default_width(380.0)
            .min_width(300.0)
            .show(ctx, |ui| {
                self.form.ui(ui, &view, &mut self.pending_cmds);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.preview.ui(ui, &view, &mut self.pending_cmds);
        });

        // ── Process commands emitted by panels this frame ─────────────────────
        let cmds: Vec<FormCommand> = self.pending_cmds.drain(..).collect();
        for cmd in cmds {
            self.process_command(cmd, ctx);
        }
    }
}
