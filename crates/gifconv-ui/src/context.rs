// crates/gifconv-ui/src/context.rs
//
// AppContext owns the runtime handles that are not part of the persisted
// ExportSettings: the JobController, the channel its callbacks report on, and
// the export status shown in the form.
//
// JobController callbacks run on the job thread. They never touch UI state
// directly; they post a JobEvent and request a repaint, and
// ingest_job_events() folds the events into `status` at the top of the next
// frame.

use std::path::{Path, PathBuf};

use crossbeam_channel::{unbounded, Receiver, Sender};
use eframe::egui;

use gifconv_core::helpers::format::format_file_size;
use gifconv_core::settings::ExportSettings;
use gifconv_media::JobController;

#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    Ready { frames: usize, duration_ms: f64 },
    Finished { ok: bool, output: PathBuf },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ExportStatus {
    #[default]
    Idle,
    Running { output: PathBuf },
    Done { output: PathBuf, frames: usize, duration_ms: f64, size: String },
    Failed { output: PathBuf, size: String },
    /// `start` refused the job; nothing was spawned.
    Rejected(String),
}

pub struct AppContext {
    pub controller: JobController,
    pub status:     ExportStatus,
    /// Frame count and duration from the last sequence-ready callback.
    last_ready:     Option<(usize, f64)>,
    event_tx:       Sender<JobEvent>,
    event_rx:       Receiver<JobEvent>,
}

impl AppContext {
    pub fn new(controller: JobController) -> Self {
        let (event_tx, event_rx) = unbounded();
        Self { controller, status: ExportStatus::Idle, last_ready: None, event_tx, event_rx }
    }

    pub fn is_busy(&self) -> bool {
        !self.controller.is_ready()
    }

    pub fn start_export(&mut self, settings: &ExportSettings, ctx: &egui::Context) {
        let ready_tx  = self.event_tx.clone();
        let done_tx   = self.event_tx.clone();
        let ready_ctx = ctx.clone();
        let done_ctx  = ctx.clone();

        let started = self.controller.try_start(
            settings.to_job_spec(),
            move |images, duration_ms| {
                let _ = ready_tx.send(JobEvent::Ready { frames: images.len(), duration_ms });
                ready_ctx.request_repaint();
            },
            move |ok, output| {
                let _ = done_tx.send(JobEvent::Finished { ok, output });
                done_ctx.request_repaint();
            },
        );

        self.last_ready = None;
        self.status = match started {
            Ok(output) => ExportStatus::Running { output },
            Err(e) => {
                log::warn!("[ui] export not started: {e}");
                ExportStatus::Rejected(e.to_string())
            }
        };
    }

    /// Drain callback events posted since the last frame.
    pub fn ingest_job_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: JobEvent) {
        match event {
            JobEvent::Ready { frames, duration_ms } => {
                self.last_ready = Some((frames, duration_ms));
            }
            JobEvent::Finished { ok, output } => {
                let size = output_size_label(&output, ok);
                self.status = match (ok, self.last_ready.take()) {
                    (true, Some((frames, duration_ms))) => ExportStatus::Done { output, frames, duration_ms, size },
                    (true, None)  => ExportStatus::Done { output, frames: 0, duration_ms: 0.0, size },
                    (false, _)    => ExportStatus::Failed { output, size },
                };
            }
        }
    }

    /// Drop a finished banner. A running export keeps its status.
    pub fn clear_status(&mut self) {
        if !matches!(self.status, ExportStatus::Running { .. }) {
            self.status = ExportStatus::Idle;
        }
    }
}

/// Size of the written GIF, or `nan` when the export failed or the file is gone.
pub fn output_size_label(output: &Path, ok: bool) -> String {
    if !ok {
        return "nan".into();
    }
    match std::fs::metadata(output) {
        Ok(meta) if meta.is_file() => format_file_size(meta.len()),
        _ => "nan".into(),
    }
}
