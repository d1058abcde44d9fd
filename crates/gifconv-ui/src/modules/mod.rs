// crates/gifconv-ui/src/modules/mod.rs
//
// Panel registry. Panels read a PanelView and emit FormCommands; they never
// mutate settings or the job state directly.

pub mod export_form;
pub mod preview;

use egui::Ui;

use gifconv_core::commands::FormCommand;
use gifconv_core::media_types::EncodedImage;
use gifconv_core::preview::PreviewBuffer;
use gifconv_core::settings::ExportSettings;

use crate::context::ExportStatus;

/// Read-only snapshot handed to every panel once per frame.
pub struct PanelView<'a> {
    pub settings: &'a ExportSettings,
    pub status:   &'a ExportStatus,
    /// An export is running; the form must not start another.
    pub busy:     bool,
    pub preview:  &'a PreviewBuffer<EncodedImage>,
}

pub trait Panel {
    /// Heading drawn at the top of the panel.
    fn name(&self) -> &str;
    fn ui(&mut self, ui: &mut Ui, view: &PanelView<'_>, cmd: &mut Vec<FormCommand>);
}
