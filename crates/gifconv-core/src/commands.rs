// crates/gifconv-core/src/commands.rs
//
// Every user action on the export form is a FormCommand. Panels emit these;
// app.rs applies them after the UI pass.

use std::path::PathBuf;

use crate::job::QuantizeMethod;

#[derive(Debug, Clone, PartialEq)]
pub enum FormCommand {
    // ── Paths ────────────────────────────────────────────────────────────────
    SetInput(PathBuf),
    SetOutput(PathBuf),
    /// Open a file dialog for the source video.
    BrowseInput,
    /// Open a save dialog for the destination `.gif`.
    BrowseOutputFile,
    /// Pick a destination directory; the file name comes from the input.
    BrowseOutputDir,

    // ── Parameters ───────────────────────────────────────────────────────────
    SetResizePercent(u32),
    SetQuantize(QuantizeMethod),
    SetClusterCount(u32),
    SetPlaybackSpeed(f64),
    SetWorkerCount(usize),

    // ── Export ───────────────────────────────────────────────────────────────
    StartExport,
    /// Dismiss the success/failure banner.
    ClearStatus,
}
