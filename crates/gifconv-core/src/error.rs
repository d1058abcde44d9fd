// crates/gifconv-core/src/error.rs
//
// Errors raised before a job is admitted. Anything that can go wrong once the
// pipeline is running lives in gifconv-media and collapses to a boolean at the
// job boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Rejection of a `JobSpec` before any thread is spawned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("no input path given")]
    InputMissing,
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),
    #[error("unsupported input extension: {0}")]
    UnsupportedInput(PathBuf),
    #[error("output directory does not exist: {0}")]
    OutputDirectoryMissing(PathBuf),
    #[error("output must end in .gif: {0}")]
    OutputExtension(PathBuf),
    #[error("output location is missing or read-only: {0}")]
    OutputNotWritable(PathBuf),
    #[error("resize factor must be a positive number, got {0}")]
    InvalidResize(f64),
}

/// Why `JobController::try_start` refused a job.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StartError {
    #[error("an export is already running")]
    Busy,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("could not spawn the job thread: {0}")]
    Spawn(String),
}

/// The per-frame duration came out non-finite or non-positive.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid frame duration (frame rate {frame_rate}, playback speed {playback_speed})")]
pub struct DurationError {
    pub frame_rate:     f64,
    pub playback_speed: f64,
}
