// crates/gifconv-core/src/job.rs
//
// The job description handed from the UI to JobController, plus the
// controller's admission state.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::paths::{resolve_output, validate_input};

/// Palette reduction applied to every frame before encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantizeMethod {
    /// Keep true colour; the encoder picks a palette per frame at write time.
    None,
    /// Median cut. Better colour fidelity, larger files.
    #[default]
    MedianCut,
    /// NeuQuant neural-net quantizer. Faster, coarser.
    NeuQuant,
}

impl QuantizeMethod {
    pub const ALL: [QuantizeMethod; 3] = [Self::None, Self::MedianCut, Self::NeuQuant];

    pub fn label(self) -> &'static str {
        match self {
            Self::None      => "None",
            Self::MedianCut => "Median cut",
            Self::NeuQuant  => "NeuQuant",
        }
    }
}

/// Complete description of one export. Moved into the job thread on start and
/// never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct JobSpec {
    /// Used only to correlate log lines.
    pub job_id:         Uuid,
    pub input:          PathBuf,
    /// Destination as the user typed it: a `.gif` file, a directory, or empty
    /// (derive from the input path). Resolved by `validate`.
    pub output:         PathBuf,
    /// Scale applied to both dimensions. `1.0` skips the resize step entirely.
    pub resize:         f64,
    pub quantize:       QuantizeMethod,
    /// k-means refinement passes over the palette clusters. 0 = none.
    pub cluster_count:  u32,
    /// Multiplier on the source frame rate.
    pub playback_speed: f64,
    /// Requested worker threads; see `workers()` for the effective count.
    pub worker_count:   usize,
}

impl JobSpec {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            job_id:         Uuid::new_v4(),
            input:          input.into(),
            output:         output.into(),
            resize:         1.0,
            quantize:       QuantizeMethod::default(),
            cluster_count:  0,
            playback_speed: 1.0,
            worker_count:   1,
        }
    }

    pub fn with_resize(mut self, resize: f64) -> Self { self.resize = resize; self }
    pub fn with_quantize(mut self, method: QuantizeMethod, cluster_count: u32) -> Self {
        self.quantize = method;
        self.cluster_count = cluster_count;
        self
    }
    pub fn with_playback_speed(mut self, speed: f64) -> Self { self.playback_speed = speed; self }
    pub fn with_workers(mut self, workers: usize) -> Self { self.worker_count = workers; self }

    /// Effective worker count: the request clamped to at least one.
    pub fn workers(&self) -> usize {
        self.worker_count.max(1)
    }

    /// Output size for a `width × height` source, or `None` when no resize
    /// should be applied.
    pub fn target_size(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        if self.resize == 1.0 {
            return None;
        }
        let w = ((width as f64 * self.resize) as u32).max(1);
        let h = ((height as f64 * self.resize) as u32).max(1);
        Some((w, h))
    }

    /// Check paths and parameters; returns the resolved destination file.
    pub fn validate(&self) -> Result<PathBuf, ValidationError> {
        if !self.resize.is_finite() || self.resize <= 0.0 {
            return Err(ValidationError::InvalidResize(self.resize));
        }
        validate_input(&self.input)?;
        resolve_output(&self.input, &self.output)
    }
}

/// Admission state of the single export slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JobState {
    #[default]
    Idle,
    Running,
}
