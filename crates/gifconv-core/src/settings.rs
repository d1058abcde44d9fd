// crates/gifconv-core/src/settings.rs
//
// Export form values persisted between runs as JSON. Everything the form
// shows round-trips through here; `to_job_spec` is the only way the UI
// builds a JobSpec.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::job::{JobSpec, QuantizeMethod};

/// Resize choices offered in the form, as percentages.
pub const RESIZE_PERCENT_CHOICES: [u32; 8] = [25, 50, 75, 100, 125, 150, 175, 200];

/// Playback speed choices offered in the form.
pub const SPEED_CHOICES: [f64; 8] = [0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0];

pub const DEFAULT_WORKERS: usize = 8;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub input:          PathBuf,
    /// Empty = next to the input, with a `.gif` extension.
    pub output:         PathBuf,
    pub resize_percent: u32,
    pub quantize:       QuantizeMethod,
    pub cluster_count:  u32,
    pub playback_speed: f64,
    pub worker_count:   usize,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            input:          PathBuf::new(),
            output:         PathBuf::new(),
            resize_percent: 100,
            quantize:       QuantizeMethod::default(),
            cluster_count:  0,
            playback_speed: 1.0,
            worker_count:   DEFAULT_WORKERS,
        }
    }
}

impl ExportSettings {
    pub fn resize_factor(&self) -> f64 {
        self.resize_percent as f64 / 100.0
    }

    pub fn to_job_spec(&self) -> JobSpec {
        JobSpec::new(self.input.clone(), self.output.clone())
            .with_resize(self.resize_factor())
            .with_quantize(self.quantize, self.cluster_count)
            .with_playback_speed(self.playback_speed)
            .with_workers(self.worker_count)
    }

    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
