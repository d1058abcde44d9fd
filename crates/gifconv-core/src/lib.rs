// crates/gifconv-core/src/lib.rs
//
// Plain data and pure logic shared by gifconv-media and gifconv-ui.
// No ffmpeg, no egui: nothing in here touches a decoder or a window.

pub mod commands;
pub mod error;
pub mod helpers;
pub mod job;
pub mod media_types;
pub mod paths;
pub mod preview;
pub mod settings;

pub use commands::FormCommand;
pub use error::{DurationError, StartError, ValidationError};
pub use job::{JobSpec, JobState, QuantizeMethod};
pub use media_types::{EncodedImage, FramePixels, Sequence};
pub use preview::{PreviewBuffer, PreviewTick};
pub use settings::ExportSettings;
