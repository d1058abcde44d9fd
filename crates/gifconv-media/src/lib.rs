// crates/gifconv-media/src/lib.rs
//
// The conversion pipeline: decode → worker pool (resize + quantize) →
// reassembly → GIF encode, orchestrated one job at a time by JobController.
// No egui dependency: the UI talks to this crate through JobController's
// callbacks and the shared PreviewBuffer.
//
// Pipeline stages sit behind three traits so tests can swap the ffmpeg
// decoder for a synthetic source:
//   FrameSource / SourceOpener  decode.rs (ffmpeg) or anything else
//   FrameProcessor              process.rs
//   SequenceEncoder             encode.rs

pub mod decode;
pub mod encode;
pub mod error;
pub mod job;
pub mod process;
pub mod quantize;
pub mod reassemble;
pub mod source;
pub mod worker;

pub use decode::{FfmpegOpener, VideoSource};
pub use encode::{GifEncoder, SequenceEncoder};
pub use error::{EncodeError, JobError, ReassembleError, SourceError};
pub use job::{JobController, Pipeline};
pub use process::{FrameProcessor, ImageProcessor, ProcessParams};
pub use reassemble::Reassembler;
pub use source::{Frame, FrameSource, RawFrame, SourceOpener, StreamInfo};
pub use worker::{ProcessedFrame, Task, WorkerPool};

pub use gifconv_core::media_types::{EncodedImage, FramePixels, Sequence};
