// crates/gifconv-media/src/source.rs
//
// Decoder boundary. A FrameSource yields raw RGBA frames strictly in stream
// order; the producer loop in job.rs numbers them as they come out, so the
// frame index is always the read order.

use std::path::Path;

use crate::error::SourceError;

/// Static properties of an opened stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamInfo {
    pub width:           u32,
    pub height:          u32,
    pub frame_rate:      f64,
    /// Frame count from the container header. Advisory only: truncated or
    /// damaged files deliver fewer frames, some containers report none.
    pub declared_frames: Option<u64>,
}

/// One decoded picture, packed RGBA.
#[derive(Clone, Debug, PartialEq)]
pub struct RawFrame {
    pub width:  u32,
    pub height: u32,
    pub data:   Vec<u8>,
}

/// A raw frame tagged with its 0-based read position.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub index: usize,
    pub raw:   RawFrame,
}

/// Opened and consumed on the job thread only, so no `Send` bound.
pub trait FrameSource {
    fn info(&self) -> StreamInfo;

    /// Next frame in stream order. `None` at end of stream and on any decode
    /// fault; callers stop reading either way.
    fn read(&mut self) -> Option<RawFrame>;
}

pub trait SourceOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameSource>, SourceError>;
}
