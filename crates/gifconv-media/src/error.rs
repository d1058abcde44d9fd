// crates/gifconv-media/src/error.rs
//
// Failures inside a running job. All of them end in the same place (the
// finished callback with success = false) but keep their cause for the log.

use thiserror::Error;

use gifconv_core::error::DurationError;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("video not found: {0}")]
    NotFound(String),
    #[error("unsupported or unreadable video: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("no frames to encode")]
    Empty,
    #[error("frame {width}x{height} exceeds the GIF limit of 65535 px per side")]
    TooLarge { width: u32, height: u32 },
    #[error("frame {index} does not match the first frame's {width}x{height} layout")]
    DimensionMismatch { index: usize, width: u32, height: u32 },
    #[error("writing GIF: {0}")]
    Io(#[from] std::io::Error),
    #[error("GIF encoder: {0}")]
    Gif(#[from] gif::EncodingError),
}

/// The result stream did not add up to the frames that were submitted.
#[derive(Debug, Error)]
pub enum ReassembleError {
    #[error("result channel closed after {received} of {expected} frames")]
    Disconnected { received: usize, expected: usize },
    #[error("frame {0} reported twice")]
    DuplicateIndex(usize),
    #[error("frame index {index} outside 0..{expected}")]
    OutOfRange { index: usize, expected: usize },
    #[error("processing frame {index} failed: {message}")]
    Processing { index: usize, message: String },
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("spawning workers: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("all workers exited before the source was drained")]
    PoolClosed,
    #[error(transparent)]
    Reassemble(#[from] ReassembleError),
    #[error(transparent)]
    Duration(#[from] DurationError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("job thread panicked: {0}")]
    Panicked(String),
}
