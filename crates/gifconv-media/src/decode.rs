// crates/gifconv-media/src/decode.rs
//
// VideoSource: sequential ffmpeg decode of the best video stream, scaled to
// packed RGBA at native resolution. No seeking; the pipeline reads every
// frame exactly once from the start.

use std::path::{Path, PathBuf};
use anyhow::Context as _;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};
use ffmpeg::util::frame::video::Video as VideoFrame;

use crate::error::SourceError;
use crate::source::{FrameSource, RawFrame, SourceOpener, StreamInfo};

pub struct VideoSource {
    ictx:      ffmpeg::format::context::Input,
    decoder:   ffmpeg::decoder::video::Video,
    scaler:    SwsContext,
    video_idx: usize,
    info:      StreamInfo,
    /// Set once the demuxer is exhausted and the decoder has been told to flush.
    eof_sent:  bool,
}

impl VideoSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        if !path.is_file() {
            return Err(SourceError::NotFound(path.display().to_string()));
        }
        let path = path.to_path_buf();
        Self::open_stream(&path)
            .map_err(|e| SourceError::UnsupportedFormat(format!("{}: {e:#}", path.display())))
    }

    fn open_stream(path: &PathBuf) -> anyhow::Result<Self> {
        let ictx = input(path).context("opening container")?;
        let (video_idx, frame_rate, declared_frames) = {
            let stream = ictx.streams().best(Type::Video)
                .ok_or_else(|| anyhow::anyhow!("no video stream"))?;
            let avg  = stream.avg_frame_rate();
            let rate = if avg.numerator() > 0 && avg.denominator() > 0 { avg } else { stream.rate() };
            let fps  = if rate.denominator() == 0 {
                0.0
            } else {
                rate.numerator() as f64 / rate.denominator() as f64
            };
            let declared = u64::try_from(stream.frames()).ok().filter(|&n| n > 0);
            (stream.index(), fps, declared)
        };

        // Second context for decoder params (avoids borrow conflict with ictx).
        let ictx2   = input(path)?;
        let stream2 = ictx2.stream(video_idx)
            .ok_or_else(|| anyhow::anyhow!("stream gone"))?;
        let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream2.parameters())?;
        let decoder = dec_ctx.decoder().video().context("opening video decoder")?;

        let (width, height) = (decoder.width(), decoder.height());
        if width == 0 || height == 0 {
            anyhow::bail!("stream reports zero-sized frames");
        }

        let scaler = SwsContext::get(
            decoder.format(), width, height,
            Pixel::RGBA, width, height, Flags::BILINEAR,
        )?;

        log::info!(
            "[source] {}x{} @ {frame_rate:.3} fps, {} declared frames ← {}",
            width, height,
            declared_frames.map(|n| n.to_string()).unwrap_or_else(|| "no".into()),
            path.display(),
        );

        Ok(Self {
            ictx, decoder, scaler, video_idx,
            info: StreamInfo { width, height, frame_rate, declared_frames },
            eof_sent: false,
        })
    }

    /// Scale a decoded frame to RGBA and copy out only the visible pixels,
    /// dropping stride padding.
    fn to_raw(&mut self, decoded: &VideoFrame) -> Option<RawFrame> {
        let mut out = VideoFrame::empty();
        if let Err(e) = self.scaler.run(decoded, &mut out) {
            log::warn!("[source] scaler failed, ending stream: {e}");
            return None;
        }
        let (w, h) = (self.info.width as usize, self.info.height as usize);
        let stride = out.stride(0);
        let raw    = out.data(0);
        let data: Vec<u8> = (0..h)
            .flat_map(|row| {
                let s = row * stride;
                &raw[s..s + w * 4]
            })
            .copied()
            .collect();
        Some(RawFrame { width: self.info.width, height: self.info.height, data })
    }
}

impl FrameSource for VideoSource {
    fn info(&self) -> StreamInfo {
        self.info
    }

    fn read(&mut self) -> Option<RawFrame> {
        let video_idx = self.video_idx;
        loop {
            let mut decoded = VideoFrame::empty();
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return self.to_raw(&decoded);
            }
            if self.eof_sent {
                return None;
            }

            let mut fed = false;
            for (stream, packet) in self.ictx.packets().flatten() {
                if stream.index() != video_idx { continue; }
                if self.decoder.send_packet(&packet).is_err() { continue; }
                fed = true;
                break;
            }
            if !fed {
                // Demuxer exhausted: flush the frames the decoder still holds.
                let _ = self.decoder.send_eof();
                self.eof_sent = true;
            }
        }
    }
}

/// Opens files through ffmpeg. Construction initialises the ffmpeg libraries.
pub struct FfmpegOpener;

impl FfmpegOpener {
    pub fn new() -> anyhow::Result<Self> {
        ffmpeg::init().context("FFmpeg init failed")?;
        Ok(Self)
    }
}

impl SourceOpener for FfmpegOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameSource>, SourceError> {
        Ok(Box::new(VideoSource::open(path)?))
    }
}
