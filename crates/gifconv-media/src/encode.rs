// crates/gifconv-media/src/encode.rs
//
// GIF writer. Output goes to a hidden temp file beside the destination and is
// renamed into place only after the trailer is written, so a failed job never
// leaves a truncated .gif where the user asked for one.

use std::borrow::Cow;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use gif::{Encoder, Frame, Repeat};

use gifconv_core::helpers::timing::gif_delay_centis;
use gifconv_core::media_types::{EncodedImage, FramePixels};

use crate::error::EncodeError;

/// Writes an ordered image list as a looping animation.
pub trait SequenceEncoder: Send + Sync {
    fn encode(&self, images: &[Arc<EncodedImage>], duration_ms: f64, dest: &Path) -> Result<(), EncodeError>;
}

pub struct GifEncoder {
    /// NeuQuant sample factor used for frames that arrive as RGBA (1 = best, 30 = fastest).
    pub speed: i32,
}

impl Default for GifEncoder {
    fn default() -> Self {
        Self { speed: 10 }
    }
}

impl SequenceEncoder for GifEncoder {
    fn encode(&self, images: &[Arc<EncodedImage>], duration_ms: f64, dest: &Path) -> Result<(), EncodeError> {
        let first = images.first().ok_or(EncodeError::Empty)?;
        let (w, h) = (first.width, first.height);
        let (w16, h16) = match (u16::try_from(w), u16::try_from(h)) {
            (Ok(a), Ok(b)) => (a, b),
            _ => return Err(EncodeError::TooLarge { width: w, height: h }),
        };
        let delay = gif_delay_centis(duration_ms);

        let dir = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let tmp = tempfile::Builder::new()
            .prefix(".gifconv-")
            .suffix(".part")
            .tempfile_in(dir)?;

        {
            let mut encoder = Encoder::new(BufWriter::new(tmp.as_file()), w16, h16, &[])?;
            encoder.set_repeat(Repeat::Infinite)?;

            for (index, image) in images.iter().enumerate() {
                if image.width != w || image.height != h {
                    return Err(EncodeError::DimensionMismatch { index, width: w, height: h });
                }
                let frame = match &image.pixels {
                    FramePixels::Rgba(data) => {
                        if data.len() != image.pixel_count() * 4 {
                            return Err(EncodeError::DimensionMismatch { index, width: w, height: h });
                        }
                        let mut rgba = data.clone();
                        let mut frame = Frame::from_rgba_speed(w16, h16, &mut rgba, self.speed);
                        frame.delay = delay;
                        frame
                    }
                    FramePixels::Indexed { palette, indices } => {
                        if indices.len() != image.pixel_count() {
                            return Err(EncodeError::DimensionMismatch { index, width: w, height: h });
                        }
                        Frame {
                            width:   w16,
                            height:  h16,
                            delay,
                            palette: Some(palette.clone()),
                            buffer:  Cow::Borrowed(indices.as_slice()),
                            ..Frame::default()
                        }
                    }
                };
                encoder.write_frame(&frame)?;
            }

            let mut out = encoder.into_inner()?;
            out.flush()?;
        }

        tmp.persist(dest).map_err(|e| EncodeError::Io(e.error))?;
        log::info!("[gif] wrote {} frames {}x{} delay={}cs to {}", images.len(), w, h, delay, dest.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn decode(path: &Path) -> Vec<(u16, u16, u16)> {
        let mut opts = gif::DecodeOptions::new();
        opts.set_color_output(gif::ColorOutput::Indexed);
        let mut dec = opts.read_info(File::open(path).unwrap()).unwrap();
        let mut frames = Vec::new();
        while let Some(f) = dec.read_next_frame().unwrap() {
            frames.push((f.width, f.height, f.delay));
        }
        frames
    }

    fn indexed(tag: u8) -> Arc<EncodedImage> {
        Arc::new(EncodedImage::indexed(2, 2, vec![0, 0, 0, tag, tag, tag], vec![0, 1, 1, 0]))
    }

    #[test]
    fn writes_every_frame_with_shared_delay() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.gif");
        let images: Vec<_> = (0..5).map(|i| indexed(i * 40)).collect();

        GifEncoder::default().encode(&images, 100.0, &dest).unwrap();

        let frames = decode(&dest);
        assert_eq!(frames.len(), 5);
        assert!(frames.iter().all(|&f| f == (2, 2, 10)));
    }

    #[test]
    fn rgba_frames_are_quantized_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("rgba.gif");
        let px: Vec<u8> = (0..16).flat_map(|i| [i * 10, 255 - i * 10, 7, 255]).collect();
        let images = vec![Arc::new(EncodedImage::rgba(4, 4, px))];

        GifEncoder::default().encode(&images, 41.7, &dest).unwrap();
        assert_eq!(decode(&dest), vec![(4, 4, 4)]);
    }

    #[test]
    fn empty_list_is_refused_and_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("none.gif");
        assert!(matches!(GifEncoder::default().encode(&[], 100.0, &dest), Err(EncodeError::Empty)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn mismatched_frame_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("bad.gif");
        let odd = Arc::new(EncodedImage::indexed(3, 1, vec![0, 0, 0], vec![0, 0, 0]));
        let res = GifEncoder::default().encode(&[indexed(1), odd], 100.0, &dest);
        assert!(matches!(res, Err(EncodeError::DimensionMismatch { index: 1, .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
