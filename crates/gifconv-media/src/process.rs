// crates/gifconv-media/src/process.rs
//
// Per-frame work done inside the pool: optional resize, then palette
// reduction. Stateless: every call depends only on its arguments, so any
// worker can take any frame.

use anyhow::Context as _;
use image::imageops::{self, FilterType};
use image::RgbaImage;

use gifconv_core::job::QuantizeMethod;
use gifconv_core::media_types::EncodedImage;

use crate::quantize::quantize;
use crate::source::RawFrame;

/// Parameters shared by every frame of one job.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProcessParams {
    /// Output size, or `None` to keep the source size untouched.
    pub target:        Option<(u32, u32)>,
    pub method:        QuantizeMethod,
    pub cluster_count: u32,
}

pub trait FrameProcessor: Send + Sync {
    fn process(&self, frame: RawFrame, params: &ProcessParams) -> anyhow::Result<EncodedImage>;
}

/// Resize with `image` (triangle filter, close to area averaging when
/// shrinking) and quantize with `crate::quantize`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageProcessor;

impl FrameProcessor for ImageProcessor {
    fn process(&self, frame: RawFrame, params: &ProcessParams) -> anyhow::Result<EncodedImage> {
        let RawFrame { width, height, data } = frame;
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            anyhow::bail!("frame buffer is {} bytes, expected {expected} for {width}x{height}", data.len());
        }

        let (width, height, rgba) = match params.target {
            Some((tw, th)) if (tw, th) != (width, height) => {
                let img = RgbaImage::from_raw(width, height, data)
                    .context("wrapping frame buffer")?;
                let scaled = imageops::resize(&img, tw, th, FilterType::Triangle);
                (tw, th, scaled.into_raw())
            }
            _ => (width, height, data),
        };

        Ok(match quantize(&rgba, params.method, params.cluster_count) {
            Some((palette, indices)) => EncodedImage::indexed(width, height, palette, indices),
            None                     => EncodedImage::rgba(width, height, rgba),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gifconv_core::media_types::FramePixels;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RawFrame {
        let data = (0..width * height).flat_map(|_| [rgb[0], rgb[1], rgb[2], 255]).collect();
        RawFrame { width, height, data }
    }

    #[test]
    fn no_target_keeps_size_and_pixels() {
        let params = ProcessParams { target: None, method: QuantizeMethod::None, cluster_count: 0 };
        let frame = solid(8, 4, [1, 2, 3]);
        let out = ImageProcessor.process(frame.clone(), &params).unwrap();
        assert_eq!((out.width, out.height), (8, 4));
        assert_eq!(out.pixels, FramePixels::Rgba(frame.data));
    }

    #[test]
    fn target_resizes() {
        let params = ProcessParams { target: Some((4, 2)), method: QuantizeMethod::MedianCut, cluster_count: 0 };
        let out = ImageProcessor.process(solid(8, 4, [9, 9, 9]), &params).unwrap();
        assert_eq!((out.width, out.height), (4, 2));
        match out.pixels {
            FramePixels::Indexed { palette, indices } => {
                assert_eq!(palette, vec![9, 9, 9]);
                assert_eq!(indices, vec![0; 8]);
            }
            other => panic!("expected indexed pixels, got {other:?}"),
        }
    }

    #[test]
    fn short_buffer_is_an_error() {
        let params = ProcessParams { target: None, method: QuantizeMethod::None, cluster_count: 0 };
        let frame = RawFrame { width: 4, height: 4, data: vec![0; 10] };
        assert!(ImageProcessor.process(frame, &params).is_err());
    }
}
