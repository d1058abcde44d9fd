// crates/gifconv-core/src/media_types.rs
//
// Image types that flow from the worker pool to the encoder and the preview.
// No ffmpeg, no egui. Plain data only.

use std::sync::Arc;

/// Pixel payload of one processed frame.
#[derive(Clone, Debug, PartialEq)]
pub enum FramePixels {
    /// Packed RGBA, `width * height * 4` bytes. Produced when quantization is off.
    Rgba(Vec<u8>),
    /// Palette of packed RGB triples (≤ 256 entries) plus one index per pixel.
    Indexed { palette: Vec<u8>, indices: Vec<u8> },
}

/// One frame after resize + quantization, ready for the encoder.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedImage {
    pub width:  u32,
    pub height: u32,
    pub pixels: FramePixels,
}

impl EncodedImage {
    pub fn rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { width, height, pixels: FramePixels::Rgba(data) }
    }

    pub fn indexed(width: u32, height: u32, palette: Vec<u8>, indices: Vec<u8>) -> Self {
        Self { width, height, pixels: FramePixels::Indexed { palette, indices } }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Expand to packed RGBA for display. Indices outside the palette render
    /// as opaque black.
    pub fn to_rgba(&self) -> Vec<u8> {
        match &self.pixels {
            FramePixels::Rgba(data) => data.clone(),
            FramePixels::Indexed { palette, indices } => {
                let mut out = Vec::with_capacity(indices.len() * 4);
                for &i in indices {
                    let base = i as usize * 3;
                    match palette.get(base..base + 3) {
                        Some(rgb) => out.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]),
                        None      => out.extend_from_slice(&[0, 0, 0, 255]),
                    }
                }
                out
            }
        }
    }
}

/// The ordered output of one job: images in source order plus the single
/// per-frame display duration shared by all of them.
#[derive(Debug)]
pub struct Sequence<T> {
    pub images:      Vec<Arc<T>>,
    pub duration_ms: f64,
}

impl<T> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Self { images: self.images.clone(), duration_ms: self.duration_ms }
    }
}

impl<T> Sequence<T> {
    pub fn new(images: Vec<T>, duration_ms: f64) -> Self {
        Self { images: images.into_iter().map(Arc::new).collect(), duration_ms }
    }

    pub fn len(&self) -> usize { self.images.len() }
    pub fn is_empty(&self) -> bool { self.images.is_empty() }
}
