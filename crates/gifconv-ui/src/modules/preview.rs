// crates/gifconv-ui/src/modules/preview.rs
//
// Animates the last exported sequence by ticking the shared PreviewBuffer
// from the repaint loop. A tick is attempted only when the previous image's
// display time has elapsed. If the buffer is empty or the job thread is
// publishing, tick() returns None and the panel tries again after RETRY.

use std::time::{Duration, Instant};

use egui::{Color32, RichText, TextureHandle, TextureOptions, Ui};

use gifconv_core::commands::FormCommand;
use gifconv_core::media_types::EncodedImage;
use gifconv_core::preview::PreviewBuffer;

use super::{Panel, PanelView};
use crate::theme::{CANVAS_BG, HEADER_BG, TEXT_DIM};

/// Poll interval while nothing can be shown.
const RETRY: Duration = Duration::from_millis(33);

pub struct PreviewPanel {
    texture:   Option<TextureHandle>,
    /// Sequence index of the uploaded image.
    shown:     Option<usize>,
    next_tick: Option<Instant>,
}

impl PreviewPanel {
    pub fn new() -> Self {
        Self { texture: None, shown: None, next_tick: None }
    }

    /// Advance the animation if due and return how long until the next tick.
    fn advance(&mut self, ctx: &egui::Context, buffer: &PreviewBuffer<EncodedImage>, now: Instant) -> Duration {
        if let Some(next) = self.next_tick {
            if now < next {
                return next - now;
            }
        }
        let delay = match buffer.tick() {
            Some(tick) => {
                self.upload(ctx, &tick.image);
                self.shown = Some(tick.index);
                frame_delay(tick.duration_ms)
            }
            None => RETRY,
        };
        self.next_tick = Some(now + delay);
        delay
    }

    fn upload(&mut self, ctx: &egui::Context, image: &EncodedImage) {
        let size = [image.width as usize, image.height as usize];
        let color = egui::ColorImage::from_rgba_unmultiplied(size, &image.to_rgba());
        match &mut self.texture {
            Some(tex) => tex.set(color, TextureOptions::LINEAR),
            None => self.texture = Some(ctx.load_texture("gif_preview", color, TextureOptions::LINEAR)),
        }
    }
}

/// Display time of one frame; never zero so the repaint loop cannot spin.
fn frame_delay(duration_ms: f64) -> Duration {
    Duration::from_secs_f64((duration_ms / 1000.0).max(0.001).min(60.0))
}

impl Panel for PreviewPanel {
    fn name(&self) -> &str { "▶ Preview" }

    fn ui(&mut self, ui: &mut Ui, view: &PanelView<'_>, _cmd: &mut Vec<FormCommand>) {
        let wait = self.advance(ui.ctx(), view.preview, Instant::now());
        ui.ctx().request_repaint_after(wait);

        egui::Frame::new()
            .fill(HEADER_BG)
            .inner_margin(egui::Margin { left: 8, right: 8, top: 6, bottom: 6 })
            .show(ui, |ui| {
                ui.label(RichText::new(self.name()).size(12.0).strong());
            });

        egui::Frame::new()
            .fill(CANVAS_BG)
            .inner_margin(egui::Margin::same(8))
            .show(ui, |ui| {
                ui.set_min_size(ui.available_size());
                ui.centered_and_justified(|ui| match &self.texture {
                    Some(tex) => {
                        ui.add(
                            egui::Image::new(tex)
                                .max_size(ui.available_size())
                                .maintain_aspect_ratio(true),
                        );
                    }
                    None => {
                        ui.label(
                            RichText::new("Converted frames play here")
                                .size(13.0)
                                .color(TEXT_DIM),
                        );
                    }
                });
            });

        if let Some(index) = self.shown {
            ui.label(RichText::new(format!("frame {index}")).size(10.0).color(Color32::GRAY));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_delay_follows_duration() {
        assert_eq!(frame_delay(100.0), Duration::from_millis(100));
        assert_eq!(frame_delay(0.0), Duration::from_millis(1));
        assert_eq!(frame_delay(f64::NAN), Duration::from_millis(1));
    }

    #[test]
    fn empty_buffer_retries_after_interval() {
        let ctx = egui::Context::default();
        let buffer = PreviewBuffer::<EncodedImage>::new();
        let mut panel = PreviewPanel::new();
        let now = Instant::now();
        assert_eq!(panel.advance(&ctx, &buffer, now), RETRY);
        // Not due yet: no tick, just the remaining wait.
        assert_eq!(panel.advance(&ctx, &buffer, now + Duration::from_millis(10)), Duration::from_millis(23));
        assert!(panel.texture.is_none());
    }

    #[test]
    fn published_sequence_is_uploaded_and_cycles() {
        let ctx = egui::Context::default();
        let buffer = PreviewBuffer::new();
        let images = (0..2).map(|i| std::sync::Arc::new(EncodedImage::rgba(1, 1, vec![i, 0, 0, 255]))).collect();
        buffer.publish(images, 50.0);

        let mut panel = PreviewPanel::new();
        let t0 = Instant::now();
        assert_eq!(panel.advance(&ctx, &buffer, t0), Duration::from_millis(50));
        assert_eq!(panel.shown, Some(0));
        panel.advance(&ctx, &buffer, t0 + Duration::from_millis(50));
        assert_eq!(panel.shown, Some(1));
        panel.advance(&ctx, &buffer, t0 + Duration::from_millis(100));
        assert_eq!(panel.shown, Some(0));
        assert!(panel.texture.is_some());
    }
}
