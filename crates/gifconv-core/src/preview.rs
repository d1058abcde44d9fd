// crates/gifconv-core/src/preview.rs
//
// PreviewBuffer: hand-off point between the job thread (publish) and the UI
// repaint loop (tick).
//
// The sequence and its cursor sit behind one mutex so a tick can never pair
// the cursor of one sequence with the images of another. The UI side only
// ever uses try_lock: a contended tick returns None and the caller reschedules
// instead of stalling the frame. publish() may block briefly; it runs once
// per finished job on the job thread.

use std::sync::Arc;
use parking_lot::Mutex;

use crate::media_types::Sequence;

/// What one successful tick hands to the renderer.
#[derive(Debug)]
pub struct PreviewTick<T> {
    pub image:       Arc<T>,
    /// Position of `image` in its sequence.
    pub index:       usize,
    pub duration_ms: f64,
}

struct PreviewState<T> {
    sequence: Option<Sequence<T>>,
    cursor:   usize,
}

pub struct PreviewBuffer<T> {
    state: Mutex<PreviewState<T>>,
}

impl<T> Default for PreviewBuffer<T> {
    fn default() -> Self { Self::new() }
}

impl<T> PreviewBuffer<T> {
    pub fn new() -> Self {
        Self { state: Mutex::new(PreviewState { sequence: None, cursor: 0 }) }
    }

    /// Replace the held sequence and restart from its first image.
    /// An empty `images` list clears the preview.
    pub fn publish(&self, images: Vec<Arc<T>>, duration_ms: f64) {
        self.publish_sequence(Sequence { images, duration_ms });
    }

    pub fn publish_sequence(&self, sequence: Sequence<T>) {
        let len = sequence.len();
        let mut state = self.state.lock();
        state.sequence = if sequence.is_empty() { None } else { Some(sequence) };
        state.cursor = 0;
        drop(state);
        log::debug!("[preview] published {len} frames");
    }

    /// Return the image under the cursor and advance it, wrapping after the
    /// last frame. `None` when nothing is published yet or when the publisher
    /// currently holds the lock; never waits.
    pub fn tick(&self) -> Option<PreviewTick<T>> {
        let mut state = self.state.try_lock()?;
        let PreviewState { sequence, cursor } = &mut *state;
        let seq = sequence.as_ref()?;
        let index = *cursor;
        let tick = PreviewTick {
            image:       Arc::clone(&seq.images[index]),
            index,
            duration_ms: seq.duration_ms,
        };
        *cursor = (index + 1) % seq.images.len();
        Some(tick)
    }

    /// Whether a sequence is currently held. Non-blocking; reports `false`
    /// under contention.
    pub fn has_sequence(&self) -> bool {
        self.state.try_lock().map(|s| s.sequence.is_some()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn arcs(values: &[u32]) -> Vec<Arc<u32>> {
        values.iter().copied().map(Arc::new).collect()
    }

    #[test]
    fn tick_before_publish_is_none() {
        let buf: PreviewBuffer<u32> = PreviewBuffer::new();
        assert!(buf.tick().is_none());
        assert!(!buf.has_sequence());
    }

    #[test]
    fn tick_cycles_and_wraps() {
        let buf = PreviewBuffer::new();
        buf.publish(arcs(&[7, 8, 9]), 40.0);
        let seen: Vec<u32> = (0..7).map(|_| *buf.tick().unwrap().image).collect();
        assert_eq!(seen, vec![7, 8, 9, 7, 8, 9, 7]);
    }

    #[test]
    fn publish_resets_cursor() {
        let buf = PreviewBuffer::new();
        buf.publish(arcs(&[1, 2, 3]), 10.0);
        buf.tick();
        buf.tick();
        buf.publish(arcs(&[4, 5]), 20.0);
        let t = buf.tick().unwrap();
        assert_eq!((*t.image, t.index, t.duration_ms), (4, 0, 20.0));
    }

    #[test]
    fn empty_publish_clears() {
        let buf = PreviewBuffer::new();
        buf.publish(arcs(&[1]), 10.0);
        buf.publish(Vec::new(), 10.0);
        assert!(buf.tick().is_none());
    }

    #[test]
    fn contended_tick_returns_immediately() {
        let buf = PreviewBuffer::new();
        buf.publish(arcs(&[1, 2]), 10.0);
        let _held = buf.state.lock();
        let started = Instant::now();
        assert!(buf.tick().is_none());
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn concurrent_publish_never_mixes_sequences() {
        // Every image of generation g carries g, and so does the duration.
        let buf = Arc::new(PreviewBuffer::new());
        let writer = {
            let buf = Arc::clone(&buf);
            std::thread::spawn(move || {
                for g in 1..=500u32 {
                    let len = (g % 5 + 1) as usize;
                    buf.publish(arcs(&vec![g; len]), g as f64);
                }
            })
        };
        let mut hits = 0;
        while !writer.is_finished() || hits == 0 {
            if let Some(t) = buf.tick() {
                assert_eq!(*t.image as f64, t.duration_ms);
                assert!(t.index < (*t.image % 5 + 1) as usize);
                hits += 1;
            }
        }
        writer.join().unwrap();
    }
}
