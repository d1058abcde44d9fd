// crates/gifconv-media/src/job.rs
//
// JobController: the single export slot.
//
// Lifecycle of one job:
//   try_start (caller thread)  validate → Idle→Running → spawn "gif-job"
//   job thread                 open source → pool → reassemble → encode
//                              → publish preview → on_ready
//                              → slot back to Idle → on_finished
//
// The slot is released before on_finished runs, so a caller reacting to the
// finished callback always sees is_ready() == true and may start the next
// export from inside it. Worker threads are always joined before that, on
// failure too. A panic anywhere in the pipeline is caught and reported as
// success = false; on_finished fires exactly once either way.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::unbounded;
use parking_lot::Mutex;

use gifconv_core::error::StartError;
use gifconv_core::helpers::timing::frame_duration_ms;
use gifconv_core::job::{JobSpec, JobState};
use gifconv_core::media_types::{EncodedImage, Sequence};
use gifconv_core::preview::PreviewBuffer;

use crate::decode::FfmpegOpener;
use crate::encode::{GifEncoder, SequenceEncoder};
use crate::error::JobError;
use crate::process::{FrameProcessor, ImageProcessor, ProcessParams};
use crate::reassemble::Reassembler;
use crate::source::{Frame, SourceOpener};
use crate::worker::{panic_message, WorkerPool};

/// The three swappable stages of an export.
#[derive(Clone)]
pub struct Pipeline {
    pub opener:    Arc<dyn SourceOpener>,
    pub processor: Arc<dyn FrameProcessor>,
    pub encoder:   Arc<dyn SequenceEncoder>,
}

impl Pipeline {
    /// ffmpeg decode, `image` resize, GIF encode.
    pub fn ffmpeg() -> anyhow::Result<Self> {
        Ok(Self {
            opener:    Arc::new(FfmpegOpener::new()?),
            processor: Arc::new(ImageProcessor),
            encoder:   Arc::new(GifEncoder::default()),
        })
    }
}

pub struct JobController {
    state:    Arc<Mutex<JobState>>,
    pipeline: Pipeline,
    preview:  Arc<PreviewBuffer<EncodedImage>>,
}

/// Puts the slot back to Idle when the job thread is done with it, including
/// when it unwinds.
struct SlotGuard(Arc<Mutex<JobState>>);

impl Drop for SlotGuard {
    fn drop(&mut self) {
        *self.0.lock() = JobState::Idle;
    }
}

impl JobController {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            state:   Arc::new(Mutex::new(JobState::Idle)),
            pipeline,
            preview: Arc::new(PreviewBuffer::new()),
        }
    }

    /// Buffer the UI ticks to animate the last successful export.
    pub fn preview(&self) -> Arc<PreviewBuffer<EncodedImage>> {
        Arc::clone(&self.preview)
    }

    pub fn is_ready(&self) -> bool {
        *self.state.lock() == JobState::Idle
    }

    /// Boolean form of [`try_start`](Self::try_start): `false` for a busy
    /// slot, a validation failure or a failed spawn. No callback fires on `false`.
    pub fn start<R, F>(&self, spec: JobSpec, on_ready: R, on_finished: F) -> bool
    where
        R: FnOnce(&[Arc<EncodedImage>], f64) + Send + 'static,
        F: FnOnce(bool, PathBuf) + Send + 'static,
    {
        match self.try_start(spec, on_ready, on_finished) {
            Ok(_) => true,
            Err(e) => {
                log::warn!("[job] not started: {e}");
                false
            }
        }
    }

    /// Validate `spec`, claim the slot and run the export on its own thread.
    /// Returns the resolved destination path.
    ///
    /// `on_ready` runs on the job thread after the GIF is written and the
    /// preview published, with the images in frame order and the per-frame
    /// duration. `on_finished` runs last, exactly once, on the job thread.
    pub fn try_start<R, F>(&self, spec: JobSpec, on_ready: R, on_finished: F) -> Result<PathBuf, StartError>
    where
        R: FnOnce(&[Arc<EncodedImage>], f64) + Send + 'static,
        F: FnOnce(bool, PathBuf) + Send + 'static,
    {
        let mut state = self.state.lock();
        if *state != JobState::Idle {
            return Err(StartError::Busy);
        }
        let output = spec.validate()?;
        *state = JobState::Running;
        drop(state);

        let guard    = SlotGuard(Arc::clone(&self.state));
        let pipeline = self.pipeline.clone();
        let preview  = Arc::clone(&self.preview);
        let dest     = output.clone();

        let spawned = thread::Builder::new()
            .name("gif-job".into())
            .spawn(move || {
                let tag = short_id(&spec);
                log::info!("[job {tag}] {} -> {}", spec.input.display(), dest.display());

                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    run_job(&spec, &dest, &pipeline, &preview, on_ready)
                }))
                .unwrap_or_else(|panic| Err(JobError::Panicked(panic_message(&panic))));

                let ok = match outcome {
                    Ok(()) => {
                        log::info!("[job {tag}] done");
                        true
                    }
                    Err(e) => {
                        log::error!("[job {tag}] failed: {e}");
                        false
                    }
                };
                drop(guard);
                on_finished(ok, dest);
            });

        match spawned {
            Ok(_) => Ok(output),
            // The unrun closure was dropped with its guard, so the slot is Idle again.
            Err(e) => Err(StartError::Spawn(e.to_string())),
        }
    }
}

fn short_id(spec: &JobSpec) -> String {
    spec.job_id.simple().to_string()[..8].to_owned()
}

fn run_job<R>(
    spec:     &JobSpec,
    dest:     &std::path::Path,
    pipeline: &Pipeline,
    preview:  &PreviewBuffer<EncodedImage>,
    on_ready: R,
) -> Result<(), JobError>
where
    R: FnOnce(&[Arc<EncodedImage>], f64),
{
    let tag = short_id(spec);
    let mut source = pipeline.opener.open(&spec.input)?;
    let info = source.info();

    let params = ProcessParams {
        target:        spec.target_size(info.width, info.height),
        method:        spec.quantize,
        cluster_count: spec.cluster_count,
    };
    log::debug!(
        "[job {tag}] {}x{} @ {:.3} fps, target {:?}, {:?}/{} clusters, {} workers",
        info.width, info.height, info.frame_rate, params.target,
        params.method, params.cluster_count, spec.workers(),
    );

    let (result_tx, result_rx) = unbounded();
    let mut pool = WorkerPool::spawn(spec.workers(), Arc::clone(&pipeline.processor), params, result_tx)?;

    let mut index = 0usize;
    while let Some(raw) = source.read() {
        if !pool.submit(Frame { index, raw }) {
            return Err(JobError::PoolClosed);
        }
        index += 1;
    }
    drop(source);

    let expected = pool.close();
    if let Some(declared) = info.declared_frames {
        if declared != expected as u64 {
            log::warn!("[job {tag}] container declares {declared} frames, read {expected}");
        }
    }

    // The pool is joined on both paths, so no worker outlives the job.
    let images = match Reassembler::new(expected).collect(&result_rx) {
        Ok(images) => {
            pool.join();
            images
        }
        Err(e) => {
            pool.abort();
            return Err(e.into());
        }
    };

    let duration_ms = frame_duration_ms(info.frame_rate, spec.playback_speed)?;
    let sequence = Sequence::new(images, duration_ms);
    pipeline.encoder.encode(sequence.images.as_slice(), duration_ms, dest)?;

    preview.publish_sequence(sequence.clone());
    on_ready(sequence.images.as_slice(), duration_ms);
    Ok(())
}
