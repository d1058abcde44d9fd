// crates/gifconv-media/tests/pipeline.rs
//
// End-to-end runs of JobController over a synthetic frame source. The real
// worker pool, reassembler and GIF encoder are used; only decoding is faked.
// Frame i is filled with red = i so order can be read back from the pixels.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tempfile::TempDir;

use gifconv_core::job::{JobSpec, QuantizeMethod};
use gifconv_media::{
    EncodedImage, FrameProcessor, FrameSource, GifEncoder, ImageProcessor, JobController,
    Pipeline, ProcessParams, RawFrame, SourceError, SourceOpener, StreamInfo,
};

const WAIT: Duration = Duration::from_secs(30);

struct Synthetic {
    info:   StreamInfo,
    frames: usize,
    next:   usize,
}

impl FrameSource for Synthetic {
    fn info(&self) -> StreamInfo { self.info }

    fn read(&mut self) -> Option<RawFrame> {
        if self.next == self.frames {
            return None;
        }
        let tag = self.next as u8;
        self.next += 1;
        let (w, h) = (self.info.width, self.info.height);
        let data = (0..w * h).flat_map(|_| [tag, 255 - tag, 40, 255]).collect();
        Some(RawFrame { width: w, height: h, data })
    }
}

#[derive(Clone, Copy)]
struct SyntheticOpener {
    width:    u32,
    height:   u32,
    fps:      f64,
    frames:   usize,
    declared: Option<u64>,
}

impl SyntheticOpener {
    fn new(frames: usize, fps: f64) -> Self {
        Self { width: 8, height: 6, fps, frames, declared: Some(frames as u64) }
    }
}

impl SourceOpener for SyntheticOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameSource>, SourceError> {
        if !path.is_file() {
            return Err(SourceError::NotFound(path.display().to_string()));
        }
        let info = StreamInfo {
            width:           self.width,
            height:          self.height,
            frame_rate:      self.fps,
            declared_frames: self.declared,
        };
        Ok(Box::new(Synthetic { info, frames: self.frames, next: 0 }))
    }
}

/// Blocks every frame until the gate sender is dropped.
struct Gated {
    gate: Receiver<()>,
}

impl FrameProcessor for Gated {
    fn process(&self, frame: RawFrame, params: &ProcessParams) -> anyhow::Result<EncodedImage> {
        let _ = self.gate.recv();
        ImageProcessor.process(frame, params)
    }
}

/// Fails the first frame at once, sleeps on the rest and counts them.
struct FailFirstThenSlow {
    done: Arc<AtomicUsize>,
}

impl FrameProcessor for FailFirstThenSlow {
    fn process(&self, frame: RawFrame, params: &ProcessParams) -> anyhow::Result<EncodedImage> {
        if frame.data[0] == 0 {
            anyhow::bail!("synthetic failure");
        }
        std::thread::sleep(Duration::from_millis(100));
        self.done.fetch_add(1, Ordering::SeqCst);
        ImageProcessor.process(frame, params)
    }
}

/// Fails on the frame whose red channel is 3.
struct FailsOnThree;

impl FrameProcessor for FailsOnThree {
    fn process(&self, frame: RawFrame, params: &ProcessParams) -> anyhow::Result<EncodedImage> {
        if frame.data[0] == 3 {
            anyhow::bail!("synthetic failure");
        }
        ImageProcessor.process(frame, params)
    }
}

fn pipeline(opener: SyntheticOpener) -> Pipeline {
    Pipeline {
        opener:    Arc::new(opener),
        processor: Arc::new(ImageProcessor),
        encoder:   Arc::new(GifEncoder::default()),
    }
}

struct Workspace {
    dir:   TempDir,
    input: PathBuf,
}

fn workspace() -> Workspace {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clip.mp4");
    std::fs::write(&input, b"synthetic").unwrap();
    Workspace { dir, input }
}

struct Outcome {
    ok:     bool,
    path:   PathBuf,
    ready:  Option<(Vec<Arc<EncodedImage>>, f64)>,
    extra_finishes: usize,
}

type Channels = (Receiver<(Vec<Arc<EncodedImage>>, f64)>, Receiver<(bool, PathBuf)>);

fn start(ctrl: &JobController, spec: JobSpec) -> Option<Channels> {
    let (ready_tx, ready_rx) = unbounded();
    let (fin_tx, fin_rx): (Sender<(bool, PathBuf)>, _) = unbounded();
    let started = ctrl.start(
        spec,
        move |images, ms| { let _ = ready_tx.send((images.to_vec(), ms)); },
        move |ok, path| { let _ = fin_tx.send((ok, path)); },
    );
    started.then_some((ready_rx, fin_rx))
}

fn wait((ready_rx, fin_rx): Channels) -> Outcome {
    let (ok, path) = fin_rx.recv_timeout(WAIT).expect("finished callback");
    let extra_finishes = fin_rx.iter().count();
    Outcome { ok, path, ready: ready_rx.try_recv().ok(), extra_finishes }
}

fn run(ctrl: &JobController, spec: JobSpec) -> Outcome {
    wait(start(ctrl, spec).expect("job should start"))
}

fn reds(images: &[Arc<EncodedImage>]) -> Vec<u8> {
    images.iter().map(|i| i.to_rgba()[0]).collect()
}

#[test]
fn ten_frames_at_ten_fps() {
    let ws = workspace();
    let ctrl = JobController::new(pipeline(SyntheticOpener::new(10, 10.0)));
    let out_path = ws.dir.path().join("out.gif");
    let spec = JobSpec::new(&ws.input, &out_path)
        .with_quantize(QuantizeMethod::None, 0)
        .with_workers(4);

    let out = run(&ctrl, spec);

    assert!(out.ok);
    assert_eq!(out.path, out_path);
    assert_eq!(out.extra_finishes, 0);
    assert!(out_path.is_file());

    let (images, ms) = out.ready.expect("sequence-ready callback");
    assert_eq!(reds(&images), (0..10).collect::<Vec<u8>>());
    assert!((ms - 100.0).abs() < 1e-9);
    assert!(ctrl.preview().has_sequence());
}

#[test]
fn many_workers_preserve_order() {
    let ws = workspace();
    let ctrl = JobController::new(pipeline(SyntheticOpener::new(120, 25.0)));
    let spec = JobSpec::new(&ws.input, ws.dir.path())
        .with_quantize(QuantizeMethod::MedianCut, 1)
        .with_workers(8);

    let out = run(&ctrl, spec);
    assert!(out.ok);
    assert_eq!(out.path, ws.dir.path().join("clip.gif"));
    let (images, _) = out.ready.unwrap();
    assert_eq!(reds(&images), (0..120).collect::<Vec<u8>>());
}

#[test]
fn duration_follows_rate_and_speed() {
    let ws = workspace();
    let ctrl = JobController::new(pipeline(SyntheticOpener::new(3, 24.0)));
    let spec = JobSpec::new(&ws.input, "").with_playback_speed(2.0);

    let (_, ms) = run(&ctrl, spec).ready.unwrap();
    assert!((ms - 1000.0 / 48.0).abs() < 1e-9);
}

#[test]
fn zero_workers_matches_one_worker() {
    let ws = workspace();
    let ctrl = JobController::new(pipeline(SyntheticOpener::new(12, 15.0)));
    let spec = |name: &str, workers: usize| {
        JobSpec::new(&ws.input, ws.dir.path().join(name))
            .with_quantize(QuantizeMethod::NeuQuant, 0)
            .with_workers(workers)
    };

    let zero = run(&ctrl, spec("a.gif", 0)).ready.unwrap();
    let one  = run(&ctrl, spec("b.gif", 1)).ready.unwrap();

    let pixels = |imgs: &[Arc<EncodedImage>]| imgs.iter().map(|i| (**i).clone()).collect::<Vec<_>>();
    assert_eq!(pixels(&zero.0), pixels(&one.0));
    assert_eq!(zero.1, one.1);
}

#[test]
fn unit_resize_keeps_source_size() {
    let ws = workspace();
    let ctrl = JobController::new(pipeline(SyntheticOpener::new(2, 10.0)));

    let (same, _) = run(&ctrl, JobSpec::new(&ws.input, "")).ready.unwrap();
    assert!(same.iter().all(|i| (i.width, i.height) == (8, 6)));

    let (half, _) = run(&ctrl, JobSpec::new(&ws.input, "").with_resize(0.5)).ready.unwrap();
    assert!(half.iter().all(|i| (i.width, i.height) == (4, 3)));
}

#[test]
fn second_start_is_refused_while_running() {
    let ws = workspace();
    let (gate_tx, gate_rx) = unbounded::<()>();
    let ctrl = Arc::new(JobController::new(Pipeline {
        processor: Arc::new(Gated { gate: gate_rx }),
        ..pipeline(SyntheticOpener::new(4, 10.0))
    }));

    let (fin_tx, fin_rx) = unbounded();
    let watcher = Arc::clone(&ctrl);
    assert!(ctrl.start(
        JobSpec::new(&ws.input, ""),
        |_, _| {},
        move |ok, _| { let _ = fin_tx.send((ok, watcher.is_ready())); },
    ));
    assert!(!ctrl.is_ready());

    let (late_tx, late_rx) = unbounded::<()>();
    let late_tx2 = late_tx.clone();
    assert!(!ctrl.start(
        JobSpec::new(&ws.input, ""),
        move |_, _| { let _ = late_tx.send(()); },
        move |_, _| { let _ = late_tx2.send(()); },
    ));

    drop(gate_tx);
    let (ok, ready_in_callback) = fin_rx.recv_timeout(WAIT).unwrap();
    assert!(ok);
    assert!(ready_in_callback);
    assert!(late_rx.recv_timeout(Duration::from_millis(100)).is_err());

    assert!(ctrl.is_ready());
    let again = start(&ctrl, JobSpec::new(&ws.input, "")).expect("slot free again");
    assert!(wait(again).ok);
}

#[test]
fn missing_input_is_rejected_without_callbacks() {
    let ws = workspace();
    let ctrl = JobController::new(pipeline(SyntheticOpener::new(2, 10.0)));
    let spec = JobSpec::new(ws.dir.path().join("nope.mp4"), "");

    assert!(start(&ctrl, spec).is_none());
    assert!(ctrl.is_ready());
}

#[test]
fn truncated_stream_uses_frames_actually_read() {
    let ws = workspace();
    let opener = SyntheticOpener { declared: Some(50), ..SyntheticOpener::new(7, 10.0) };
    let ctrl = JobController::new(pipeline(opener));

    let out = run(&ctrl, JobSpec::new(&ws.input, "").with_workers(3));
    assert!(out.ok);
    assert_eq!(out.ready.unwrap().0.len(), 7);
}

#[test]
fn processing_failure_fails_the_job() {
    let ws = workspace();
    let ctrl = JobController::new(Pipeline {
        processor: Arc::new(FailsOnThree),
        ..pipeline(SyntheticOpener::new(6, 10.0))
    });
    let dest = ws.dir.path().join("out.gif");

    let out = run(&ctrl, JobSpec::new(&ws.input, &dest).with_workers(2));
    assert!(!out.ok);
    assert_eq!(out.path, dest);
    assert!(out.ready.is_none());
    assert_eq!(out.extra_finishes, 0);
    assert!(!dest.exists());
    assert!(!ctrl.preview().has_sequence());
    assert!(ctrl.is_ready());
}

#[test]
fn zero_frame_rate_fails_the_job() {
    let ws = workspace();
    let ctrl = JobController::new(pipeline(SyntheticOpener::new(3, 0.0)));
    let out = run(&ctrl, JobSpec::new(&ws.input, ""));
    assert!(!out.ok);
    assert!(out.ready.is_none());
}

#[test]
fn empty_source_fails_at_encode() {
    let ws = workspace();
    let ctrl = JobController::new(pipeline(SyntheticOpener::new(0, 10.0)));
    let out = run(&ctrl, JobSpec::new(&ws.input, ""));
    assert!(!out.ok);
    assert!(ctrl.is_ready());
}

#[test]
fn failed_job_stops_its_workers_before_finishing() {
    let ws = workspace();
    let done = Arc::new(AtomicUsize::new(0));
    let ctrl = Arc::new(JobController::new(Pipeline {
        processor: Arc::new(FailFirstThenSlow { done: Arc::clone(&done) }),
        ..pipeline(SyntheticOpener::new(8, 10.0))
    }));

    let (fin_tx, fin_rx) = unbounded();
    let watcher = Arc::clone(&ctrl);
    let counter = Arc::clone(&done);
    assert!(ctrl.start(
        JobSpec::new(&ws.input, "").with_workers(1),
        |_, _| {},
        move |ok, _| {
            let _ = fin_tx.send((ok, watcher.is_ready(), counter.load(Ordering::SeqCst)));
        },
    ));

    let (ok, ready, at_finish) = fin_rx.recv_timeout(WAIT).unwrap();
    assert!(!ok);
    assert!(ready);
    assert!(at_finish < 7, "queued frames were processed: {at_finish}");

    std::thread::sleep(Duration::from_millis(500));
    assert_eq!(done.load(Ordering::SeqCst), at_finish);
}
