// crates/gifconv-media/src/worker.rs
//
// WorkerPool: a fixed set of threads pulling indexed frames off one bounded
// task channel and pushing indexed results onto a shared result channel.
//
// Shutdown protocol:
//   Every worker runs until it receives Task::EndOfWork. `close()` enqueues
//   exactly one sentinel per worker after the last real frame, so each worker
//   drains whatever is still queued ahead of its sentinel before exiting.
//   Dropping the pool without join() is the abort path: frames still queued
//   are discarded, every worker gets a fresh sentinel, and drop waits for
//   them. At most the frame each worker is holding finishes after that.
//
// Results:
//   Completion order is whatever the scheduler makes of it. The index travels
//   with every result; Reassembler restores order. A failing or panicking
//   frame is reported as an Err result for that index and the worker carries on
//   with the next task so the sentinel count still adds up.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};

use gifconv_core::media_types::EncodedImage;

use crate::error::ReassembleError;
use crate::process::{FrameProcessor, ProcessParams};
use crate::source::Frame;

/// Queued tasks per worker before `submit` blocks the producer.
const QUEUE_DEPTH_PER_WORKER: usize = 4;

pub enum Task {
    Frame(Frame),
    EndOfWork,
}

#[derive(Debug)]
pub struct ProcessedFrame {
    pub index: usize,
    pub image: EncodedImage,
}

/// What each worker sends back: the processed frame, or why it failed.
pub type WorkResult = Result<ProcessedFrame, ReassembleError>;

pub struct WorkerPool {
    task_tx:   Sender<Task>,
    /// Kept only to discard queued tasks on abort.
    task_rx:   Receiver<Task>,
    handles:   Vec<JoinHandle<()>>,
    submitted: usize,
    closed:    bool,
}

impl WorkerPool {
    /// Start `workers` threads (at least one). `result_tx` is moved in; once
    /// every worker has exited the result channel disconnects.
    pub fn spawn(
        workers:   usize,
        processor: Arc<dyn FrameProcessor>,
        params:    ProcessParams,
        result_tx: Sender<WorkResult>,
    ) -> std::io::Result<Self> {
        let workers = workers.max(1);
        let (task_tx, task_rx) = bounded::<Task>(workers * QUEUE_DEPTH_PER_WORKER);

        let mut pool = Self {
            task_tx,
            task_rx:   task_rx.clone(),
            handles:   Vec::with_capacity(workers),
            submitted: 0,
            closed:    false,
        };
        for n in 0..workers {
            let rx  = task_rx.clone();
            let tx  = result_tx.clone();
            let pro = Arc::clone(&processor);
            let handle = thread::Builder::new()
                .name(format!("gif-worker-{n}"))
                .spawn(move || worker_loop(n, rx, tx, pro, params))?;
            pool.handles.push(handle);
        }
        log::debug!("[worker] pool of {workers} started");
        Ok(pool)
    }

    pub fn workers(&self) -> usize {
        self.handles.len()
    }

    /// Queue one frame. Blocks while the queue is full. Returns `false` once
    /// the pool is closed.
    pub fn submit(&mut self, frame: Frame) -> bool {
        if self.closed {
            return false;
        }
        if self.task_tx.send(Task::Frame(frame)).is_err() {
            return false;
        }
        self.submitted += 1;
        true
    }

    /// Frames accepted so far, i.e. the number of results the collector must wait for.
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// Enqueue one EndOfWork per worker. Idempotent. Returns `submitted()`.
    pub fn close(&mut self) -> usize {
        if !self.closed {
            self.closed = true;
            for _ in 0..self.handles.len() {
                if self.task_tx.send(Task::EndOfWork).is_err() {
                    break;
                }
            }
        }
        self.submitted
    }

    /// Close (if not already) and wait for every worker to exit after it
    /// has drained the queue.
    pub fn join(mut self) {
        self.close();
        self.join_handles();
    }

    /// Discard queued frames, stop every worker and wait for them. Used when
    /// the job has already failed and the remaining results are not wanted.
    pub fn abort(mut self) {
        self.stop_now();
    }

    fn stop_now(&mut self) {
        if self.handles.is_empty() {
            return;
        }
        // Sentinels queued by close() are swallowed here too, so every worker
        // gets a new one. Workers that already exited leave theirs unread.
        let discarded = self.task_rx.try_iter()
            .filter(|t| matches!(t, Task::Frame(_)))
            .count();
        self.closed = true;
        for _ in 0..self.handles.len() {
            if self.task_tx.send(Task::EndOfWork).is_err() {
                break;
            }
        }
        if discarded > 0 {
            log::debug!("[worker] abort discarded {discarded} queued frames");
        }
        self.join_handles();
    }

    fn join_handles(&mut self) {
        for handle in self.handles.drain(..) {
            let name = handle.thread().name().unwrap_or("gif-worker").to_owned();
            if handle.join().is_err() {
                log::error!("[worker] {name} panicked outside frame processing");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop_now();
    }
}

fn worker_loop(
    n:         usize,
    rx:        Receiver<Task>,
    tx:        Sender<WorkResult>,
    processor: Arc<dyn FrameProcessor>,
    params:    ProcessParams,
) {
    let mut done = 0usize;
    loop {
        let frame = match rx.recv() {
            Ok(Task::Frame(frame)) => frame,
            Ok(Task::EndOfWork)    => break,
            Err(_) => {
                log::warn!("[worker {n}] task channel closed without a sentinel");
                break;
            }
        };
        let index = frame.index;
        let outcome = catch_unwind(AssertUnwindSafe(|| processor.process(frame.raw, &params)));
        let result = match outcome {
            Ok(Ok(image)) => Ok(ProcessedFrame { index, image }),
            Ok(Err(e))    => Err(ReassembleError::Processing { index, message: format!("{e:#}") }),
            Err(panic)    => Err(ReassembleError::Processing { index, message: panic_message(&panic) }),
        };
        // A closed result channel means the collector already gave up on this
        // job; keep draining tasks so the sentinel still reaches us.
        let _ = tx.send(result);
        done += 1;
    }
    log::trace!("[worker {n}] exit after {done} frames");
}

pub(crate) fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    panic.downcast_ref::<&str>().map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic".into())
}
