//! The worker loop and the logic trait it drives.
//!
//! A worker stands in for an out-of-process computation: it owns no
//! reference to the pad or pipeline that feeds it, communicates only
//! through bounded queues of already-serialized frames, and is run on a
//! dedicated OS thread wrapped in [`std::panic::catch_unwind`] so a panic
//! inside `sub_process_internal` cannot unwind into the host scheduler.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use derive_builder::Builder;
use sgn_core::Frame;
use tracing::{debug, trace, warn};

use crate::error::SubprocessError;
use crate::shm::ShmRegion;

/// Tunables shared by every subprocess element.
///
/// `timeout` bounds whichever blocking queue operation the element performs
/// synchronously from the host side: a transform's wait for its output
/// frame, or a sink's wait for queue space to apply backpressure.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct WorkerConfig {
    /// Bounded depth of both the in and out queues.
    pub queue_capacity: usize,
    /// How long a blocking queue operation waits before giving up.
    #[builder(default = "Duration::from_secs(5)")]
    pub timeout: Duration,
}

/// Flags a supervisor toggles to steer a running worker, and the worker
/// toggles back to report its own state.
#[derive(Default)]
pub struct WorkerFlags {
    /// Set by the supervisor to ask the worker to exit immediately,
    /// abandoning any queued input.
    pub process_stop: AtomicBool,
    /// Set by the supervisor to ask the worker to drain its input queue and
    /// then exit; no new work is refused, but no more is expected either.
    pub process_shutdown: AtomicBool,
    /// Set by the worker itself just before its thread function returns,
    /// by whatever path. Host-side `pull`/`transform` calls consult this to
    /// detect a worker that is gone.
    pub terminated: AtomicBool,
}

impl WorkerFlags {
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    pub fn request_stop(&self) {
        self.process_stop.store(true, Ordering::Release);
    }

    pub fn request_shutdown(&self) {
        self.process_shutdown.store(true, Ordering::Release);
    }
}

/// The read-only context handed to [`SubprocessLogic::sub_process_internal`].
///
/// Carries a snapshot of the shared-memory roster taken at worker spawn
/// time; the worker never sees the roster mutate underneath it mid-run.
pub struct WorkerContext {
    shm: Vec<Arc<ShmRegion>>,
}

impl WorkerContext {
    pub(crate) fn new(shm: Vec<Arc<ShmRegion>>) -> Self {
        Self { shm }
    }

    /// Look up a shared-memory region snapshotted for this worker by name.
    pub fn shm(&self, name: &str) -> Option<&ShmRegion> {
        self.shm.iter().find(|r| r.name() == name).map(Arc::as_ref)
    }
}

/// The out-of-process computation itself: plain data in, plain data out, no
/// access to pads, links, or the scheduler. Implementors describe a single
/// frame's worth of work; the worker loop supplies the queueing,
/// serialization, and fault containment around it.
pub trait SubprocessLogic: Send + 'static {
    /// Process one input frame. Transforms return `Some(frame)` to forward
    /// downstream; sinks return `None` having consumed the frame for effect.
    fn sub_process_internal(
        &self,
        ctx: &WorkerContext,
        frame: Frame,
    ) -> sgn_core::Result<Option<Frame>>;
}

/// Everything a host-side `pull`/`transform` implementation needs to talk
/// to its worker and learn whether it is still alive.
pub struct WorkerHandle {
    pub in_tx: Sender<Vec<u8>>,
    pub out_rx: Receiver<Vec<u8>>,
    pub flags: Arc<WorkerFlags>,
    pub failure: Arc<Mutex<Option<SubprocessError>>>,
    join: Mutex<Option<std::thread::JoinHandle<()>>>,
}

impl WorkerHandle {
    /// Spawn `logic` on a dedicated OS thread, wired to bounded in/out
    /// queues of `capacity` and a snapshot of `shm`.
    pub fn spawn<L: SubprocessLogic>(
        name: String,
        logic: L,
        capacity: usize,
        shm: Vec<Arc<ShmRegion>>,
    ) -> Self {
        let (in_tx, in_rx) = crossbeam_channel::bounded::<Vec<u8>>(capacity);
        let (out_tx, out_rx) = crossbeam_channel::bounded::<Vec<u8>>(capacity);
        let flags = Arc::new(WorkerFlags::default());
        let failure = Arc::new(Mutex::new(None));

        let worker_flags = Arc::clone(&flags);
        let worker_failure = Arc::clone(&failure);
        let join = std::thread::Builder::new()
            .name(format!("sgn-subprocess-{name}"))
            .spawn(move || run_worker(name, logic, in_rx, out_tx, worker_flags, worker_failure, shm))
            .expect("failed to spawn subprocess worker thread");

        Self {
            in_tx,
            out_rx,
            flags,
            failure,
            join: Mutex::new(Some(join)),
        }
    }

    /// Block until the worker thread exits, up to `timeout`. Returns `false`
    /// on timeout, leaving the thread detached (it cannot be force-killed:
    /// see `DESIGN.md`).
    pub fn join(&self, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            if self.flags.is_terminated() {
                break;
            }
            if std::time::Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        if let Some(handle) = self.join.lock().unwrap().take() {
            let _ = handle.join();
        }
        true
    }
}

/// Number of consecutive empty, timed-out polls of the input queue the
/// worker waits through after `process_shutdown` before concluding the queue
/// is truly drained and exiting.
const STOP_DRAIN_POLLS: u32 = 3;
const STOP_DRAIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

fn run_worker<L: SubprocessLogic>(
    name: String,
    logic: L,
    in_rx: Receiver<Vec<u8>>,
    out_tx: Sender<Vec<u8>>,
    flags: Arc<WorkerFlags>,
    failure: Arc<Mutex<Option<SubprocessError>>>,
    shm: Vec<Arc<ShmRegion>>,
) {
    let ctx = WorkerContext::new(shm);
    let logic = AssertUnwindSafe(logic);
    let mut empty_polls_since_stop = 0u32;

    let outcome = loop {
        if flags.process_stop.load(Ordering::Acquire) {
            debug!(worker = %name, "worker observed stop request, exiting immediately");
            break Ok(());
        }

        match in_rx.recv_timeout(STOP_DRAIN_POLL_INTERVAL) {
            Ok(bytes) => {
                empty_polls_since_stop = 0;
                let frame: Frame = match serde_json::from_slice(&bytes) {
                    Ok(frame) => frame,
                    Err(error) => break Err(SubprocessError::Codec(error)),
                };

                let result = catch_unwind(AssertUnwindSafe(|| logic.0.sub_process_internal(&ctx, frame)));
                match result {
                    Err(_panic) => break Err(SubprocessError::WorkerPanicked),
                    Ok(Err(source)) => break Err(SubprocessError::WorkerFailed(source)),
                    Ok(Ok(Some(out_frame))) => {
                        let encoded = match serde_json::to_vec(&out_frame) {
                            Ok(encoded) => encoded,
                            Err(error) => break Err(SubprocessError::Codec(error)),
                        };
                        if out_tx.send(encoded).is_err() {
                            trace!(worker = %name, "out queue receiver gone, worker exiting");
                            break Ok(());
                        }
                    }
                    Ok(Ok(None)) => {}
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if flags.process_shutdown.load(Ordering::Acquire) {
                    empty_polls_since_stop += 1;
                    if empty_polls_since_stop >= STOP_DRAIN_POLLS {
                        debug!(worker = %name, "input queue drained after shutdown request, exiting");
                        break Ok(());
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                trace!(worker = %name, "in queue sender gone, worker exiting");
                break Ok(());
            }
        }
    };

    if let Err(error) = outcome {
        warn!(worker = %name, error = %error, "subprocess worker terminating with error");
        *failure.lock().unwrap() = Some(error);
    }
    flags.terminated.store(true, Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgn_core::Frame;
    use std::time::Duration;

    fn frame_with_value(n: i64) -> Frame {
        let mut frame = Frame::new(false);
        frame
            .metadata
            .insert("value".to_string(), serde_json::json!(n));
        frame
    }

    fn frame_value(frame: &Frame) -> i64 {
        frame
            .metadata
            .get("value")
            .and_then(|v| v.as_i64())
            .unwrap_or(0)
    }

    struct Double;
    impl SubprocessLogic for Double {
        fn sub_process_internal(
            &self,
            _ctx: &WorkerContext,
            frame: Frame,
        ) -> sgn_core::Result<Option<Frame>> {
            Ok(Some(frame_with_value(frame_value(&frame) * 2)))
        }
    }

    struct AlwaysPanics;
    impl SubprocessLogic for AlwaysPanics {
        fn sub_process_internal(
            &self,
            _ctx: &WorkerContext,
            _frame: Frame,
        ) -> sgn_core::Result<Option<Frame>> {
            panic!("boom");
        }
    }

    #[test]
    fn happy_path_roundtrip() {
        let handle = WorkerHandle::spawn("double".into(), Double, 8, Vec::new());
        let frame = frame_with_value(21);
        handle
            .in_tx
            .send(serde_json::to_vec(&frame).unwrap())
            .unwrap();
        let out = handle.out_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let out: Frame = serde_json::from_slice(&out).unwrap();
        assert_eq!(frame_value(&out), 42);

        handle.flags.request_stop();
        assert!(handle.join(Duration::from_secs(2)));
    }

    #[test]
    fn panic_is_contained_and_reported() {
        let handle = WorkerHandle::spawn("panics".into(), AlwaysPanics, 8, Vec::new());
        let frame = frame_with_value(1);
        handle
            .in_tx
            .send(serde_json::to_vec(&frame).unwrap())
            .unwrap();
        assert!(handle.join(Duration::from_secs(2)));
        let failure = handle.failure.lock().unwrap();
        assert!(matches!(*failure, Some(SubprocessError::WorkerPanicked)));
    }

    #[test]
    fn shutdown_drains_then_exits() {
        let handle = WorkerHandle::spawn("idle".into(), Double, 8, Vec::new());
        handle.flags.request_shutdown();
        assert!(handle.join(Duration::from_secs(5)));
    }
}
