//! [`SubprocessSink`]: a [`SinkElement`] whose work runs on a worker thread.

use std::marker::PhantomData;
use std::sync::Arc;

use sgn_core::Frame;
use sgn_runtime::{SinkContext, SinkElement, SinkPad};

use crate::error::SubprocessError;
use crate::shm::ShmRegion;
use crate::worker::{SubprocessLogic, WorkerConfig, WorkerHandle};

/// A [`SinkElement`] whose `sub_process_internal` call is dispatched to a
/// dedicated worker thread.
///
/// EOS is marked on the host side, synchronously, before the frame is
/// handed to the worker: the scheduler's termination predicate reads the
/// [`SinkContext`] immediately after `pull` returns, so it cannot wait on an
/// asynchronous worker round trip. The worker still receives every frame,
/// including the one that carried `eos`, for whatever teardown work
/// `sub_process_internal` wants to do with it.
pub struct SubprocessSink<L: SubprocessLogic> {
    worker: Arc<WorkerHandle>,
    config: WorkerConfig,
    _logic: PhantomData<L>,
}

impl<L: SubprocessLogic> SubprocessSink<L> {
    /// Build a subprocess sink dispatching to a worker running `logic` per
    /// `config`, given a snapshot of `shm`. `config.timeout` bounds how long
    /// `pull` blocks applying backpressure against a full input queue.
    pub fn new(name: impl Into<String>, logic: L, config: WorkerConfig, shm: Vec<Arc<ShmRegion>>) -> Self {
        let worker = Arc::new(WorkerHandle::spawn(
            name.into(),
            logic,
            config.queue_capacity,
            shm,
        ));
        Self {
            worker,
            config,
            _logic: PhantomData,
        }
    }

    /// A clone of the worker handle, for a supervisor to track, steer, and
    /// join. Callers must capture this *before* moving the element into a
    /// [`sgn_runtime::Pipeline`] — the pipeline gives no access back into an
    /// element once inserted.
    pub fn worker_handle(&self) -> Arc<WorkerHandle> {
        Arc::clone(&self.worker)
    }

    fn terminal_error(&self) -> SubprocessError {
        self.worker
            .failure
            .lock()
            .unwrap()
            .take()
            .unwrap_or(SubprocessError::WorkerGone)
    }
}

impl<L: SubprocessLogic> SinkElement for SubprocessSink<L> {
    fn pull(&self, ctx: &SinkContext<'_>, pad: &SinkPad, frame: Frame) -> sgn_core::Result<()> {
        if frame.eos {
            ctx.mark_eos(pad);
        }

        if self.worker.flags.is_terminated() {
            return Err(self.terminal_error().into());
        }

        let encoded = serde_json::to_vec(&frame).map_err(SubprocessError::Codec)?;
        self.worker
            .in_tx
            .send_timeout(encoded, self.config.timeout)
            .map_err(|_| self.terminal_error())?;
        Ok(())
    }
}
