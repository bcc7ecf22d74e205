//! [`SubprocessTransform`]: a [`TransformElement`] whose work runs on a
//! worker thread instead of inline in the scheduler's call stack.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use sgn_core::Frame;
use sgn_runtime::{SinkPad, SourcePad, TransformElement};

use crate::error::SubprocessError;
use crate::shm::ShmRegion;
use crate::worker::{SubprocessLogic, WorkerConfig, WorkerHandle};

/// Combines every sink pad's current frame into one, each nested under its
/// full pad name in the combined frame's metadata, and ORs their `eos`
/// flags. This is the host-side half of fanning multiple sink pads into one
/// worker call; `sub_process_internal` receives the combined frame and is
/// responsible for decoding the nested frames it cares about.
fn combine(sink_full_names: &[String], inputs: &HashMap<String, Frame>) -> Frame {
    let mut eos = false;
    let mut combined = Frame::new(false);
    for sink_name in sink_full_names {
        if let Some(frame) = inputs.get(sink_name) {
            eos |= frame.eos;
            if let Ok(value) = serde_json::to_value(frame) {
                combined.metadata.insert(sink_name.clone(), value);
            }
        }
    }
    combined.eos = eos;
    combined
}

/// A [`TransformElement`] whose `sub_process_internal` call is dispatched to
/// a dedicated worker thread via bounded queues rather than run inline.
///
/// `pull` buffers each sink pad's frame the same way the crate's reference
/// fan-in transform does; `transform` combines the buffered inputs, hands
/// them to the worker, and blocks (with a timeout) for the corresponding
/// output.
pub struct SubprocessTransform<L: SubprocessLogic> {
    sink_full_names: Vec<String>,
    inputs: Mutex<HashMap<String, Frame>>,
    worker: Arc<WorkerHandle>,
    config: WorkerConfig,
    _logic: PhantomData<L>,
}

impl<L: SubprocessLogic> SubprocessTransform<L> {
    /// Build a subprocess transform named `element_name` with sink pads
    /// `sink_pad_names` (short names), dispatching to a worker running
    /// `logic` per `config`, given a snapshot of `shm`.
    pub fn new(
        element_name: impl Into<String>,
        sink_pad_names: impl IntoIterator<Item = impl Into<String>>,
        logic: L,
        config: WorkerConfig,
        shm: Vec<Arc<ShmRegion>>,
    ) -> Self {
        let element_name = element_name.into();
        let sink_full_names = sink_pad_names
            .into_iter()
            .map(|name| format!("{element_name}:sink:{}", name.into()))
            .collect();
        let worker = Arc::new(WorkerHandle::spawn(
            element_name,
            logic,
            config.queue_capacity,
            shm,
        ));
        Self {
            sink_full_names,
            inputs: Mutex::new(HashMap::new()),
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

impl<L: SubprocessLogic> TransformElement for SubprocessTransform<L> {
    fn pull(&self, pad: &SinkPad, frame: Frame) -> sgn_core::Result<()> {
        self.inputs
            .lock()
            .unwrap()
            .insert(pad.name().to_string(), frame);
        Ok(())
    }

    fn transform(&self, _pad: &SourcePad) -> sgn_core::Result<Frame> {
        if self.worker.flags.is_terminated() {
            return Err(self.terminal_error().into());
        }

        let combined = combine(&self.sink_full_names, &self.inputs.lock().unwrap());
        let encoded = serde_json::to_vec(&combined).map_err(SubprocessError::Codec)?;
        self.worker
            .in_tx
            .send(encoded)
            .map_err(|_| SubprocessError::WorkerGone)?;

        let encoded_out = self
            .worker
            .out_rx
            .recv_timeout(self.config.timeout)
            .map_err(|_| self.terminal_error())?;
        let out: Frame = serde_json::from_slice(&encoded_out).map_err(SubprocessError::Codec)?;
        Ok(out)
    }
}
