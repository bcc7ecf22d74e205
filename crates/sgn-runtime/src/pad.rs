//! Pads: the scheduling unit of the execution graph.
//!
//! A pad belongs to exactly one element (a non-owning back-reference; the
//! element owns the pad, not the other way around) and carries a callback
//! handle into that element. One pad is one node in the dependency graph.

use std::sync::{Arc, Mutex};

use sgn_core::{Frame, UniqueId};
use tracing::trace;

use crate::element::{SinkContext, SinkElement, SourceElement, TransformElement};
use crate::error::{Result, RuntimeError};

/// Internal dispatch for whatever produces a [`Frame`] on a source pad:
/// either a `SourceElement`'s `new`, or a `TransformElement`'s `transform`.
#[derive(Clone)]
pub(crate) enum Producer {
    Source(Arc<dyn SourceElement>),
    Transform(Arc<dyn TransformElement>),
}

impl Producer {
    fn produce(&self, pad: &SourcePad) -> sgn_core::Result<Frame> {
        match self {
            Producer::Source(element) => element.new(pad),
            Producer::Transform(element) => element.transform(pad),
        }
    }
}

/// Internal dispatch for whatever consumes a [`Frame`] on a sink pad: either
/// a `TransformElement`'s `pull`, or a `SinkElement`'s `pull` plus its EOS
/// table.
#[derive(Clone)]
pub(crate) enum Consumer {
    Transform(Arc<dyn TransformElement>),
    Sink(Arc<dyn SinkElement>, Arc<crate::element::EosTable>),
}

impl Consumer {
    fn pull(&self, pad: &SinkPad, frame: Frame) -> sgn_core::Result<()> {
        match self {
            Consumer::Transform(element) => element.pull(pad, frame),
            Consumer::Sink(element, eos) => {
                let ctx = SinkContext::new(eos);
                element.pull(&ctx, pad, frame)
            }
        }
    }
}

/// A node that produces a [`Frame`] each frame cycle.
pub struct SourcePad {
    id: UniqueId,
    name: String,
    pub(crate) producer: Producer,
    output: Mutex<Option<Frame>>,
}

impl SourcePad {
    pub(crate) fn new(name: String, producer: Producer) -> Arc<Self> {
        Arc::new(Self {
            id: UniqueId::new(name.clone()),
            name,
            producer,
            output: Mutex::new(None),
        })
    }

    /// The pad's full name, e.g. `"src1:src:H1"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pad's unique identifier.
    pub fn id(&self) -> &UniqueId {
        &self.id
    }

    /// The frame most recently produced this cycle, if any has been produced
    /// yet.
    pub fn current_output(&self) -> Option<Frame> {
        self.output.lock().unwrap().clone()
    }

    /// Invoke the producer callback, store its output, and append the
    /// graph-visualization hop. This is the pad's scheduling "execute" op.
    pub(crate) async fn execute(self: &Arc<Self>) -> Result<()> {
        trace!(pad = %self.name, "executing source pad");
        let mut frame = self
            .producer
            .produce(self)
            .map_err(|source| RuntimeError::PadFailed {
                pad: self.name.clone(),
                source,
            })?;
        frame.record_graph_hop(&self.name);
        *self.output.lock().unwrap() = Some(frame);
        Ok(())
    }
}

/// A node that consumes a [`Frame`] each frame cycle.
pub struct SinkPad {
    id: UniqueId,
    name: String,
    pub(crate) consumer: Consumer,
    linked: Mutex<Option<Arc<SourcePad>>>,
}

impl SinkPad {
    pub(crate) fn new(name: String, consumer: Consumer) -> Arc<Self> {
        Arc::new(Self {
            id: UniqueId::new(name.clone()),
            name,
            consumer,
            linked: Mutex::new(None),
        })
    }

    /// The pad's full name, e.g. `"snk1:sink:H1"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pad's unique identifier.
    pub fn id(&self) -> &UniqueId {
        &self.id
    }

    /// Link this sink pad to a source pad. Fails if already linked.
    pub(crate) fn link(&self, source: Arc<SourcePad>) -> Result<()> {
        let mut slot = self.linked.lock().unwrap();
        if slot.is_some() {
            return Err(RuntimeError::AlreadyLinked(self.name.clone()));
        }
        *slot = Some(source);
        Ok(())
    }

    /// Whether this sink pad has been linked to a source pad yet.
    pub fn is_linked(&self) -> bool {
        self.linked.lock().unwrap().is_some()
    }

    /// Read the linked source pad's current output, invoke the consumer
    /// callback, and store it as the current input. This is the pad's
    /// scheduling "execute" op. No graph-visualization hop is appended here;
    /// only source pads append one.
    pub(crate) async fn execute(self: &Arc<Self>) -> Result<()> {
        let source = self
            .linked
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RuntimeError::UnlinkedPad(self.name.clone()))?;
        let frame = source
            .current_output()
            .expect("source pad must execute before any linked sink pad in the same wave order");
        trace!(pad = %self.name, source = %source.name(), "executing sink pad");
        self.consumer
            .pull(self, frame)
            .map_err(|source| RuntimeError::PadFailed {
                pad: self.name.clone(),
                source,
            })
    }
}

/// Type-erased handle to either pad variant, as stored in the dependency
/// graph.
#[derive(Clone)]
pub(crate) enum PadHandle {
    Source(Arc<SourcePad>),
    Sink(Arc<SinkPad>),
}

impl PadHandle {
    pub(crate) fn name(&self) -> &str {
        match self {
            PadHandle::Source(pad) => pad.name(),
            PadHandle::Sink(pad) => pad.name(),
        }
    }

    pub(crate) async fn execute(&self) -> Result<()> {
        match self {
            PadHandle::Source(pad) => pad.execute().await,
            PadHandle::Sink(pad) => pad.execute().await,
        }
    }
}
