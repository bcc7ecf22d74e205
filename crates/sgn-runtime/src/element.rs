//! Elements: groupings of related pads with user-supplied callbacks.
//!
//! Three variants, enforced by construction rather than by a runtime check:
//! a [`Source`] owns only source pads, a [`Transform`] owns both kinds and
//! declares that every source pad depends on every sink pad, and a [`Sink`]
//! owns only sink pads and carries the element's EOS table.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sgn_core::Frame;

use crate::pad::{Consumer, PadHandle, Producer, SinkPad, SourcePad};

/// Implemented by user-defined source elements.
///
/// `new` is invoked once per frame cycle for each of the element's source
/// pads; it must return the next [`Frame`], setting `eos` once the source is
/// exhausted.
pub trait SourceElement: Send + Sync + 'static {
    /// Produce the next frame for `pad`.
    fn new(&self, pad: &SourcePad) -> sgn_core::Result<Frame>;
}

/// Implemented by user-defined transform elements.
///
/// `pull` receives each sink pad's input frame for the current cycle;
/// `transform` is then invoked for each source pad, after every sink pad of
/// the same element has been pulled (the intra-element ordering guarantee).
pub trait TransformElement: Send + Sync + 'static {
    /// Consume an input frame arriving on `pad`.
    fn pull(&self, pad: &SinkPad, frame: Frame) -> sgn_core::Result<()>;
    /// Produce the output frame for `pad`.
    fn transform(&self, pad: &SourcePad) -> sgn_core::Result<Frame>;
}

/// Implemented by user-defined sink elements.
///
/// `ctx` exposes the element's EOS table; idiomatic implementations call
/// `ctx.mark_eos(pad)` once `frame.eos` is observed.
pub trait SinkElement: Send + Sync + 'static {
    /// Consume an input frame arriving on `pad`.
    fn pull(&self, ctx: &SinkContext<'_>, pad: &SinkPad, frame: Frame) -> sgn_core::Result<()>;
}

/// Per-sink-element table of {sink pad name → EOS flag}.
///
/// Owned by the framework (constructed when a [`Sink`] is built), not by the
/// user's [`SinkElement`] implementation — user code only ever reaches it
/// through a [`SinkContext`] handed to `pull`. This mirrors the relation
/// between pad and element elsewhere in this crate: ownership lives on the
/// framework side, user code holds a non-owning handle.
#[derive(Debug, Default)]
pub struct EosTable {
    flags: Mutex<HashMap<String, bool>>,
}

impl EosTable {
    fn new(pad_names: impl IntoIterator<Item = String>) -> Self {
        let flags = pad_names.into_iter().map(|name| (name, false)).collect();
        Self {
            flags: Mutex::new(flags),
        }
    }

    /// Flag `pad` as having reached EOS.
    pub fn mark(&self, pad_name: &str) {
        if let Some(flag) = self.flags.lock().unwrap().get_mut(pad_name) {
            *flag = true;
        }
    }

    /// Whether *any* sink pad of the element has reached EOS.
    pub fn at_eos(&self) -> bool {
        self.flags.lock().unwrap().values().any(|&flag| flag)
    }
}

/// Handle passed to [`SinkElement::pull`], exposing the element's EOS table
/// without granting ownership of it.
pub struct SinkContext<'a> {
    table: &'a Arc<EosTable>,
}

impl<'a> SinkContext<'a> {
    pub(crate) fn new(table: &'a Arc<EosTable>) -> Self {
        Self { table }
    }

    /// Flag `pad` as having reached EOS.
    pub fn mark_eos(&self, pad: &SinkPad) {
        self.table.mark(pad.name());
    }

    /// Whether the element (any of its sink pads) is currently at EOS.
    pub fn at_eos(&self) -> bool {
        self.table.at_eos()
    }
}

fn full_name(element: &str, kind: &str, pad: &str) -> String {
    format!("{element}:{kind}:{pad}")
}

/// A source element: owns ≥1 source pads and 0 sink pads.
pub struct Source {
    pub(crate) name: String,
    pub(crate) pads: Vec<Arc<SourcePad>>,
}

impl Source {
    /// Build a source element named `name`, exposing one source pad per
    /// entry in `pad_names`, all wired to `inner`'s `new` hook.
    pub fn new(
        name: impl Into<String>,
        pad_names: impl IntoIterator<Item = impl Into<String>>,
        inner: impl SourceElement,
    ) -> Self {
        let name = name.into();
        let inner: Arc<dyn SourceElement> = Arc::new(inner);
        let pads = pad_names
            .into_iter()
            .map(|pad_name| {
                let full = full_name(&name, "src", &pad_name.into());
                SourcePad::new(full, Producer::Source(Arc::clone(&inner)))
            })
            .collect();
        Self { name, pads }
    }
}

/// A transform element: owns ≥1 source pads and ≥1 sink pads. Every source
/// pad depends on every sink pad of the same element.
pub struct Transform {
    pub(crate) name: String,
    pub(crate) source_pads: Vec<Arc<SourcePad>>,
    pub(crate) sink_pads: Vec<Arc<SinkPad>>,
}

impl Transform {
    /// Build a transform element named `name`.
    pub fn new(
        name: impl Into<String>,
        source_pad_names: impl IntoIterator<Item = impl Into<String>>,
        sink_pad_names: impl IntoIterator<Item = impl Into<String>>,
        inner: impl TransformElement,
    ) -> Self {
        let name = name.into();
        let inner: Arc<dyn TransformElement> = Arc::new(inner);
        let source_pads = source_pad_names
            .into_iter()
            .map(|pad_name| {
                let full = full_name(&name, "src", &pad_name.into());
                SourcePad::new(full, Producer::Transform(Arc::clone(&inner)))
            })
            .collect();
        let sink_pads = sink_pad_names
            .into_iter()
            .map(|pad_name| {
                let full = full_name(&name, "sink", &pad_name.into());
                SinkPad::new(full, Consumer::Transform(Arc::clone(&inner)))
            })
            .collect();
        Self {
            name,
            source_pads,
            sink_pads,
        }
    }
}

/// A sink element: owns ≥1 sink pads and 0 source pads. Owns the element's
/// [`EosTable`].
pub struct Sink {
    pub(crate) name: String,
    pub(crate) pads: Vec<Arc<SinkPad>>,
    pub(crate) eos: Arc<EosTable>,
}

impl Sink {
    /// Build a sink element named `name`, exposing one sink pad per entry in
    /// `pad_names`, all wired to `inner`'s `pull` hook and sharing one EOS
    /// table.
    pub fn new(
        name: impl Into<String>,
        pad_names: impl IntoIterator<Item = impl Into<String>>,
        inner: impl SinkElement,
    ) -> Self {
        let name = name.into();
        let inner: Arc<dyn SinkElement> = Arc::new(inner);
        let pad_names: Vec<String> = pad_names.into_iter().map(Into::into).collect();
        let full_names: Vec<String> = pad_names
            .iter()
            .map(|pad_name| full_name(&name, "sink", pad_name))
            .collect();
        let eos = Arc::new(EosTable::new(full_names.iter().cloned()));
        let pads = full_names
            .into_iter()
            .map(|full| SinkPad::new(full, Consumer::Sink(Arc::clone(&inner), Arc::clone(&eos))))
            .collect();
        Self { name, pads, eos }
    }

    /// Whether this sink element is currently at EOS.
    pub fn at_eos(&self) -> bool {
        self.eos.at_eos()
    }
}

/// A constructed element, ready to be inserted into a [`crate::Pipeline`].
pub enum Element {
    /// A source element.
    Source(Source),
    /// A transform element.
    Transform(Transform),
    /// A sink element.
    Sink(Sink),
}

impl Element {
    /// The element's base name (not a pad's full name).
    pub fn name(&self) -> &str {
        match self {
            Element::Source(e) => &e.name,
            Element::Transform(e) => &e.name,
            Element::Sink(e) => &e.name,
        }
    }

    pub(crate) fn pad_handles(&self) -> Vec<PadHandle> {
        match self {
            Element::Source(e) => e.pads.iter().cloned().map(PadHandle::Source).collect(),
            Element::Transform(e) => {
                let mut handles: Vec<PadHandle> = e
                    .source_pads
                    .iter()
                    .cloned()
                    .map(PadHandle::Source)
                    .collect();
                handles.extend(e.sink_pads.iter().cloned().map(PadHandle::Sink));
                handles
            }
            Element::Sink(e) => e.pads.iter().cloned().map(PadHandle::Sink).collect(),
        }
    }

    /// Intra-element dependency edges: `(predecessor_pad_name, dependent_pad_name)`.
    pub(crate) fn intra_element_edges(&self) -> Vec<(String, String)> {
        match self {
            Element::Source(_) | Element::Sink(_) => Vec::new(),
            Element::Transform(e) => e
                .sink_pads
                .iter()
                .flat_map(|sink| {
                    e.source_pads
                        .iter()
                        .map(move |source| (sink.name().to_string(), source.name().to_string()))
                })
                .collect(),
        }
    }
}

impl From<Source> for Element {
    fn from(value: Source) -> Self {
        Element::Source(value)
    }
}

impl From<Transform> for Element {
    fn from(value: Transform) -> Self {
        Element::Transform(value)
    }
}

impl From<Sink> for Element {
    fn from(value: Sink) -> Self {
        Element::Sink(value)
    }
}
