//! The [`Pipeline`]: name registry, dependency graph, and scheduler driver.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::element::{Element, Sink};
use crate::error::{Result, RuntimeError};
use crate::graph::PadGraph;
use crate::pad::PadHandle;

/// A mapping from sink pad full name to source pad full name, as passed to
/// [`Pipeline::insert`] and [`Pipeline::link`].
pub type LinkMap = HashMap<String, String>;

/// Registers elements and pads by unique name, tracks the merged pad
/// dependency graph, and drives the frame-by-frame scheduler.
#[derive(Default)]
pub struct Pipeline {
    element_names: HashSet<String>,
    graph: PadGraph,
    sinks: Vec<Arc<Sink>>,
}

impl Pipeline {
    /// Construct an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `element` (and its pads) by unique name, merge its
    /// intra-element edges into the graph, and optionally link it.
    ///
    /// Fails if the element's name, or any of its pad names, is already
    /// registered.
    #[instrument(skip_all, fields(element = element.name()))]
    pub fn insert(&mut self, element: impl Into<Element>, link_map: Option<LinkMap>) -> Result<&mut Self> {
        let element = element.into();
        if !self.element_names.insert(element.name().to_string()) {
            return Err(RuntimeError::DuplicateName(element.name().to_string()));
        }

        for pad in element.pad_handles() {
            debug!(pad = pad.name(), "registering pad");
            self.graph.add_pad(pad)?;
        }
        for (predecessor, dependent) in element.intra_element_edges() {
            self.graph.add_dependency(&predecessor, &dependent)?;
        }

        if let Element::Sink(sink) = element {
            self.sinks.push(Arc::new(sink));
        }

        if let Some(link_map) = link_map {
            self.link(link_map)?;
        }

        Ok(self)
    }

    /// For each `sink_name -> source_name` entry, resolve both names, assert
    /// their kinds, link sink to source, and record the resulting scheduling
    /// dependency.
    #[instrument(skip_all)]
    pub fn link(&mut self, link_map: LinkMap) -> Result<&mut Self> {
        for (sink_name, source_name) in link_map {
            let sink_pad = match self.graph.pad(&sink_name) {
                Some(PadHandle::Sink(pad)) => Arc::clone(pad),
                Some(PadHandle::Source(_)) => return Err(RuntimeError::WrongPadKind(sink_name)),
                None => return Err(RuntimeError::UnknownName(sink_name)),
            };
            let source_pad = match self.graph.pad(&source_name) {
                Some(PadHandle::Source(pad)) => Arc::clone(pad),
                Some(PadHandle::Sink(_)) => return Err(RuntimeError::WrongPadKind(source_name)),
                None => return Err(RuntimeError::UnknownName(source_name)),
            };

            sink_pad.link(source_pad)?;
            self.graph.add_dependency(&source_name, &sink_name)?;
        }
        Ok(self)
    }

    /// Whether every sink element currently registered is at EOS. An empty
    /// pipeline (no sinks yet) is vacuously at EOS.
    fn all_sinks_at_eos(&self) -> bool {
        self.sinks.iter().all(|sink| sink.at_eos())
    }

    /// Drive the pipeline from its current state to global EOS.
    ///
    /// Validates that every sink pad is linked before scheduling anything
    /// (an unlinked sink pad is a configuration error caught here rather than
    /// deep inside a wave), then alternates rebuilding the topological wave
    /// order and executing it, one frame cycle at a time, until every sink
    /// element has observed EOS.
    #[instrument(skip_all)]
    pub async fn run(&self) -> Result<()> {
        self.validate_links()?;

        let mut frame_count = 0u64;
        while !self.all_sinks_at_eos() {
            let waves = self.graph.topological_waves()?;
            debug!(frame = frame_count, waves = waves.len(), "starting frame cycle");
            for wave in waves {
                let results = futures::future::join_all(wave.iter().map(PadHandle::execute)).await;
                for result in results {
                    result?;
                }
            }
            frame_count += 1;
        }
        info!(frames = frame_count, "pipeline reached end of stream");
        Ok(())
    }

    fn validate_links(&self) -> Result<()> {
        for sink in &self.sinks {
            for pad in &sink.pads {
                if !pad.is_linked() {
                    return Err(RuntimeError::UnlinkedPad(pad.name().to_string()));
                }
            }
        }
        Ok(())
    }
}
