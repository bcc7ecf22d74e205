//! The [`Frame`] value type: the unit of data exchanged between pads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata key the engine itself writes to, reserved for graph visualization.
///
/// `SourcePad::execute` appends `"-> <pad-name> "` to this key on every frame
/// it produces (see [`Frame::record_graph_hop`]); sink pads never touch it.
/// User code may read it but should not assume anything about its format
/// beyond the append rule.
pub const GRAPH_METADATA_KEY: &str = "__graph__";

/// Immutable unit of data flowing between pads.
///
/// A `Frame` is a value object: every pad invocation that produces data
/// constructs a new one. It carries an end-of-stream flag, a gap flag (no
/// payload this cycle, e.g. silence or a dropped sample), and an open
/// metadata map for both user payload and the engine's own bookkeeping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frame {
    /// Set once a producer has no more data; propagates to terminate the run.
    pub eos: bool,
    /// Set when this cycle carries no meaningful payload.
    pub is_gap: bool,
    /// Opaque, user- and engine-defined metadata.
    pub metadata: BTreeMap<String, Value>,
}

impl Frame {
    /// Construct a frame carrying no metadata.
    pub fn new(eos: bool) -> Self {
        Self {
            eos,
            is_gap: false,
            metadata: BTreeMap::new(),
        }
    }

    /// Construct a frame with the given metadata map.
    pub fn with_metadata(eos: bool, metadata: BTreeMap<String, Value>) -> Self {
        Self {
            eos,
            is_gap: false,
            metadata,
        }
    }

    /// Construct a gap frame (no payload this cycle).
    pub fn gap(eos: bool) -> Self {
        Self {
            eos,
            is_gap: true,
            metadata: BTreeMap::new(),
        }
    }

    /// Append a graph-visualization hop to [`GRAPH_METADATA_KEY`].
    ///
    /// Called exactly once per frame, by `SourcePad::execute`, immediately
    /// after the producer callback returns. Sink pads never call this.
    pub fn record_graph_hop(&mut self, pad_name: &str) {
        let entry = self
            .metadata
            .entry(GRAPH_METADATA_KEY.to_string())
            .or_insert_with(|| Value::String(String::new()));
        if let Value::String(s) = entry {
            s.push_str("-> ");
            s.push_str(pad_name);
            s.push(' ');
        }
    }

    /// Convenience accessor for the `"name"` metadata key used by the
    /// reference elements and their tests.
    pub fn name(&self) -> Option<&str> {
        self.metadata.get("name").and_then(Value::as_str)
    }

    /// Set the `"name"` metadata key.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.metadata
            .insert("name".to_string(), Value::String(name.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_frame_has_no_metadata() {
        let frame = Frame::new(false);
        assert!(!frame.eos);
        assert!(!frame.is_gap);
        assert!(frame.metadata.is_empty());
    }

    #[test]
    fn record_graph_hop_appends() {
        let mut frame = Frame::new(false);
        frame.record_graph_hop("src1:src:H1");
        frame.record_graph_hop("trans1:src:H1");
        assert_eq!(
            frame.metadata.get(GRAPH_METADATA_KEY).and_then(Value::as_str),
            Some("-> src1:src:H1 -> trans1:src:H1 ")
        );
    }

    #[test]
    fn name_roundtrip() {
        let mut frame = Frame::new(false);
        frame.set_name("src1:src:H1[0]");
        assert_eq!(frame.name(), Some("src1:src:H1[0]"));
    }
}
