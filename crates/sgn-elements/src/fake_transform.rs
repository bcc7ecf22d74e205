//! [`FakeTransform`]: joins its inputs' names and forwards EOS.

use std::collections::HashMap;
use std::sync::Mutex;

use sgn_core::Frame;
use sgn_runtime::{SinkPad, SourcePad, TransformElement};

/// Synthetic transform used by the scenario tests.
///
/// `pull` stores each sink pad's frame for the current cycle, keyed by the
/// sink pad's full name. `transform` joins the `"name"` metadata of every
/// sink pad's currently-held frame with `"+"`, in declaration order, appends
/// `" -> <source-pad-name>"`, and sets `eos` to the logical OR of every
/// currently-held input's `eos` flag.
pub struct FakeTransform {
    sink_full_names: Vec<String>,
    inputs: Mutex<HashMap<String, Frame>>,
}

impl FakeTransform {
    /// Build a transform named `element_name`, whose sink pads are
    /// `sink_pad_names` (short names, in declaration order).
    pub fn new(
        element_name: impl Into<String>,
        sink_pad_names: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let element_name = element_name.into();
        let sink_full_names = sink_pad_names
            .into_iter()
            .map(|name| format!("{element_name}:sink:{}", name.into()))
            .collect();
        Self {
            sink_full_names,
            inputs: Mutex::new(HashMap::new()),
        }
    }
}

impl TransformElement for FakeTransform {
    fn pull(&self, pad: &SinkPad, frame: Frame) -> sgn_core::Result<()> {
        self.inputs
            .lock()
            .unwrap()
            .insert(pad.name().to_string(), frame);
        Ok(())
    }

    fn transform(&self, pad: &SourcePad) -> sgn_core::Result<Frame> {
        let inputs = self.inputs.lock().unwrap();

        let mut joined = String::new();
        let mut eos = false;
        for (i, sink_name) in self.sink_full_names.iter().enumerate() {
            let Some(input) = inputs.get(sink_name) else {
                continue;
            };
            if i > 0 {
                joined.push('+');
            }
            joined.push_str(input.name().unwrap_or_default());
            eos |= input.eos;
        }
        joined.push_str(" -> ");
        joined.push_str(pad.name());

        let mut out = Frame::new(eos);
        out.set_name(joined);
        Ok(out)
    }
}
