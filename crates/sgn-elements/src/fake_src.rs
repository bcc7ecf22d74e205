//! [`FakeSrc`]: a source that counts frames synthetically.

use std::collections::HashMap;
use std::sync::Mutex;

use sgn_core::Frame;
use sgn_runtime::{SourceElement, SourcePad};

/// Synthetic source used by the scenario tests.
///
/// Each source pad keeps a private counter, starting at `-1`. Every `new`
/// call increments the pad's counter and stamps the frame's `"name"`
/// metadata with `"<pad-name>[<counter>]"`, setting `eos` once the counter
/// reaches `num_frames - 1`.
pub struct FakeSrc {
    num_frames: u64,
    counters: Mutex<HashMap<String, i64>>,
}

impl FakeSrc {
    /// Build a source that emits `num_frames` frames per pad before EOS.
    pub fn new(num_frames: u64) -> Self {
        Self {
            num_frames,
            counters: Mutex::new(HashMap::new()),
        }
    }
}

impl SourceElement for FakeSrc {
    fn new(&self, pad: &SourcePad) -> sgn_core::Result<Frame> {
        let mut counters = self.counters.lock().unwrap();
        let counter = counters.entry(pad.name().to_string()).or_insert(-1);
        *counter += 1;
        let count = *counter;

        let mut frame = Frame::new(count >= self.num_frames as i64 - 1);
        frame.set_name(format!("{}[{count}]", pad.name()));
        Ok(frame)
    }
}
