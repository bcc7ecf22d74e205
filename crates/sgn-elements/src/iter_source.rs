//! [`IterSource`]: a source driven by a host-provided iterator.

use std::iter::Peekable;
use std::sync::Mutex;

use sgn_core::Frame;
use sgn_runtime::{SourceElement, SourcePad};

/// Wraps a host-provided iterator of payloads as a [`SourceElement`].
///
/// Supplements [`crate::FakeSrc`]'s synthetic counting with a source driven
/// by real data. Each `new` call pulls the next item, wraps it in a `Frame`
/// via the caller-supplied `to_value` mapping (written to the `"name"`
/// metadata key), and sets `eos` once the iterator is exhausted.
pub struct IterSource<T> {
    items: Mutex<Peekable<Box<dyn Iterator<Item = T> + Send>>>,
    to_value: Box<dyn Fn(&T) -> serde_json::Value + Send + Sync>,
}

impl<T: Send + 'static> IterSource<T> {
    /// Build a source over `iter`, rendering each item's `"name"` metadata
    /// with `to_value`.
    pub fn new(
        iter: impl Iterator<Item = T> + Send + 'static,
        to_value: impl Fn(&T) -> serde_json::Value + Send + Sync + 'static,
    ) -> Self {
        let boxed: Box<dyn Iterator<Item = T> + Send> = Box::new(iter);
        Self {
            items: Mutex::new(boxed.peekable()),
            to_value: Box::new(to_value),
        }
    }
}

impl<T: Send + 'static> SourceElement for IterSource<T> {
    fn new(&self, _pad: &SourcePad) -> sgn_core::Result<Frame> {
        let mut items = self.items.lock().unwrap();
        match items.next() {
            Some(item) => {
                let eos = items.peek().is_none();
                let mut frame = Frame::new(eos);
                frame
                    .metadata
                    .insert("name".to_string(), (self.to_value)(&item));
                Ok(frame)
            }
            // Called again after exhaustion (a caller bug, since the
            // pipeline should have already terminated); emit a gap frame
            // already flagged EOS rather than panicking.
            None => Ok(Frame::gap(true)),
        }
    }
}
