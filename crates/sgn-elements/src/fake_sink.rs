//! [`FakeSink`]: renders a frame flow line to an injectable [`LineSink`].

use std::sync::{Arc, Mutex};

use sgn_core::Frame;
use sgn_runtime::{SinkContext, SinkElement, SinkPad};

/// Destination for [`FakeSink`]'s rendered lines.
///
/// Exists purely so the engine's own scenario tests can assert on captured
/// output instead of capturing process-wide stdout; production code can pass
/// [`StdoutSink`] or nothing at all (the default).
pub trait LineSink: Send + Sync + 'static {
    /// Write one rendered line.
    fn write_line(&self, line: String);
}

/// The default [`LineSink`]: prints to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl LineSink for StdoutSink {
    fn write_line(&self, line: String) {
        println!("{line}");
    }
}

/// A [`LineSink`] that captures lines in memory, for tests.
#[derive(Debug, Default, Clone)]
pub struct CapturingSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CapturingSink {
    /// Build an empty capturing sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The lines captured so far, in emission order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl LineSink for CapturingSink {
    fn write_line(&self, line: String) {
        self.lines.lock().unwrap().push(line);
    }
}

/// Synthetic sink used by the scenario tests.
///
/// `pull` marks EOS on the element when `frame.eos` is set, then renders
/// `"frame flow:  <frame name> -> <pad-name>"`, appending `"  EOS"` once the
/// element is at EOS.
pub struct FakeSink {
    sink: Arc<dyn LineSink>,
}

impl FakeSink {
    /// Build a sink that renders to stdout.
    pub fn new() -> Self {
        Self {
            sink: Arc::new(StdoutSink),
        }
    }

    /// Build a sink that renders to a caller-supplied [`LineSink`].
    pub fn with_sink(sink: Arc<dyn LineSink>) -> Self {
        Self { sink }
    }
}

impl Default for FakeSink {
    fn default() -> Self {
        Self::new()
    }
}

impl SinkElement for FakeSink {
    fn pull(&self, ctx: &SinkContext<'_>, pad: &SinkPad, frame: Frame) -> sgn_core::Result<()> {
        if frame.eos {
            ctx.mark_eos(pad);
        }

        let name = frame.name().unwrap_or_default();
        let mut line = format!("frame flow:  {name} -> {}", pad.name());
        if ctx.at_eos() {
            line.push_str("  EOS");
        }
        self.sink.write_line(line);
        Ok(())
    }
}
