//! [`NullSink`]: discards frames, tracking only EOS.

use sgn_core::Frame;
use sgn_runtime::{SinkContext, SinkElement, SinkPad};

/// A sink that marks EOS on `frame.eos` and otherwise discards the frame.
///
/// Used where only the EOS-termination behavior of a branch matters, not
/// its output — e.g. a throwaway branch in a larger graph under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SinkElement for NullSink {
    fn pull(&self, ctx: &SinkContext<'_>, pad: &SinkPad, frame: Frame) -> sgn_core::Result<()> {
        if frame.eos {
            ctx.mark_eos(pad);
        }
        Ok(())
    }
}
