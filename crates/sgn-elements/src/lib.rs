#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod fake_sink;
mod fake_src;
mod fake_transform;
mod iter_source;
mod null_sink;

pub use fake_sink::{CapturingSink, FakeSink, LineSink, StdoutSink};
pub use fake_src::FakeSrc;
pub use fake_transform::FakeTransform;
pub use iter_source::IterSource;
pub use null_sink::NullSink;
