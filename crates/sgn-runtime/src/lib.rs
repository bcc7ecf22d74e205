#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod element;
mod error;
pub mod graph;
pub mod pad;
pub mod pipeline;

#[doc(hidden)]
pub mod prelude;

pub use element::{Element, EosTable, Sink, SinkContext, SinkElement, Source, SourceElement, Transform, TransformElement};
pub use error::{Result, RuntimeError};
pub use pad::{SinkPad, SourcePad};
pub use pipeline::{LinkMap, Pipeline};

/// Tracing target for runtime operations.
pub const TRACING_TARGET: &str = "sgn_runtime";
