//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types for ergonomic imports:
//!
//! ```rust
//! use sgn_runtime::prelude::*;
//! ```

pub use crate::element::{
    Element, EosTable, Sink, SinkContext, SinkElement, Source, SourceElement, Transform,
    TransformElement,
};
pub use crate::error::{Result, RuntimeError};
pub use crate::pad::{SinkPad, SourcePad};
pub use crate::pipeline::{LinkMap, Pipeline};
