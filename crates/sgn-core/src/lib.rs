#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod error;
pub mod frame;
pub mod id;

#[doc(hidden)]
pub mod prelude;

pub use error::{BoxedError, CoreError, Result};
pub use frame::Frame;
pub use id::UniqueId;
