//! Isolated-worker elements for `sgn-runtime`: [`SubprocessTransform`] and
//! [`SubprocessSink`] dispatch their per-frame work to a dedicated OS thread
//! behind bounded queues, contained by [`std::panic::catch_unwind`] and
//! coordinated for shutdown by a [`Supervisor`].
//!
//! Unlike the rest of the workspace this crate is not `#![forbid(unsafe_code)]`:
//! [`shm`] maps and unmaps shared-memory regions, which is unavoidably unsafe
//! at the boundary where the raw pointer is turned into a slice. The unsafe
//! blocks are narrow and documented in place.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod error;
pub mod shm;
pub mod sink;
pub mod supervisor;
pub mod transform;
pub mod worker;

pub use error::{Result, SubprocessError};
pub use shm::{ShmRegion, ShmRoster};
pub use sink::SubprocessSink;
pub use supervisor::Supervisor;
pub use transform::SubprocessTransform;
pub use worker::{SubprocessLogic, WorkerConfig, WorkerConfigBuilder, WorkerContext, WorkerFlags, WorkerHandle};
