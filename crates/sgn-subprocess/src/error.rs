//! Errors raised by the subprocess worker facility.

use std::time::Duration;

use thiserror::Error;

/// Result type alias using [`SubprocessError`].
pub type Result<T> = std::result::Result<T, SubprocessError>;

/// Errors raised by [`crate::transform::SubprocessTransform`],
/// [`crate::sink::SubprocessSink`], and the [`crate::supervisor::Supervisor`].
///
/// Converted to [`sgn_core::CoreError::Callback`] at the host-side
/// `pull`/`transform`/`new` boundary, so callers driving a [`sgn_runtime::Pipeline`]
/// see exactly one error type regardless of whether a failure originated in
/// the graph or in a subprocess worker.
#[derive(Debug, Error)]
pub enum SubprocessError {
    /// A second shared-memory region was registered under a name already in
    /// the roster.
    #[error("shared memory region `{0}` already registered")]
    ShmNameCollision(String),

    /// The underlying shared-memory mapping failed.
    #[error("shared memory error: {0}")]
    Shm(#[from] shared_memory::ShmemError),

    /// The worker thread panicked while running `sub_process_internal`.
    #[error("subprocess worker panicked")]
    WorkerPanicked,

    /// `sub_process_internal` returned an error, ending the worker.
    #[error("subprocess worker failed: {0}")]
    WorkerFailed(#[source] sgn_core::CoreError),

    /// The worker's queue endpoint was dropped (the worker has already
    /// terminated); further host-side queue operations cannot proceed.
    #[error("subprocess worker is no longer running")]
    WorkerGone,

    /// `sub_process_shutdown` did not observe `terminated` within its
    /// timeout.
    #[error("timed out after {0:?} waiting for subprocess worker to terminate")]
    ShutdownTimeout(Duration),

    /// A frame could not be encoded or decoded across the worker boundary.
    #[error("frame codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl From<SubprocessError> for sgn_core::CoreError {
    fn from(error: SubprocessError) -> Self {
        sgn_core::CoreError::callback(error)
    }
}
