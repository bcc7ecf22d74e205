//! Runtime error types: graph construction, linking, and scheduling failures.

use thiserror::Error;

/// Result type alias using [`RuntimeError`].
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors raised by the pad/element/pipeline machinery.
///
/// This is the single error type [`crate::pipeline::Pipeline::run`] returns to
/// its caller, per the specification's "one exception type wrapping the
/// underlying cause" contract; callers that need finer-grained handling match
/// on the variant.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// An element or pad name collided with one already registered.
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// A `link_map` entry (or intra-element edge) referenced a name that was
    /// never registered.
    #[error("unknown pad name: {0}")]
    UnknownName(String),

    /// `link_map` paired a sink pad name with something that is not a source
    /// pad, or vice versa.
    #[error("wrong pad kind for link: {0}")]
    WrongPadKind(String),

    /// A sink pad was linked a second time.
    #[error("sink pad already linked: {0}")]
    AlreadyLinked(String),

    /// A sink pad was executed (or the pipeline was run) before it was linked.
    #[error("sink pad not linked: {0}")]
    UnlinkedPad(String),

    /// The merged dependency graph contains a cycle.
    #[error("dependency graph contains a cycle")]
    CycleDetected,

    /// Something other than an `Element` was passed where one was expected,
    /// or an element declared pads inconsistent with its own kind.
    #[error("invalid element: {0}")]
    InvalidElement(String),

    /// A pad callback (`new`, `transform`, or `pull`) failed.
    #[error("pad {pad} failed")]
    PadFailed {
        /// Full name of the pad whose callback failed.
        pad: String,
        /// The underlying callback error.
        #[source]
        source: sgn_core::CoreError,
    },
}
