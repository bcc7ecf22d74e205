//! Common error type definitions.

use std::error::Error as StdError;

use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// Used as the `source` of a [`CoreError::Callback`] (or a downstream crate's
/// equivalent variant) to carry an arbitrary user-callback failure without the
/// core needing to know its concrete type.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can arise from the core data model itself.
///
/// Most of the taxonomy in the specification (duplicate names, cycles,
/// unlinked pads) belongs to `sgn-runtime`, which owns the graph; this crate
/// only needs to report failures local to frames and identifiers.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A user-supplied element or pad callback failed.
    #[error("callback failed: {source}")]
    Callback {
        /// The underlying failure.
        #[source]
        source: BoxedError,
    },

    /// Frame metadata could not be serialized or deserialized.
    #[error("frame metadata error: {0}")]
    Metadata(#[from] serde_json::Error),
}

impl CoreError {
    /// Wrap an arbitrary callback error.
    pub fn callback<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Callback {
            source: Box::new(source),
        }
    }
}
