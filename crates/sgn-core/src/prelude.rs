//! Commonly used items from `sgn-core`.

pub use crate::error::{BoxedError, CoreError, Result};
pub use crate::frame::{Frame, GRAPH_METADATA_KEY};
pub use crate::id::UniqueId;
