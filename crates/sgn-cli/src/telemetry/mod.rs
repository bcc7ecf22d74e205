//! Observability setup for the demo binary.

mod tracing;

pub use self::tracing::init_tracing;
