//! Observability wiring for the back office.

pub mod tracing;

pub use tracing::init;
