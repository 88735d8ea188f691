//! Observability wiring for Banterline.

pub mod tracing_setup;

pub use tracing_setup::init_tracing;
