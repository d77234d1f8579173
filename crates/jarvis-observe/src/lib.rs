//! Observability for Jarvis: structured logging and optional trace export.

pub mod tracing_setup;
