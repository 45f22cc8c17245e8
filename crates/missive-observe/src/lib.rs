//! Observability setup for Missive: structured logging with optional
//! OpenTelemetry span export.

pub mod tracing_setup;
