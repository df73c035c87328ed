//! Observability setup for Voxa: tracing subscriber and optional
//! OpenTelemetry export.

pub mod tracing_setup;
