#![deny(missing_docs)]

//! Core library for the student registry service.

/// HTTP routing and request handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Request counters and Prometheus export.
pub mod metrics;
/// Persistence gateway over the student collection.
pub mod store;
/// Student schema and identifier codec.
pub mod students;
