//! Pinmark Infrastructure Library
//!
//! Shared infrastructure for Pinmark binaries. Currently telemetry initialization.

pub mod telemetry;

pub use telemetry::{init_telemetry, LogFormat};
