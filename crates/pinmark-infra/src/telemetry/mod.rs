//! Telemetry initialization
//!
//! Structured logging through `tracing-subscriber`. The filter comes from `RUST_LOG`,
//! falling back to [`DEFAULT_FILTER`].

mod init_basic;

pub use init_basic::{init_telemetry, LogFormat, DEFAULT_FILTER};
