//! Ambient stack and illustrative wiring for the event router: YAML configuration loading, `tracing`-based logging
//! initialization, and a thin queue-driven worker.
//!
//! Nothing in this crate is required to use `router-core` / `router-manager`
//! / `router-engine` directly — it exists for binaries that want a
//! conventional, config-file-driven way to stand the pipeline up.

pub mod config;
mod error;
pub mod logging;
mod worker;

pub use config::{ConfigError, ConfigLoader, RuntimeConfig};
pub use error::RuntimeError;
pub use logging::{LoggingBuilder, SpanEvents};
pub use worker::Worker;

// Re-exported so downstream binaries can log without a direct `tracing` dependency.
pub use tracing;
pub use tracing_subscriber;
