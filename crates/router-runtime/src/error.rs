use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by the illustrative worker and runtime wiring in this
/// crate. Distinct from [`router_engine::CriticalBatchError`], which is
/// `process_batch`'s own narrow error type — this one also covers
/// configuration failures that occur before a single batch is ever run.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Batch(#[from] router_engine::CriticalBatchError),
}
