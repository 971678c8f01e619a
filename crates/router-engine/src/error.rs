use router_manager::ManagerError;
use thiserror::Error;

/// The only error `EventRouter::process_batch` can return.
///
/// Every other error kind in the taxonomy — hook, dedup, store, DLQ — is
/// isolated inside `process_batch` and only observable through logs; this
/// type exists for the remainder: failures that mean the batch pipeline
/// itself could not run and the caller should request whole-batch
/// redelivery.
#[derive(Debug, Error)]
pub enum CriticalBatchError {
    /// The plugin manager rejected dispatch for a reason other than a
    /// per-plugin hook failure (today, only `ManagerError::NotInitialized`
    /// is reachable from `process_batch` — the manager is not populated or
    /// mutated mid-batch).
    #[error("plugin manager precondition failed: {0}")]
    Manager(#[from] ManagerError),
}
