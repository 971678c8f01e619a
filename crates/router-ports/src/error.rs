use thiserror::Error;

/// Type-erased error from a concrete adapter implementation (HTTP client,
/// database driver, queue client, ...). Mirrors [`router_core::HookError`] —
/// the port boundary doesn't know or care about the adapter's real error type.
pub type BoxBackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Raised by [`Store::batch_check_duplicates`](crate::Store::batch_check_duplicates).
///
/// A dedup failure is logged by the router and treated as "all events
/// unique" — the router never matches on this type, it only needs
/// `Display` for the log line.
#[derive(Debug, Error)]
#[error("deduplication query failed: {0}")]
pub struct DedupError(BoxBackendError);

/// Raised by [`Store::store_event`](crate::Store::store_event).
#[derive(Debug, Error)]
#[error("event store write failed: {0}")]
pub struct StoreError(BoxBackendError);

/// Raised by [`DlqSink::send_batch`](crate::DlqSink::send_batch).
#[derive(Debug, Error)]
#[error("DLQ batch send failed: {0}")]
pub struct DlqError(BoxBackendError);

impl DedupError {
    /// Wraps any adapter error as a [`DedupError`].
    pub fn new(err: impl Into<BoxBackendError>) -> Self {
        Self(err.into())
    }
}

impl StoreError {
    /// Wraps any adapter error as a [`StoreError`].
    pub fn new(err: impl Into<BoxBackendError>) -> Self {
        Self(err.into())
    }
}

impl DlqError {
    /// Wraps any adapter error as a [`DlqError`].
    pub fn new(err: impl Into<BoxBackendError>) -> Self {
        Self(err.into())
    }
}
