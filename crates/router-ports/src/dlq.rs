use async_trait::async_trait;

use crate::error::DlqError;

/// One message handed to [`DlqSink::send_batch`].
///
/// `id` is an opaque, per-call-unique string; `message_body` is the serialized failure
/// envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DlqEntry {
    pub id: String,
    pub message_body: String,
}

/// The dead-letter sink failed events are forwarded to.
///
/// Implementations MUST accept at least the router's configured
/// `batch_size` in one call and MUST surface partial failures (some entries
/// rejected) as `Err` — the router has no way to tell which entries failed,
/// so it treats any error as "the whole batch may be lost" and only logs.
#[async_trait]
pub trait DlqSink: Send + Sync {
    async fn send_batch(&self, url: &str, entries: Vec<DlqEntry>) -> Result<(), DlqError>;
}
