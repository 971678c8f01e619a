use async_trait::async_trait;
use router_core::Event;

/// One raw message pulled from the upstream queue, before (or instead of)
/// being parsed into an [`Event`].
#[derive(Debug, Clone)]
pub struct RawMessage {
    /// Opaque handle the adapter uses to ack/nack this message.
    pub receipt_handle: String,
    /// Raw message body, expected to deserialize to an [`Event`].
    pub body: String,
}

/// Outcome of parsing one [`RawMessage`].
#[derive(Debug)]
pub enum ParsedMessage {
    /// The body parsed into a well-formed event.
    Event(Event),
    /// The body was structurally invalid and is skipped silently, never
    /// retried.
    Invalid { receipt_handle: String, reason: String },
}

impl RawMessage {
    /// Parses this message's body as a JSON-encoded [`Event`], classifying
    /// failures as [`ParsedMessage::Invalid`] rather than returning an
    /// error — invalid payloads are a routine outcome here, not an
    /// exceptional one.
    pub fn parse(&self) -> ParsedMessage {
        match serde_json::from_str(&self.body) {
            Ok(event) => ParsedMessage::Event(event),
            Err(err) => ParsedMessage::Invalid { receipt_handle: self.receipt_handle.clone(), reason: err.to_string() },
        }
    }
}

/// A source of batches of messages from an at-least-once upstream queue.
///
/// This is the thin ingestion boundary a hosting framework calls an
/// "adapter": it has no opinion on event semantics, only on pulling and
/// acknowledging raw messages. `router-runtime`'s illustrative worker uses
/// an in-memory implementation; a production binary would implement this
/// against a real queue client; no concrete cloud queue client ships here.
#[async_trait]
pub trait QueueSource: Send + Sync {
    /// Pulls up to `max_messages` raw messages.
    async fn receive_batch(&self, max_messages: usize) -> Vec<RawMessage>;

    /// Acknowledges successful processing of the given receipt handles so
    /// the queue does not redeliver them.
    async fn ack(&self, receipt_handles: &[String]);

    /// Explicitly marks the given receipt handles as failed so the queue
    /// redelivers them.
    async fn nack(&self, receipt_handles: &[String]);
}
