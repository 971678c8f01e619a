use chrono::{DateTime, Utc};
use router_core::Event;
use serde::Serialize;

/// The structured failure record attached to a DLQ envelope.
#[derive(Debug, Clone, Serialize)]
pub struct FailureDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// One entry's serialized payload sent to `DlqSink::send_batch`. The
/// original event is carried unmodified.
#[derive(Debug, Clone, Serialize)]
pub struct FailureEnvelope {
    pub event: Event,
    pub error: FailureDetail,
    pub timestamp: DateTime<Utc>,
}
