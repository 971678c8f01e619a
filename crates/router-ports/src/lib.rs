//! Collaborator interfaces for the event router core.
//!
//! Everything in this crate is an interface the router depends on but does
//! not implement: the durable [`Store`], the [`DlqSink`], the [`Clock`], the
//! retrying [`HttpCapability`] handed to plugins, and the [`QueueSource`]
//! the illustrative worker in `router-runtime` pulls batches from. Concrete
//! cloud bindings are out of scope; only in-memory fakes are
//! provided here, gated behind the `test-support` feature.

mod clock;
mod dlq;
mod error;
mod http;
mod metrics;
mod queue;
mod store;

#[cfg(feature = "test-support")]
pub mod fakes;

pub use clock::{Clock, SystemClock};
pub use dlq::{DlqEntry, DlqSink};
pub use error::{DedupError, DlqError, StoreError};
pub use http::HttpCapability;
pub use metrics::{Metrics, NoopMetrics};
pub use queue::{ParsedMessage, QueueSource, RawMessage};
pub use store::{EventRecord, EventStatus, Store};
