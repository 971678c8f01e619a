//! The batch processor: deduplication,
//! plugin-mode grouping, phased dispatch through [`router_manager`],
//! success/failure partitioning, durable storage, and DLQ emission.

mod config;
mod envelope;
mod error;
mod router;

pub use config::RouterConfig;
pub use envelope::{FailureDetail, FailureEnvelope};
pub use error::CriticalBatchError;
pub use router::{BatchOutcome, EventRouter, EventRouterBuilder};
