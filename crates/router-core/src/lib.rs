//! Shared contract types for the event router core.
//!
//! This crate defines the vocabulary that the plugin manager
//! ([`router-manager`](https://docs.rs/router-manager)) and the event router
//! ([`router-engine`](https://docs.rs/router-engine)) both speak: the
//! [`Event`] value type, the [`EventFilter`] sum type used for plugin-to-event
//! matching, and the hook error alias shared across both layers.
//!
//! Nothing in this crate is async or performs I/O — it is pure data.

mod error;
mod event;
mod filter;
mod future;

pub use error::HookError;
pub use event::{Event, EventBuilder, EventError};
pub use filter::EventFilter;
pub use future::BoxFuture;
