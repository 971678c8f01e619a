use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The unit of work flowing through the router.
///
/// Events are produced by ingestion adapters outside this crate's scope and
/// are never mutated once constructed — every stage of the pipeline reads an
/// `Event` by reference or clones it, never writes through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Caller-assigned identifier. When present, used as the deduplication
    /// and storage key. Events without an `id` are never deduplicated or
    /// stored; they still flow through plugin dispatch.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,

    /// Logical event type, e.g. `"order.created"`. Used for plugin matching.
    pub name: String,

    /// Origin identifier.
    pub source: String,

    /// Arbitrary nested value. The router never inspects this.
    pub data: serde_json::Value,

    /// Producer-declared event time. Defaults to the router's wall clock at
    /// store time when absent.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp: Option<DateTime<Utc>>,

    /// Free-form metadata (region, account, resources, ...).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub attributes: Option<HashMap<String, serde_json::Value>>,
}

/// Raised by [`Event::new`] / [`EventBuilder::build`] when an invariant is violated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventError {
    /// `name` was empty.
    #[error("event name must not be empty")]
    EmptyName,
    /// `source` was empty.
    #[error("event source must not be empty")]
    EmptySource,
}

impl Event {
    /// Creates an event, checking its invariants (non-empty `name` and `source`).
    ///
    /// `data` defaults to `Value::Null` when not supplied via [`EventBuilder`];
    /// the router treats a present-but-empty structured value as satisfying
    /// the "data is present" invariant, so `Null` and `{}` are both valid.
    pub fn new(
        id: Option<String>,
        name: impl Into<String>,
        source: impl Into<String>,
        data: serde_json::Value,
    ) -> Result<Self, EventError> {
        EventBuilder::new(name, source).id_opt(id).data(data).build()
    }

    /// The key used to index this event in per-phase error maps:
    /// `id` when present, otherwise `name`.
    ///
    /// Two distinct events sharing the same `name` and both lacking an `id`
    /// collide on this key — a known, accepted latent issue.
    pub fn error_key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }

    /// Returns `true` if this event carries a caller-assigned identifier,
    /// and is therefore eligible for deduplication and durable storage.
    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }
}

/// Builder for [`Event`], validating invariants at `build()` time.
#[derive(Debug, Clone, Default)]
pub struct EventBuilder {
    id: Option<String>,
    name: String,
    source: String,
    data: serde_json::Value,
    timestamp: Option<DateTime<Utc>>,
    attributes: Option<HashMap<String, serde_json::Value>>,
}

impl EventBuilder {
    /// Starts a builder with the required `name` and `source` fields.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            source: source.into(),
            data: serde_json::Value::Null,
            timestamp: None,
            attributes: None,
        }
    }

    /// Sets the caller-assigned identifier.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the caller-assigned identifier, or clears it when `None`.
    pub fn id_opt(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    /// Sets the opaque data payload.
    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Sets the producer-declared event time.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the free-form attribute map.
    pub fn attributes(mut self, attributes: HashMap<String, serde_json::Value>) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Validates and constructs the [`Event`].
    pub fn build(self) -> Result<Event, EventError> {
        if self.name.is_empty() {
            return Err(EventError::EmptyName);
        }
        if self.source.is_empty() {
            return Err(EventError::EmptySource);
        }
        Ok(Event {
            id: self.id,
            name: self.name,
            source: self.source,
            data: self.data,
            timestamp: self.timestamp,
            attributes: self.attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_name() {
        let err = Event::new(None, "", "s", serde_json::json!({})).unwrap_err();
        assert_eq!(err, EventError::EmptyName);
    }

    #[test]
    fn rejects_empty_source() {
        let err = Event::new(None, "x", "", serde_json::json!({})).unwrap_err();
        assert_eq!(err, EventError::EmptySource);
    }

    #[test]
    fn error_key_prefers_id() {
        let with_id = Event::new(Some("a".into()), "x", "s", serde_json::json!({})).unwrap();
        assert_eq!(with_id.error_key(), "a");

        let without_id = Event::new(None, "x", "s", serde_json::json!({})).unwrap();
        assert_eq!(without_id.error_key(), "x");
    }

    #[test]
    fn builder_defaults_data_to_null() {
        let event = EventBuilder::new("x", "s").build().unwrap();
        assert_eq!(event.data, serde_json::Value::Null);
    }
}
