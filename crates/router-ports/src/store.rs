use std::collections::HashMap;
use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DedupError, StoreError};

/// Lifecycle status recorded alongside a stored event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Every matched plugin completed without error.
    Processed,
    /// Recorded for completeness; the router itself never writes this status,
    /// but replay tooling built on this store is expected to use it.
    Failed,
    /// Written by replay tooling after a successful `TriggerReplay` pass.
    Replayed,
}

/// The flat record the router upserts for every successfully processed event
/// that carries an `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_name: String,
    pub source: String,
    pub data: serde_json::Value,
    pub status: EventStatus,
    pub processed_at: DateTime<Utc>,
    pub retry_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<HashMap<String, serde_json::Value>>,
    /// Absolute epoch-seconds expiry, computed by the router from
    /// `RouterConfig::ttl_days`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
}

/// The durable record store the router deduplicates against and writes
/// successful events to.
///
/// Implementations MUST tolerate a single `batch_check_duplicates` call for
/// as many ids as the router's configured `batch_size` allows; an adapter
/// whose backend caps batch size lower than that chunks internally and
/// aggregates results (see [`crate::fakes`] for a reference chunking
/// strategy an HTTP/database adapter can imitate).
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns the subset of `ids` already present in `table_name`.
    async fn batch_check_duplicates(
        &self,
        table_name: &str,
        ids: &[String],
    ) -> Result<HashSet<String>, DedupError>;

    /// Upserts `record` keyed by `record.event_id` into `table_name`.
    async fn store_event(&self, table_name: &str, record: EventRecord) -> Result<(), StoreError>;
}
