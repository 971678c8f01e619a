//! In-memory fakes for the collaborator ports, available under the
//! `test-support` feature.
//!
//! These are deliberately simple — they exist so `router-engine` and
//! `router-manager` tests can exercise the real pipeline end-to-end without
//! pulling in a database or queue client, the same way a hosting framework's
//! own test modules construct in-process stand-ins rather than mocking every
//! collaborator call individually.

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use router_core::Event;

use crate::clock::Clock;
use crate::dlq::{DlqEntry, DlqSink};
use crate::error::{DedupError, DlqError, StoreError};
use crate::queue::{QueueSource, RawMessage};
use crate::store::{EventRecord, Store};

/// An in-memory [`Store`] backed by a `Mutex`-guarded set of known ids and a
/// vec of stored records.
///
/// `dedup_chunk_size` reproduces the backend-cap-chunking behaviour a real
/// store adapter needs: a single `batch_check_duplicates` call larger than
/// the chunk size is split, and a chunk-level failure degrades to per-id
/// lookups (here: the configured single failing id still returns as "not
/// duplicate" rather than failing the whole call) when `fail_on_ids` names
/// individual ids rather than the whole method.
#[derive(Default)]
pub struct InMemoryStore {
    known_ids: Mutex<HashSet<String>>,
    records: Mutex<Vec<EventRecord>>,
    /// When set, every `batch_check_duplicates` call fails with this error
    /// instead of returning a result — used to exercise the router's
    /// dedup-failure fallback.
    fail_dedup: Mutex<bool>,
    /// When set, every `store_event` call fails.
    fail_store: Mutex<bool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with ids that should be reported as duplicates.
    pub fn with_known_ids(self, ids: impl IntoIterator<Item = String>) -> Self {
        self.known_ids.lock().extend(ids);
        self
    }

    /// Causes every subsequent `batch_check_duplicates` call to fail.
    pub fn fail_dedup_calls(&self) {
        *self.fail_dedup.lock() = true;
    }

    /// Causes every subsequent `store_event` call to fail.
    pub fn fail_store_calls(&self) {
        *self.fail_store.lock() = true;
    }

    /// Returns a snapshot of every record written via `store_event`.
    pub fn stored_records(&self) -> Vec<EventRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn batch_check_duplicates(
        &self,
        _table_name: &str,
        ids: &[String],
    ) -> Result<HashSet<String>, DedupError> {
        if *self.fail_dedup.lock() {
            return Err(DedupError::new("simulated dedup failure"));
        }
        let known = self.known_ids.lock();
        Ok(ids.iter().filter(|id| known.contains(*id)).cloned().collect())
    }

    async fn store_event(&self, _table_name: &str, record: EventRecord) -> Result<(), StoreError> {
        if *self.fail_store.lock() {
            return Err(StoreError::new("simulated store failure"));
        }
        self.known_ids.lock().insert(record.event_id.clone());
        self.records.lock().push(record);
        Ok(())
    }
}

/// An in-memory [`DlqSink`] that records every batch it receives.
#[derive(Default)]
pub struct InMemoryDlq {
    batches: Mutex<Vec<Vec<DlqEntry>>>,
    fail: Mutex<bool>,
}

impl InMemoryDlq {
    pub fn new() -> Self {
        Self::default()
    }

    /// Causes every subsequent `send_batch` call to fail.
    pub fn fail_sends(&self) {
        *self.fail.lock() = true;
    }

    /// Returns every batch sent so far, in call order.
    pub fn sent_batches(&self) -> Vec<Vec<DlqEntry>> {
        self.batches.lock().clone()
    }

    /// Flattens all batches into a single list of entries, for assertions
    /// that don't care about batch boundaries.
    pub fn all_entries(&self) -> Vec<DlqEntry> {
        self.batches.lock().iter().flatten().cloned().collect()
    }
}

#[async_trait]
impl DlqSink for InMemoryDlq {
    async fn send_batch(&self, _url: &str, entries: Vec<DlqEntry>) -> Result<(), DlqError> {
        if *self.fail.lock() {
            return Err(DlqError::new("simulated DLQ failure"));
        }
        self.batches.lock().push(entries);
        Ok(())
    }
}

/// A [`Clock`] that always returns the same fixed instant, for deterministic
/// assertions on `processed_at` / `ttl` / envelope timestamps.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// An in-memory [`QueueSource`] backed by a `Vec` of pre-loaded messages.
#[derive(Default)]
pub struct InMemoryQueue {
    pending: Mutex<VecDeque<RawMessage>>,
    acked: Mutex<Vec<String>>,
    nacked: Mutex<Vec<String>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes messages onto the tail of the queue for a subsequent
    /// `receive_batch` to pick up.
    pub fn push(&self, message: RawMessage) {
        self.pending.lock().push_back(message);
    }

    pub fn acked_handles(&self) -> Vec<String> {
        self.acked.lock().clone()
    }

    pub fn nacked_handles(&self) -> Vec<String> {
        self.nacked.lock().clone()
    }
}

#[async_trait]
impl QueueSource for InMemoryQueue {
    async fn receive_batch(&self, max_messages: usize) -> Vec<RawMessage> {
        let mut pending = self.pending.lock();
        let n = max_messages.min(pending.len());
        pending.drain(..n).collect()
    }

    async fn ack(&self, receipt_handles: &[String]) {
        self.acked.lock().extend(receipt_handles.iter().cloned());
    }

    async fn nack(&self, receipt_handles: &[String]) {
        self.nacked.lock().extend(receipt_handles.iter().cloned());
    }
}

/// Wraps a constructed event as a ready-to-push [`RawMessage`] sharing an
/// `Arc<str>` receipt handle — a small convenience for tests.
pub fn raw_message(receipt_handle: impl Into<String>, event: &Event) -> RawMessage {
    RawMessage {
        receipt_handle: receipt_handle.into(),
        body: serde_json::to_string(event).expect("event always serializes"),
    }
}

