use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use router_core::{Event, HookError};
use router_manager::{DispatchMode, ExecutionStrategy, ManagerError, PluginManager};
use router_ports::{Clock, DlqEntry, DlqSink, EventRecord, EventStatus, Store, SystemClock};
use tracing::{error, info, warn};

use crate::config::RouterConfig;
use crate::envelope::{FailureDetail, FailureEnvelope};
use crate::error::CriticalBatchError;

/// Outcome counters for a completed `process_batch` call. Informational only
/// — the pipeline's authoritative effects are the store writes, DLQ sends,
/// and log lines it produced along the way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub succeeded: usize,
    pub failed: usize,
}

/// An event paired with the names of the plugins that should receive it in
/// a given dispatch phase.
struct DispatchGroup {
    event: Event,
    plugins: Vec<String>,
}

/// The batch processor. Orchestrates
/// deduplication, plugin-mode grouping, phased dispatch, success/failure
/// partitioning, durable storage, and DLQ emission for one batch at a time.
///
/// Stateless across calls beyond its collaborators — safe to share behind
/// an `Arc` and call `process_batch` concurrently from multiple upstream
/// workers.
pub struct EventRouter {
    manager: PluginManager,
    store: Arc<dyn Store>,
    dlq: Option<Arc<dyn DlqSink>>,
    clock: Arc<dyn Clock>,
    config: RouterConfig,
}

impl EventRouter {
    pub fn builder(manager: PluginManager, store: Arc<dyn Store>, config: RouterConfig) -> EventRouterBuilder {
        EventRouterBuilder::new(manager, store, config)
    }

    /// Runs the seven-step pipeline over `events`.
    ///
    /// Returns `Ok` whenever the pipeline completed, regardless of how many
    /// individual events failed — those are reflected by DLQ emission and
    /// logs, never by this method's `Result`. An `Err`
    /// means a precondition failed and the caller should treat the whole
    /// batch as undelivered.
    pub async fn process_batch(&self, events: Vec<Event>) -> Result<BatchOutcome, CriticalBatchError> {
        let start = self.clock.now();
        info!(count = events.len(), "Processing batch of {} events", events.len());

        if events.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let unique = self.deduplicate(events).await;
        if unique.is_empty() {
            info!("All events are duplicates, skipping processing");
            return Ok(BatchOutcome::default());
        }
        info!("After deduplication: {} unique events", unique.len());

        let (async_groups, sync_inline_groups, sync_worker_groups) = self.group_by_mode(&unique).await;

        if !sync_worker_groups.is_empty() {
            let worker_invocations: usize = sync_worker_groups.iter().map(|g| g.plugins.len()).sum();
            warn!(
                "Worker invocation not implemented; {} invocations skipped",
                worker_invocations
            );
        }

        let mut errors: HashMap<String, HookError> = HashMap::new();

        let async_invocations: usize = async_groups.iter().map(|g| g.plugins.len()).sum();
        let async_event_count = async_groups.len();
        self.dispatch_phase(&async_groups, &mut errors).await?;
        info!(
            "Executed {async_invocations} async plugin invocations across {async_event_count} events"
        );

        // Phase A must fully join before Phase B starts — enforced simply by sequencing the two
        // `.await`s rather than running them concurrently.
        self.dispatch_phase(&sync_inline_groups, &mut errors).await?;

        let (succeeded, failed): (Vec<Event>, Vec<Event>) =
            unique.into_iter().partition(|event| !errors.contains_key(event.error_key()));

        let succeeded_count = succeeded.len();
        let failed_count = failed.len();

        self.store_succeeded(&succeeded).await;

        if !failed.is_empty() {
            self.send_to_dlq(&failed, &errors).await;
        }

        let elapsed_ms = (self.clock.now() - start).num_milliseconds().max(0);
        info!(
            "Batch completed: {succeeded_count} succeeded, {failed_count} failed in {elapsed_ms} ms"
        );

        Ok(BatchOutcome {
            succeeded: succeeded_count,
            failed: failed_count,
        })
    }

    /// Step 1 — drops events whose `id` the store reports as already
    /// present; falls back to treating every event as unique if the dedup
    /// call itself fails.
    async fn deduplicate(&self, events: Vec<Event>) -> Vec<Event> {
        let with_id: Vec<String> = events.iter().filter_map(|event| event.id.clone()).collect();
        if with_id.is_empty() {
            return events;
        }

        match self.store.batch_check_duplicates(&self.config.events_table_name, &with_id).await {
            Ok(duplicates) => {
                if !duplicates.is_empty() {
                    info!("Found {} duplicate events", duplicates.len());
                }
                events
                    .into_iter()
                    .filter(|event| event.id.as_deref().map(|id| !duplicates.contains(id)).unwrap_or(true))
                    .collect()
            }
            Err(err) => {
                error!(error = %err, "Batch deduplication failed, falling back to treating all events as unique");
                events
            }
        }
    }

    /// Step 2 — for every unique event, consults the registered plugins'
    /// dispatch mode and execution strategy to build the three dispatch
    /// lists.
    async fn group_by_mode(&self, events: &[Event]) -> (Vec<DispatchGroup>, Vec<DispatchGroup>, Vec<DispatchGroup>) {
        let plugins = self.manager.all_plugins().await;

        let mut async_groups = Vec::new();
        let mut sync_inline_groups = Vec::new();
        let mut sync_worker_groups = Vec::new();

        for event in events {
            let mut async_plugins = Vec::new();
            let mut inline_plugins = Vec::new();
            let mut worker_plugins = Vec::new();

            for plugin in &plugins {
                if !plugin.events().matches(&event.name) {
                    continue;
                }
                match (plugin.mode(), plugin.metadata().execution_strategy) {
                    (DispatchMode::FireAndForget, _) => async_plugins.push(plugin.name().to_string()),
                    (DispatchMode::Blocking, ExecutionStrategy::Inline) => inline_plugins.push(plugin.name().to_string()),
                    (DispatchMode::Blocking, ExecutionStrategy::Worker) => worker_plugins.push(plugin.name().to_string()),
                }
            }

            if !async_plugins.is_empty() {
                async_groups.push(DispatchGroup { event: event.clone(), plugins: async_plugins });
            }
            if !inline_plugins.is_empty() {
                sync_inline_groups.push(DispatchGroup { event: event.clone(), plugins: inline_plugins });
            }
            if !worker_plugins.is_empty() {
                sync_worker_groups.push(DispatchGroup { event: event.clone(), plugins: worker_plugins });
            }
        }

        (async_groups, sync_inline_groups, sync_worker_groups)
    }

    /// Dispatches every group in `groups` concurrently via
    /// `PluginManager::trigger_event`, joins them, and folds any
    /// `DispatchFailed` into `errors` keyed by `Event::error_key`. Any other
    /// error (today, only `NotInitialized`) is critical and short-circuits.
    async fn dispatch_phase(
        &self,
        groups: &[DispatchGroup],
        errors: &mut HashMap<String, HookError>,
    ) -> Result<(), CriticalBatchError> {
        let futures = groups.iter().map(|group| {
            let manager = self.manager.clone();
            let event = group.event.clone();
            let plugin_names = group.plugins.clone();
            async move {
                let result = manager.trigger_event(&event, Some(&plugin_names)).await;
                (event, result)
            }
        });

        for (event, result) in join_all(futures).await {
            match result {
                Ok(()) => {}
                Err(ManagerError::DispatchFailed(hook_error)) => {
                    errors.insert(event.error_key().to_string(), hook_error);
                }
                Err(other) => return Err(CriticalBatchError::from(other)),
            }
        }

        Ok(())
    }

    /// Step 6 — upserts every succeeded event carrying an `id`, concurrently.
    /// Individual write failures are logged, not reclassified as failed.
    async fn store_succeeded(&self, succeeded: &[Event]) {
        let now = self.clock.now();
        let ttl = (self.config.ttl_days > 0).then(|| now.timestamp() + self.config.ttl_days * 86_400);

        let futures = succeeded.iter().filter(|event| event.has_id()).map(|event| {
            let record = EventRecord {
                event_id: event.id.clone().expect("filtered to has_id()"),
                timestamp: event.timestamp.unwrap_or(now),
                event_name: event.name.clone(),
                source: event.source.clone(),
                data: event.data.clone(),
                status: EventStatus::Processed,
                processed_at: now,
                retry_count: 0,
                attributes: event.attributes.clone(),
                ttl,
            };
            let store = Arc::clone(&self.store);
            let table = self.config.events_table_name.clone();
            async move { store.store_event(&table, record).await }
        });

        let results: Vec<_> = join_all(futures).await;
        if results.is_empty() {
            return;
        }

        let attempted = results.len();
        let failed = results.iter().filter(|r| r.is_err()).count();
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            error!(error = %err, "event store write failed");
        }

        if failed == 0 {
            info!("Stored {attempted} events in {}", self.config.events_table_name);
        } else {
            warn!(
                "Failed to store {failed}/{attempted} events in {}",
                self.config.events_table_name
            );
        }
    }

    /// Step 7 — builds one failure envelope per failed event and sends them
    /// as a single batch. Logs and swallows a DLQ send failure; never
    /// reclassifies or retries.
    async fn send_to_dlq(&self, failed: &[Event], errors: &HashMap<String, HookError>) {
        let (Some(url), Some(dlq)) = (self.config.dlq_url.as_deref(), self.dlq.as_ref()) else {
            warn!("{} events failed but no DLQ configured. Events lost.", failed.len());
            return;
        };

        let now = self.clock.now();
        let entries = failed
            .iter()
            .enumerate()
            .map(|(index, event)| {
                let message = errors
                    .get(event.error_key())
                    .map(|err| err.to_string())
                    .unwrap_or_else(|| "Unknown error".to_string());
                let envelope = FailureEnvelope {
                    event: event.clone(),
                    error: FailureDetail { message, stack: None },
                    timestamp: now,
                };
                DlqEntry {
                    id: index.to_string(),
                    message_body: serde_json::to_string(&envelope).expect("envelope always serializes"),
                }
            })
            .collect::<Vec<_>>();

        match dlq.send_batch(url, entries).await {
            Ok(()) => info!("Sent {} failed events to DLQ", failed.len()),
            Err(err) => error!(error = %err, "failed to send batch to DLQ"),
        }
    }
}

/// Builder for [`EventRouter`]. `dlq` and `clock` default to "unconfigured"
/// and [`SystemClock`] respectively.
pub struct EventRouterBuilder {
    manager: PluginManager,
    store: Arc<dyn Store>,
    dlq: Option<Arc<dyn DlqSink>>,
    clock: Arc<dyn Clock>,
    config: RouterConfig,
}

impl EventRouterBuilder {
    pub fn new(manager: PluginManager, store: Arc<dyn Store>, config: RouterConfig) -> Self {
        Self {
            manager,
            store,
            dlq: None,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    pub fn dlq(mut self, dlq: Arc<dyn DlqSink>) -> Self {
        self.dlq = Some(dlq);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> EventRouter {
        EventRouter {
            manager: self.manager,
            store: self.store,
            dlq: self.dlq,
            clock: self.clock,
            config: self.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{TimeZone, Utc};
    use router_core::{Event, EventFilter};
    use router_manager::{DispatchMode, PluginBuilder};
    use router_ports::fakes::{FixedClock, InMemoryDlq, InMemoryStore};
    use tracing_test::{logs_contain, traced_test};

    use super::*;

    fn fixed_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()))
    }

    fn event(id: &str, name: &str) -> Event {
        Event::new(Some(id.to_string()), name, "test", serde_json::json!({})).unwrap()
    }

    async fn initialized_manager() -> PluginManager {
        let manager = PluginManager::new(HashMap::new(), None, None);
        manager.init().await.unwrap();
        manager
    }

    #[traced_test]
    #[tokio::test]
    async fn three_fresh_events_one_async_plugin_all_succeed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let manager = initialized_manager().await;
        let counter = calls.clone();
        manager
            .register(
                PluginBuilder::new("a", DispatchMode::FireAndForget)
                    .events(EventFilter::names(["x"]))
                    .on_event(move |_event, _ctx| {
                        let counter = counter.clone();
                        async move {
                            counter.fetch_add(1, Ordering::SeqCst);
                            Ok(())
                        }
                    })
                    .build(),
            )
            .await
            .unwrap();

        let store = Arc::new(InMemoryStore::new());
        let router = EventRouter::builder(manager, store.clone(), RouterConfig::new("events"))
            .clock(fixed_clock())
            .build();

        let outcome = router
            .process_batch(vec![event("a", "x"), event("b", "x"), event("c", "x")])
            .await
            .unwrap();

        assert_eq!(outcome, BatchOutcome { succeeded: 3, failed: 0 });
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(store.stored_records().len(), 3);
        assert!(logs_contain("After deduplication: 3 unique events"));
        assert!(logs_contain("Batch completed: 3 succeeded, 0 failed"));
    }

    #[traced_test]
    #[tokio::test]
    async fn one_duplicate_is_filtered_and_logged() {
        let manager = initialized_manager().await;
        manager
            .register(
                PluginBuilder::new("a", DispatchMode::FireAndForget)
                    .events(EventFilter::names(["x"]))
                    .on_event(|_event, _ctx| async move { Ok(()) })
                    .build(),
            )
            .await
            .unwrap();

        let store = Arc::new(InMemoryStore::new().with_known_ids(["b".to_string()]));
        let router = EventRouter::builder(manager, store.clone(), RouterConfig::new("events"))
            .clock(fixed_clock())
            .build();

        let outcome = router
            .process_batch(vec![event("a", "x"), event("b", "x"), event("c", "x")])
            .await
            .unwrap();

        assert_eq!(outcome, BatchOutcome { succeeded: 2, failed: 0 });
        assert!(logs_contain("Found 1 duplicate events"));
    }

    #[traced_test]
    #[tokio::test]
    async fn mixed_async_and_sync_failures_go_to_dlq() {
        let manager = initialized_manager().await;
        manager
            .register(
                PluginBuilder::new("async-plugin", DispatchMode::FireAndForget)
                    .events(EventFilter::names(["x"]))
                    .on_event(|event, _ctx| async move {
                        if event.id.as_deref() == Some("a") {
                            Err("async plugin failed on a".into())
                        } else {
                            Ok(())
                        }
                    })
                    .build(),
            )
            .await
            .unwrap();
        manager
            .register(
                PluginBuilder::new("sync-plugin", DispatchMode::Blocking)
                    .events(EventFilter::names(["x"]))
                    .on_event(|event, _ctx| async move {
                        if event.id.as_deref() == Some("b") {
                            Err("sync plugin failed on b".into())
                        } else {
                            Ok(())
                        }
                    })
                    .build(),
            )
            .await
            .unwrap();

        let store = Arc::new(InMemoryStore::new());
        let dlq = Arc::new(InMemoryDlq::new());
        let router = EventRouter::builder(manager, store.clone(), RouterConfig::new("events").with_dlq_url("dlq://test"))
            .dlq(dlq.clone())
            .clock(fixed_clock())
            .build();

        let outcome = router
            .process_batch(vec![event("a", "x"), event("b", "x"), event("c", "x")])
            .await
            .unwrap();

        assert_eq!(outcome, BatchOutcome { succeeded: 1, failed: 2 });
        assert_eq!(store.stored_records().len(), 1);
        assert_eq!(store.stored_records()[0].event_id, "c");

        let dlq_ids: Vec<String> = dlq
            .all_entries()
            .iter()
            .map(|entry| {
                let parsed: serde_json::Value = serde_json::from_str(&entry.message_body).unwrap();
                parsed["event"]["id"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(dlq_ids.len(), 2);
        assert!(dlq_ids.contains(&"a".to_string()));
        assert!(dlq_ids.contains(&"b".to_string()));
        assert!(logs_contain("1 succeeded, 2 failed"));
    }

    #[traced_test]
    #[tokio::test]
    async fn dedup_failure_falls_back_to_treating_all_as_unique() {
        let manager = initialized_manager().await;
        manager
            .register(
                PluginBuilder::new("a", DispatchMode::FireAndForget)
                    .events(EventFilter::names(["x"]))
                    .on_event(|_event, _ctx| async move { Ok(()) })
                    .build(),
            )
            .await
            .unwrap();

        let store = Arc::new(InMemoryStore::new());
        store.fail_dedup_calls();
        let router = EventRouter::builder(manager, store.clone(), RouterConfig::new("events"))
            .clock(fixed_clock())
            .build();

        let outcome = router.process_batch(vec![event("a", "x"), event("b", "x")]).await.unwrap();

        assert_eq!(outcome, BatchOutcome { succeeded: 2, failed: 0 });
        assert_eq!(store.stored_records().len(), 2);
        assert!(logs_contain("Batch deduplication failed, falling back"));
    }

    #[traced_test]
    #[tokio::test]
    async fn unconfigured_dlq_logs_and_drops_events() {
        let manager = initialized_manager().await;
        manager
            .register(
                PluginBuilder::new("a", DispatchMode::FireAndForget)
                    .events(EventFilter::names(["x"]))
                    .on_event(|_event, _ctx| async move { Err("boom".into()) })
                    .build(),
            )
            .await
            .unwrap();

        let store = Arc::new(InMemoryStore::new());
        let router = EventRouter::builder(manager, store.clone(), RouterConfig::new("events"))
            .clock(fixed_clock())
            .build();

        let outcome = router.process_batch(vec![event("a", "x")]).await.unwrap();

        assert_eq!(outcome, BatchOutcome { succeeded: 0, failed: 1 });
        assert!(store.stored_records().is_empty());
        assert!(logs_contain("events failed but no DLQ configured. Events lost."));
    }

    #[traced_test]
    #[tokio::test]
    async fn event_without_id_is_dispatched_but_never_stored() {
        let calls = Arc::new(AtomicUsize::new(0));
        let manager = initialized_manager().await;
        let counter = calls.clone();
        manager
            .register(
                PluginBuilder::new("a", DispatchMode::FireAndForget)
                    .events(EventFilter::names(["x"]))
                    .on_event(move |_event, _ctx| {
                        let counter = counter.clone();
                        async move {
                            counter.fetch_add(1, Ordering::SeqCst);
                            Ok(())
                        }
                    })
                    .build(),
            )
            .await
            .unwrap();

        let store = Arc::new(InMemoryStore::new());
        let router = EventRouter::builder(manager, store.clone(), RouterConfig::new("events"))
            .clock(fixed_clock())
            .build();

        let without_id = Event::new(None, "x", "test", serde_json::json!({})).unwrap();
        let outcome = router.process_batch(vec![without_id]).await.unwrap();

        assert_eq!(outcome, BatchOutcome { succeeded: 1, failed: 0 });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(store.stored_records().is_empty());
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let manager = initialized_manager().await;
        let store = Arc::new(InMemoryStore::new());
        let router = EventRouter::builder(manager, store.clone(), RouterConfig::new("events"))
            .clock(fixed_clock())
            .build();

        let outcome = router.process_batch(vec![]).await.unwrap();
        assert_eq!(outcome, BatchOutcome::default());
        assert!(store.stored_records().is_empty());
    }
}
