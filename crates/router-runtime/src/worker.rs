//! A thin upstream driver wiring a [`QueueSource`] to [`EventRouter::process_batch`].
//!
//! Intentionally minimal: this is an illustrative adapter shape, not
//! a production queue client. Real deployments replace [`QueueSource`] with
//! an adapter over their actual queue (SQS, Pub/Sub, ...) and drive [`Worker::run_once`]
//! from whatever polling loop that backend's client library expects.

use std::sync::Arc;

use router_core::Event;
use router_engine::EventRouter;
use router_ports::{ParsedMessage, QueueSource};
use tracing::{debug, error, info};

/// Drives one [`QueueSource`] against one [`EventRouter`].
pub struct Worker {
    queue: Arc<dyn QueueSource>,
    router: Arc<EventRouter>,
    max_messages: usize,
}

impl Worker {
    pub fn new(queue: Arc<dyn QueueSource>, router: Arc<EventRouter>, max_messages: usize) -> Self {
        Self { queue, router, max_messages }
    }

    /// Receives one batch, parses it, runs it through the router, and
    /// acks/nacks the queue according to the outcome.
    ///
    /// Structurally invalid payloads are dropped from the event list before
    /// dispatch but their receipt handles are still acked on a successful
    /// call — they are skipped silently and never retried, rather than
    /// redelivered.
    pub async fn run_once(&self) -> Result<(), crate::RuntimeError> {
        let batch = self.queue.receive_batch(self.max_messages).await;
        if batch.is_empty() {
            return Ok(());
        }

        let handles: Vec<String> = batch.iter().map(|msg| msg.receipt_handle.clone()).collect();
        let events: Vec<Event> = batch
            .iter()
            .filter_map(|msg| match msg.parse() {
                ParsedMessage::Event(event) => Some(event),
                ParsedMessage::Invalid { reason, .. } => {
                    debug!(error = %reason, "skipping structurally invalid message");
                    None
                }
            })
            .collect();

        match self.router.process_batch(events).await {
            Ok(outcome) => {
                info!(succeeded = outcome.succeeded, failed = outcome.failed, "batch processed");
                self.queue.ack(&handles).await;
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "critical batch failure, requesting whole-batch redelivery");
                self.queue.nack(&handles).await;
                Err(crate::RuntimeError::from(err))
            }
        }
    }

    /// Polls `run_once` in a loop, sleeping `poll_interval` between empty
    /// receives, until `shutdown` resolves.
    pub async fn run_until<F>(&self, poll_interval: std::time::Duration, shutdown: F) -> Result<(), crate::RuntimeError>
    where
        F: std::future::Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => return Ok(()),
                result = self.run_once() => {
                    result?;
                    tokio::time::sleep(poll_interval).await;
                }
            }
        }
    }

    /// Runs until Ctrl+C.
    pub async fn run(&self, poll_interval: std::time::Duration) -> Result<(), crate::RuntimeError> {
        info!("Worker is now running. Press Ctrl+C to stop.");
        self.run_until(poll_interval, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received Ctrl+C, shutting down");
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;
    use router_core::EventFilter;
    use router_engine::RouterConfig;
    use router_manager::{DispatchMode, PluginBuilder, PluginManager};
    use router_ports::fakes::{raw_message, FixedClock, InMemoryQueue, InMemoryStore};

    use super::*;

    #[tokio::test]
    async fn valid_messages_are_processed_and_acked() {
        let manager = PluginManager::new(HashMap::new(), None, None);
        manager.init().await.unwrap();
        manager
            .register(
                PluginBuilder::new("counter", DispatchMode::FireAndForget)
                    .events(EventFilter::names(["order.created"]))
                    .on_event(|_event, _ctx| async move { Ok(()) })
                    .build(),
            )
            .await
            .unwrap();

        let store = Arc::new(InMemoryStore::new());
        let router = Arc::new(
            EventRouter::builder(manager, store.clone(), RouterConfig::new("events"))
                .clock(Arc::new(FixedClock(Utc::now())))
                .build(),
        );

        let queue = Arc::new(InMemoryQueue::new());
        let event = Event::new(Some("e1".into()), "order.created", "test", serde_json::json!({})).unwrap();
        queue.push(raw_message("handle-1", &event));
        queue.push(router_ports::RawMessage { receipt_handle: "handle-2".into(), body: "not json".into() });

        let worker = Worker::new(queue.clone(), router, 10);
        worker.run_once().await.unwrap();

        assert_eq!(store.stored_records().len(), 1);
        assert_eq!(queue.acked_handles(), vec!["handle-1".to_string(), "handle-2".to_string()]);
        assert!(queue.nacked_handles().is_empty());
    }

    #[tokio::test]
    async fn empty_receive_is_a_no_op() {
        let manager = PluginManager::new(HashMap::new(), None, None);
        manager.init().await.unwrap();
        let store = Arc::new(InMemoryStore::new());
        let router = Arc::new(EventRouter::builder(manager, store, RouterConfig::new("events")).build());
        let queue = Arc::new(InMemoryQueue::new());

        let worker = Worker::new(queue.clone(), router, 10);
        worker.run_once().await.unwrap();

        assert!(queue.acked_handles().is_empty());
        assert!(queue.nacked_handles().is_empty());
    }
}
