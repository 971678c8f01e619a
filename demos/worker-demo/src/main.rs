//! Event Router Worker Demo
//!
//! Wires the plugin manager, batch pipeline, and queue-driven worker together
//! over in-memory collaborators, so the whole pipeline can be exercised
//! without a real queue, store, or DLQ.
//!
//! # Running the demo
//!
//! ```bash
//! cargo run --package worker-demo
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use router::prelude::*;
use router_ports::fakes::{raw_message, InMemoryDlq, InMemoryQueue, InMemoryStore};

#[tokio::main]
async fn main() -> Result<()> {
    router_runtime::logging::init();

    // Loads `router.yaml` / `config.yaml` from the current directory if
    // present, falling back to documented defaults otherwise.
    let config = router_runtime::config::load_config()?;

    let manager = PluginManager::new(config.plugins.clone(), None, None);

    // A fire-and-forget plugin: logs every event without blocking Phase B.
    manager
        .register(
            PluginBuilder::new("audit-log", DispatchMode::FireAndForget)
                .events(EventFilter::All)
                .on_event(|event, ctx| async move {
                    ctx.logger().info(&format!("observed event: {}", event.name));
                    Ok(())
                })
                .build(),
        )
        .await?;

    // A blocking plugin scoped to a single event name: rejects events whose
    // payload has no "amount" field, demonstrating DLQ routing.
    manager
        .register(
            PluginBuilder::new("order-validator", DispatchMode::Blocking)
                .events(EventFilter::names(["order.created"]))
                .on_event(|event, ctx| async move {
                    if event.data.get("amount").is_none() {
                        return Err("order.created event is missing an \"amount\" field".into());
                    }
                    ctx.logger().info("order validated");
                    Ok(())
                })
                .build(),
        )
        .await?;

    manager.init().await?;

    let store = Arc::new(InMemoryStore::new());
    let dlq = Arc::new(InMemoryDlq::new());
    let router_config = config.router.clone().into_router_config();
    let router = Arc::new(
        EventRouter::builder(manager, store.clone(), router_config)
            .dlq(dlq.clone())
            .build(),
    );

    let queue = Arc::new(InMemoryQueue::new());
    let valid_order = Event::new(
        Some("order-1".to_string()),
        "order.created",
        "storefront",
        serde_json::json!({ "amount": 4200 }),
    )?;
    let invalid_order = Event::new(
        Some("order-2".to_string()),
        "order.created",
        "storefront",
        serde_json::json!({}),
    )?;
    queue.push(raw_message("handle-1", &valid_order));
    queue.push(raw_message("handle-2", &invalid_order));

    let worker = Worker::new(queue, router, config.router.batch_size);
    worker.run_once().await?;

    println!("stored events:   {}", store.stored_records().len());
    println!("dlq entries:     {}", dlq.all_entries().len());

    // A second pass over an empty queue demonstrates the poll-and-idle path.
    tokio::time::sleep(Duration::from_millis(10)).await;
    worker.run_once().await?;

    Ok(())
}
