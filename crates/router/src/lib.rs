//! # Router
//!
//! An event router core for a serverless message-processing pipeline: it
//! consumes batches of application events, de-duplicates them against a
//! durable record store, dispatches each event to user-supplied plugins
//! under fire-and-forget or blocking dispatch discipline, records
//! successful events, and forwards failed events to a dead-letter sink.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐    ┌────────────────┐    ┌───────────────┐
//! │  Worker  │───▶│  EventRouter   │───▶│ PluginManager │──▶ plugin hooks
//! │ (queue)  │    │ (process_batch)│    │  (dispatch)   │
//! └──────────┘    └────────────────┘    └───────────────┘
//!                        │                      │
//!                        ▼                      ▼
//!                  Store / DlqSink        plugin registry
//! ```
//!
//! - **`router-core`**: the `Event` value type, plugin-matching `EventFilter`.
//! - **`router-manager`**: `PluginManager` — registry, lifecycle, dispatch.
//! - **`router-engine`**: `EventRouter` — the seven-step batch pipeline.
//! - **`router-ports`**: collaborator traits (`Store`, `DlqSink`, `Clock`,
//!   `QueueSource`, `HttpCapability`) plus in-memory test fakes.
//! - **`router-runtime`**: YAML config loading, logging setup, and an
//!   illustrative queue-driven worker.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use router::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     router_runtime::logging::init();
//!     let config = router_runtime::config::load_config()?;
//!
//!     let manager = PluginManager::new(config.plugins.clone(), None, None);
//!     manager.register(
//!         PluginBuilder::new("audit-log", DispatchMode::FireAndForget)
//!             .events(EventFilter::All)
//!             .on_event(|event, ctx| async move {
//!                 ctx.logger().info(&format!("received {}", event.name));
//!                 Ok(())
//!             })
//!             .build(),
//!     ).await?;
//!     manager.init().await?;
//!
//!     let router = EventRouter::builder(manager, store, config.router.into_router_config())
//!         .dlq(dlq_sink)
//!         .build();
//!
//!     Worker::new(queue, std::sync::Arc::new(router), 50).run(std::time::Duration::from_secs(1)).await
//! }
//! ```

pub use router_core::*;
pub use router_engine::{BatchOutcome, CriticalBatchError, EventRouter, EventRouterBuilder, RouterConfig};
pub use router_manager::{
    DestroyHook, DispatchMode, EmitHandle, ErrorHook, EventHook, ExecutionStrategy, InitHook, ManagerError, Plugin,
    PluginBuilder, PluginContext, PluginLoadContext, PluginLogger, PluginManager, PluginMetadata,
};
pub use router_ports::{Clock, DlqEntry, DlqSink, EventRecord, EventStatus, HttpCapability, Metrics, ParsedMessage, QueueSource, RawMessage, Store, SystemClock};

pub use router_runtime;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use router_core::{Event, EventBuilder, EventFilter};
    pub use router_engine::{BatchOutcome, EventRouter};
    pub use router_manager::{DispatchMode, ExecutionStrategy, Plugin, PluginBuilder, PluginContext, PluginManager};
    pub use router_ports::{Clock, DlqSink, QueueSource, Store};
    pub use router_runtime::{ConfigLoader, Worker};
}
