//! Plugin registry and lifecycle/dispatch controller for the event router.
//!
//! [`PluginManager`] owns the plugin registry, drives `init`/`destroy`
//! lifecycle hooks, and dispatches events to matching plugins concurrently
//! with per-plugin error isolation. [`router_engine`](https://docs.rs/router-engine)
//! is the only other crate that should call `Trigger*` directly — plugin
//! authors interact with this crate only through the [`PluginContext`]
//! they're handed.

mod context;
mod error;
mod manager;
mod plugin;

pub use context::{EmitHandle, PluginContext, PluginLoadContext, PluginLogger};
pub use error::ManagerError;
pub use manager::PluginManager;
pub use plugin::{
    DestroyHook, DispatchMode, ErrorHook, EventHook, ExecutionStrategy, InitHook, Plugin, PluginBuilder, PluginMetadata,
};
