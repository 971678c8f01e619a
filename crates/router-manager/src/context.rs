use std::sync::Arc;

use router_core::Event;
use router_ports::{HttpCapability, Metrics};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::manager::PluginManager;

/// The write-only `{debug, info, warn, error}` logging capability handed to
/// every plugin invocation.
///
/// Every call is tagged with the owning plugin's name so log lines can be
/// attributed without the plugin author having to repeat it. `fields` mirror
/// `tracing`'s structured-argument convention: pass `serde_json::Value::Null`
/// (or just use the non-`_fields` method) when there is nothing structured to
/// attach.
#[derive(Clone)]
pub struct PluginLogger {
    plugin: Arc<str>,
}

impl PluginLogger {
    pub(crate) fn new(plugin: Arc<str>) -> Self {
        Self { plugin }
    }

    pub fn debug(&self, message: &str) {
        debug!(plugin = %self.plugin, "{message}");
    }

    pub fn debug_fields(&self, message: &str, fields: Value) {
        debug!(plugin = %self.plugin, fields = %fields, "{message}");
    }

    pub fn info(&self, message: &str) {
        info!(plugin = %self.plugin, "{message}");
    }

    pub fn info_fields(&self, message: &str, fields: Value) {
        info!(plugin = %self.plugin, fields = %fields, "{message}");
    }

    pub fn warn(&self, message: &str) {
        warn!(plugin = %self.plugin, "{message}");
    }

    pub fn warn_fields(&self, message: &str, fields: Value) {
        warn!(plugin = %self.plugin, fields = %fields, "{message}");
    }

    pub fn error(&self, message: &str) {
        error!(plugin = %self.plugin, "{message}");
    }

    pub fn error_fields(&self, message: &str, fields: Value) {
        error!(plugin = %self.plugin, fields = %fields, "{message}");
    }
}

/// The `config` scoped to a single plugin's `name` within the manager-level
/// config map. Also doubles as the value handed to `init`/`destroy`
/// hooks, which have no event to dispatch against.
#[derive(Debug, Clone)]
pub struct PluginLoadContext {
    config: Value,
}

impl Default for PluginLoadContext {
    fn default() -> Self {
        Self::new(Value::Object(serde_json::Map::new()))
    }
}

impl PluginLoadContext {
    pub(crate) fn new(config: Value) -> Self {
        Self { config }
    }

    /// This plugin's config section, or `Value::Null` when the manager's
    /// config map has no entry under its name.
    pub fn config(&self) -> &Value {
        &self.config
    }
}

/// A detached handle to re-enter the owning [`PluginManager`] from within a
/// plugin hook.
#[derive(Clone)]
pub struct EmitHandle {
    manager: PluginManager,
}

impl EmitHandle {
    pub(crate) fn new(manager: PluginManager) -> Self {
        Self { manager }
    }

    /// Schedules `event` for dispatch through the owning manager as a
    /// detached task. The caller does not wait for it; any error surfacing
    /// from the emitted dispatch is logged, never propagated.
    ///
    /// Cycles of emissions are the plugin author's responsibility — the
    /// manager performs no cycle detection.
    pub fn emit(&self, event: Event) {
        let manager = self.manager.clone();
        tokio::spawn(async move {
            if let Err(err) = manager.trigger_event(&event, None).await {
                error!(event = %event.error_key(), error = %err, "emitted event dispatch failed");
            }
        });
    }
}

/// The value passed to every `onEvent` / `onReplay` / `onDLQ` / `onError`
/// invocation.
///
/// Built fresh per dispatch by [`PluginManager`] — nothing here is shared
/// mutable state except through the capabilities it wraps (`http`,
/// `metrics`, `emit`), which are themselves safe under concurrent use.
#[derive(Clone)]
pub struct PluginContext {
    logger: PluginLogger,
    config: Value,
    http: Option<HttpCapability>,
    metrics: Option<Arc<dyn Metrics>>,
    emit: EmitHandle,
}

impl PluginContext {
    pub(crate) fn new(
        plugin: Arc<str>,
        config: Value,
        http: Option<HttpCapability>,
        metrics: Option<Arc<dyn Metrics>>,
        manager: PluginManager,
    ) -> Self {
        Self {
            logger: PluginLogger::new(plugin),
            config,
            http,
            metrics,
            emit: EmitHandle::new(manager),
        }
    }

    pub fn logger(&self) -> &PluginLogger {
        &self.logger
    }

    pub fn config(&self) -> &Value {
        &self.config
    }

    pub fn http(&self) -> Option<&HttpCapability> {
        self.http.as_ref()
    }

    pub fn metrics(&self) -> Option<&Arc<dyn Metrics>> {
        self.metrics.as_ref()
    }

    pub fn emit(&self, event: Event) {
        self.emit.emit(event);
    }
}
