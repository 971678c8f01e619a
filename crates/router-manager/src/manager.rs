use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use router_core::{Event, HookError};
use router_ports::{HttpCapability, Metrics};
use serde_json::Value;
use tracing::{error, warn};

use crate::context::{PluginContext, PluginLoadContext};
use crate::error::ManagerError;
use crate::plugin::{EventHook, Plugin};

/// Which dispatch hook a `Trigger*` call should invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerKind {
    Event,
    Replay,
    Dlq,
}

/// An owned, `Display`-only stand-in for a hook error whose original value
/// was moved into `on_error` — the manager only needs to carry the message
/// forward into its own aggregated [`HookError`] result.
#[derive(Debug)]
struct CapturedError(String);

impl std::fmt::Display for CapturedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for CapturedError {}

struct Inner {
    plugins: tokio::sync::RwLock<HashMap<String, Plugin>>,
    plugin_configs: HashMap<String, Value>,
    initialized: AtomicBool,
    http: Option<HttpCapability>,
    metrics: Option<Arc<dyn Metrics>>,
}

/// Registry and lifecycle/dispatch controller for plugins.
///
/// Cheap to clone — it is an `Arc` handle over its shared state, which is
/// what lets [`crate::context::EmitHandle`] hold one to re-enter the manager
/// from inside a plugin hook.
#[derive(Clone)]
pub struct PluginManager {
    inner: Arc<Inner>,
}

impl PluginManager {
    /// Creates an empty, uninitialized manager.
    ///
    /// `plugin_configs` maps plugin name to the config section handed to
    /// that plugin's hooks; plugins with no
    /// entry receive `Value::Null`. `http` and `metrics` are the optional
    /// capabilities shared across every dispatched context.
    pub fn new(
        plugin_configs: HashMap<String, Value>,
        http: Option<HttpCapability>,
        metrics: Option<Arc<dyn Metrics>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                plugins: tokio::sync::RwLock::new(HashMap::new()),
                plugin_configs,
                initialized: AtomicBool::new(false),
                http,
                metrics,
            }),
        }
    }

    fn config_for(&self, name: &str) -> Value {
        self.inner
            .plugin_configs
            .get(name)
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()))
    }

    fn make_context(&self, name: &str) -> PluginContext {
        PluginContext::new(
            Arc::from(name),
            self.config_for(name),
            self.inner.http.clone(),
            self.inner.metrics.clone(),
            self.clone(),
        )
    }

    /// Registers a single plugin. Fails if a plugin with the same name is
    /// already registered.
    pub async fn register(&self, plugin: Plugin) -> Result<(), ManagerError> {
        let mut plugins = self.inner.plugins.write().await;
        if plugins.contains_key(plugin.name()) {
            return Err(ManagerError::DuplicatePlugin(plugin.name().to_string()));
        }
        plugins.insert(plugin.name().to_string(), plugin);
        Ok(())
    }

    /// Registers each plugin in order. The first name collision aborts the
    /// remainder — plugins registered earlier in this call stay registered.
    pub async fn register_all(&self, plugins: impl IntoIterator<Item = Plugin>) -> Result<(), ManagerError> {
        for plugin in plugins {
            self.register(plugin).await?;
        }
        Ok(())
    }

    /// Returns a clone of the named plugin's descriptor, if registered.
    pub async fn get_plugin(&self, name: &str) -> Option<Plugin> {
        self.inner.plugins.read().await.get(name).cloned()
    }

    /// Returns the names of every registered plugin, in no particular order.
    pub async fn list_plugins(&self) -> Vec<String> {
        self.inner.plugins.read().await.keys().cloned().collect()
    }

    /// Returns a clone of every registered plugin's descriptor. Used by
    /// `router-engine` to group a batch's events by dispatch mode without
    /// re-locking the registry per plugin.
    pub async fn all_plugins(&self) -> Vec<Plugin> {
        self.inner.plugins.read().await.values().cloned().collect()
    }

    /// Returns `true` once `init` has completed successfully.
    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::Acquire)
    }

    /// Runs every registered plugin's `init` hook concurrently and waits for
    /// all of them.
    ///
    /// Idempotent-with-warning: calling this again after a successful `init`
    /// logs a warning and returns `Ok(())` without re-running anything. If
    /// any hook fails, the whole call fails with that error; hooks that
    /// already ran are **not** rolled back.
    pub async fn init(&self) -> Result<(), ManagerError> {
        if self.is_initialized() {
            warn!("PluginManager already initialized; Init is a no-op");
            return Ok(());
        }

        let plugins: Vec<Plugin> = self.inner.plugins.read().await.values().cloned().collect();

        let tasks = plugins.into_iter().filter_map(|plugin| {
            let hook = plugin.init_hook()?.clone();
            let name = plugin.name().to_string();
            let ctx = PluginLoadContext::new(self.config_for(&name));
            Some(tokio::spawn(async move {
                let result = hook(ctx).await;
                (name, result)
            }))
        });

        let results = join_all(tasks).await;

        let mut first_error = None;
        for joined in results {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((name, Err(source))) => {
                    error!(plugin = %name, error = %source, "plugin init hook failed");
                    first_error.get_or_insert(ManagerError::InitFailed { plugin: name, source });
                }
                Err(join_err) => {
                    error!(error = %join_err, "plugin init task panicked");
                }
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }

        self.inner.initialized.store(true, Ordering::Release);
        Ok(())
    }

    /// Invokes every registered plugin's `destroy` hook concurrently,
    /// clears the registry, and resets to the pre-init state. Never fails —
    /// individual hook failures are logged and swallowed.
    pub async fn destroy(&self) {
        let plugins: Vec<Plugin> = self.inner.plugins.read().await.values().cloned().collect();

        let tasks = plugins.into_iter().filter_map(|plugin| {
            let hook = plugin.destroy_hook()?.clone();
            let name = plugin.name().to_string();
            let ctx = PluginLoadContext::new(self.config_for(&name));
            Some(tokio::spawn(async move {
                hook(ctx).await;
                name
            }))
        });

        for joined in join_all(tasks).await {
            if let Err(join_err) = joined {
                error!(error = %join_err, "plugin destroy task panicked");
            }
        }

        self.inner.plugins.write().await.clear();
        self.inner.initialized.store(false, Ordering::Release);
    }

    /// Invokes `onEvent` on every plugin matching `event` (and, if given,
    /// present in `plugin_names`).
    pub async fn trigger_event(&self, event: &Event, plugin_names: Option<&[String]>) -> Result<(), ManagerError> {
        self.dispatch(TriggerKind::Event, event, plugin_names).await
    }

    /// Invokes `onReplay` on every matching plugin, falling back to
    /// `onEvent` for plugins that declare no `onReplay`.
    pub async fn trigger_replay(&self, event: &Event, plugin_names: Option<&[String]>) -> Result<(), ManagerError> {
        self.dispatch(TriggerKind::Replay, event, plugin_names).await
    }

    /// Invokes `onDLQ` on every matching plugin that declares it. No
    /// fallback.
    pub async fn trigger_dlq(&self, event: &Event, plugin_names: Option<&[String]>) -> Result<(), ManagerError> {
        self.dispatch(TriggerKind::Dlq, event, plugin_names).await
    }

    async fn dispatch(
        &self,
        kind: TriggerKind,
        event: &Event,
        plugin_names: Option<&[String]>,
    ) -> Result<(), ManagerError> {
        if !self.is_initialized() {
            return Err(ManagerError::NotInitialized);
        }

        let matched: Vec<(Plugin, EventHook)> = self
            .inner
            .plugins
            .read()
            .await
            .values()
            .filter(|plugin| {
                plugin_names.is_none_or(|names| names.iter().any(|n| n == plugin.name())) && plugin.matches(&event.name)
            })
            .filter_map(|plugin| {
                let hook = match kind {
                    TriggerKind::Event => plugin.on_event_hook(),
                    TriggerKind::Replay => plugin.on_replay_hook(),
                    TriggerKind::Dlq => plugin.on_dlq_hook(),
                }?;
                Some((plugin.clone(), hook.clone()))
            })
            .collect();

        let tasks = matched.into_iter().map(|(plugin, hook)| {
            let event = event.clone();
            let ctx = self.make_context(plugin.name());
            let on_error = plugin.on_error_hook().cloned();
            let name = plugin.name().to_string();
            let error_ctx = self.make_context(plugin.name());
            tokio::spawn(async move {
                match hook(event.clone(), ctx).await {
                    Ok(()) => Ok(()),
                    Err(err) => {
                        error!(plugin = %name, event = %event.error_key(), error = %err, "plugin hook failed");
                        let message = err.to_string();
                        if let Some(on_error) = on_error {
                            on_error(err, event, error_ctx).await;
                        }
                        Err(CapturedError(message))
                    }
                }
            })
        });

        let results = join_all(tasks).await;

        let mut first_error = None;
        for joined in results {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    first_error.get_or_insert(HookError::from(err));
                }
                Err(join_err) => {
                    error!(error = %join_err, "plugin dispatch task panicked");
                    first_error.get_or_insert(HookError::from(CapturedError(join_err.to_string())));
                }
            }
        }

        match first_error {
            Some(err) => Err(ManagerError::DispatchFailed(err)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    use router_core::{Event, EventFilter};

    use super::*;
    use crate::plugin::{DispatchMode, PluginBuilder};

    fn event(name: &str) -> Event {
        Event::new(None, name, "s", serde_json::json!({})).unwrap()
    }

    #[tokio::test]
    async fn trigger_before_init_is_a_precondition_error() {
        let manager = PluginManager::new(HashMap::new(), None, None);
        let err = manager.trigger_event(&event("x"), None).await.unwrap_err();
        assert!(matches!(err, ManagerError::NotInitialized));
    }

    #[tokio::test]
    async fn duplicate_registration_fails() {
        let manager = PluginManager::new(HashMap::new(), None, None);
        let make = || PluginBuilder::new("p", DispatchMode::FireAndForget).build();
        manager.register(make()).await.unwrap();
        let err = manager.register(make()).await.unwrap_err();
        assert!(matches!(err, ManagerError::DuplicatePlugin(name) if name == "p"));
    }

    #[tokio::test]
    async fn init_is_idempotent_with_warning() {
        let manager = PluginManager::new(HashMap::new(), None, None);
        manager.init().await.unwrap();
        assert!(manager.is_initialized());
        manager.init().await.unwrap();
    }

    #[tokio::test]
    async fn matching_plugin_is_invoked_and_non_matching_is_not() {
        let calls = Arc::new(AtomicUsize::new(0));
        let manager = PluginManager::new(HashMap::new(), None, None);

        let hit = calls.clone();
        manager
            .register(
                PluginBuilder::new("hit", DispatchMode::FireAndForget)
                    .events(EventFilter::names(["x"]))
                    .on_event(move |_event, _ctx| {
                        let hit = hit.clone();
                        async move {
                            hit.fetch_add(1, AtomicOrdering::SeqCst);
                            Ok(())
                        }
                    })
                    .build(),
            )
            .await
            .unwrap();

        manager
            .register(
                PluginBuilder::new("miss", DispatchMode::FireAndForget)
                    .events(EventFilter::names(["y"]))
                    .on_event(|_event, _ctx| async { panic!("should never be invoked") })
                    .build(),
            )
            .await
            .unwrap();

        manager.init().await.unwrap();
        manager.trigger_event(&event("x"), None).await.unwrap();

        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn one_plugin_failing_does_not_stop_another() {
        let calls = Arc::new(AtomicUsize::new(0));
        let manager = PluginManager::new(HashMap::new(), None, None);

        manager
            .register(
                PluginBuilder::new("fails", DispatchMode::FireAndForget)
                    .on_event(|_event, _ctx| async { Err("boom".into()) })
                    .build(),
            )
            .await
            .unwrap();

        let survives = calls.clone();
        manager
            .register(
                PluginBuilder::new("survives", DispatchMode::FireAndForget)
                    .on_event(move |_event, _ctx| {
                        let survives = survives.clone();
                        async move {
                            survives.fetch_add(1, AtomicOrdering::SeqCst);
                            Ok(())
                        }
                    })
                    .build(),
            )
            .await
            .unwrap();

        manager.init().await.unwrap();
        let err = manager.trigger_event(&event("x"), None).await.unwrap_err();
        assert!(matches!(err, ManagerError::DispatchFailed(_)));
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn replay_falls_back_to_on_event_when_on_replay_absent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let manager = PluginManager::new(HashMap::new(), None, None);

        let hit = calls.clone();
        manager
            .register(
                PluginBuilder::new("p", DispatchMode::FireAndForget)
                    .on_event(move |_event, _ctx| {
                        let hit = hit.clone();
                        async move {
                            hit.fetch_add(1, AtomicOrdering::SeqCst);
                            Ok(())
                        }
                    })
                    .build(),
            )
            .await
            .unwrap();

        manager.init().await.unwrap();
        manager.trigger_replay(&event("x"), None).await.unwrap();

        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn on_error_hook_is_invoked_on_failure() {
        let error_seen = Arc::new(AtomicUsize::new(0));
        let manager = PluginManager::new(HashMap::new(), None, None);

        let seen = error_seen.clone();
        manager
            .register(
                PluginBuilder::new("p", DispatchMode::FireAndForget)
                    .on_event(|_event, _ctx| async { Err("boom".into()) })
                    .on_error(move |_err, _event, _ctx| {
                        let seen = seen.clone();
                        async move {
                            seen.fetch_add(1, AtomicOrdering::SeqCst);
                        }
                    })
                    .build(),
            )
            .await
            .unwrap();

        manager.init().await.unwrap();
        let _ = manager.trigger_event(&event("x"), None).await;

        assert_eq!(error_seen.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn destroy_resets_to_uninitialized_and_empty() {
        let manager = PluginManager::new(HashMap::new(), None, None);
        manager
            .register(PluginBuilder::new("p", DispatchMode::FireAndForget).build())
            .await
            .unwrap();
        manager.init().await.unwrap();

        manager.destroy().await;

        assert!(!manager.is_initialized());
        assert!(manager.list_plugins().await.is_empty());
    }
}
