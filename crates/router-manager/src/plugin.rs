use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use router_core::{BoxFuture, Event, EventFilter, HookError};

use crate::context::{PluginContext, PluginLoadContext};

/// A plugin's dispatch discipline.
///
/// The upstream system this was modeled on named these modes `"async"` /
/// `"sync"`, which collides with unrelated async/await terminology: the
/// router waits for *every* matched plugin's invocation to return regardless
/// of this value — the distinction is only about whether the plugin's own
/// external side effects (its HTTP calls) are fire-and-forget or
/// awaited-with-retry. This enum is named for that distinction instead of
/// reusing the ambiguous upstream terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// The plugin's own side effects are fire-and-forget. Dispatched in
    /// Phase A, ahead of every `Blocking` plugin.
    FireAndForget,
    /// The plugin waits for its own side effects before returning.
    /// Dispatched in Phase B, after every `FireAndForget` plugin has
    /// returned.
    Blocking,
}

/// Where a [`DispatchMode::Blocking`] plugin actually runs. Meaningless for `FireAndForget` plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Runs inline, in-process, as part of Phase B. The default.
    #[default]
    Inline,
    /// Declared but intentionally unimplemented: the router logs a warning and skips dispatch
    /// entirely for plugins in this strategy.
    Worker,
}

/// Informational metadata attached to a plugin descriptor. None of these fields affect dispatch except
/// `execution_strategy`.
#[derive(Debug, Clone, Default)]
pub struct PluginMetadata {
    pub version: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub execution_strategy: ExecutionStrategy,
    /// Informational duration hint, e.g. for dashboards. Never enforced as
    /// a timeout.
    pub duration_hint: Option<Duration>,
}

/// Lifecycle hook invoked once by [`crate::PluginManager::init`].
///
/// A record of an optional function value rather than a trait method: a plugin that declares no `init` behavior simply has `None` here.
pub type InitHook = Arc<dyn Fn(PluginLoadContext) -> BoxFuture<'static, Result<(), HookError>> + Send + Sync>;

/// Lifecycle hook invoked once by [`crate::PluginManager::destroy`]. Its
/// failures are logged and swallowed, so it has no `Result`.
pub type DestroyHook = Arc<dyn Fn(PluginLoadContext) -> BoxFuture<'static, ()> + Send + Sync>;

/// Dispatch hook shape shared by `onEvent`, `onReplay`, and `onDLQ` — all three take the same `(Event, PluginContext)` signature and
/// differ only in which one the manager selects for a given `Trigger*` call.
pub type EventHook = Arc<dyn Fn(Event, PluginContext) -> BoxFuture<'static, Result<(), HookError>> + Send + Sync>;

/// `onError` hook, invoked with the captured error, the event that caused
/// it, and a fresh context. Failures inside it are logged and
/// swallowed, so it has no `Result`.
pub type ErrorHook = Arc<dyn Fn(HookError, Event, PluginContext) -> BoxFuture<'static, ()> + Send + Sync>;

/// A registered unit of behavior.
///
/// Constructed via [`PluginBuilder`]; cheap to clone (every field is either
/// `Copy`, an `Arc`, or small owned data) since [`crate::PluginManager`]
/// hands out independent clones for concurrent dispatch.
#[derive(Clone)]
pub struct Plugin {
    name: Arc<str>,
    mode: DispatchMode,
    events: EventFilter,
    metadata: PluginMetadata,
    init: Option<InitHook>,
    destroy: Option<DestroyHook>,
    on_event: Option<EventHook>,
    on_replay: Option<EventHook>,
    on_dlq: Option<EventHook>,
    on_error: Option<ErrorHook>,
}

impl Plugin {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub fn events(&self) -> &EventFilter {
        &self.events
    }

    pub fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    pub(crate) fn matches(&self, event_name: &str) -> bool {
        self.events.matches(event_name)
    }

    pub(crate) fn init_hook(&self) -> Option<&InitHook> {
        self.init.as_ref()
    }

    pub(crate) fn destroy_hook(&self) -> Option<&DestroyHook> {
        self.destroy.as_ref()
    }

    pub(crate) fn on_event_hook(&self) -> Option<&EventHook> {
        self.on_event.as_ref()
    }

    /// The hook `TriggerReplay` invokes: `on_replay` if declared, falling
    /// back to `on_event` otherwise.
    pub(crate) fn on_replay_hook(&self) -> Option<&EventHook> {
        self.on_replay.as_ref().or(self.on_event.as_ref())
    }

    pub(crate) fn on_dlq_hook(&self) -> Option<&EventHook> {
        self.on_dlq.as_ref()
    }

    pub(crate) fn on_error_hook(&self) -> Option<&ErrorHook> {
        self.on_error.as_ref()
    }
}

/// Builder for [`Plugin`]. Every hook is optional; omitted hooks are simply
/// never invoked for this plugin.
pub struct PluginBuilder {
    name: Arc<str>,
    mode: DispatchMode,
    events: EventFilter,
    metadata: PluginMetadata,
    init: Option<InitHook>,
    destroy: Option<DestroyHook>,
    on_event: Option<EventHook>,
    on_replay: Option<EventHook>,
    on_dlq: Option<EventHook>,
    on_error: Option<ErrorHook>,
}

impl PluginBuilder {
    pub fn new(name: impl Into<String>, mode: DispatchMode) -> Self {
        Self {
            name: Arc::from(name.into()),
            mode,
            events: EventFilter::All,
            metadata: PluginMetadata::default(),
            init: None,
            destroy: None,
            on_event: None,
            on_replay: None,
            on_dlq: None,
            on_error: None,
        }
    }

    pub fn events(mut self, events: EventFilter) -> Self {
        self.events = events;
        self
    }

    pub fn metadata(mut self, metadata: PluginMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn on_init<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(PluginLoadContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.init = Some(Arc::new(move |ctx| Box::pin(f(ctx))));
        self
    }

    pub fn on_destroy<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(PluginLoadContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.destroy = Some(Arc::new(move |ctx| Box::pin(f(ctx))));
        self
    }

    pub fn on_event<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Event, PluginContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.on_event = Some(Arc::new(move |event, ctx| Box::pin(f(event, ctx))));
        self
    }

    pub fn on_replay<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Event, PluginContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.on_replay = Some(Arc::new(move |event, ctx| Box::pin(f(event, ctx))));
        self
    }

    pub fn on_dlq<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Event, PluginContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.on_dlq = Some(Arc::new(move |event, ctx| Box::pin(f(event, ctx))));
        self
    }

    pub fn on_error<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(HookError, Event, PluginContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_error = Some(Arc::new(move |err, event, ctx| Box::pin(f(err, event, ctx))));
        self
    }

    pub fn build(self) -> Plugin {
        Plugin {
            name: self.name,
            mode: self.mode,
            events: self.events,
            metadata: self.metadata,
            init: self.init,
            destroy: self.destroy,
            on_event: self.on_event,
            on_replay: self.on_replay,
            on_dlq: self.on_dlq,
            on_error: self.on_error,
        }
    }
}
