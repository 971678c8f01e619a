use router_core::HookError;
use thiserror::Error;

/// Errors raised by [`crate::PluginManager`] operations.
///
/// Per-plugin hook failures are *not* represented
/// here — they never leave `Trigger*` as an `Err` on this type; the manager
/// only ever returns one of the variants below, covering precondition
/// failures and plugin init failures.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// `Register`/`RegisterAll` named a plugin that already exists in the
    /// registry.
    #[error("plugin '{0}' is already registered")]
    DuplicatePlugin(String),

    /// `Trigger*` was called before `Init` completed successfully.
    #[error("plugin manager must be initialized before dispatching events")]
    NotInitialized,

    /// A plugin's `init` hook returned an error; `Init` aborts and this is
    /// propagated to the caller. Per-plugin init
    /// state is not rolled back.
    #[error("plugin '{plugin}' failed to initialize: {source}")]
    InitFailed {
        plugin: String,
        #[source]
        source: HookError,
    },

    /// At least one matched plugin's dispatch hook returned an error during
    /// a `Trigger*` call.
    ///
    /// This does *not* mean dispatch aborted early — every matched plugin
    /// was still invoked; this is the first captured
    /// error, surfaced so [`router_engine`](https://docs.rs/router-engine)
    /// can key it into its per-phase error map. It is a reporting channel,
    /// not a propagate-and-stop signal.
    #[error("plugin dispatch failed: {0}")]
    DispatchFailed(#[source] HookError),
}
