/// The optional metrics capability injected into a plugin's context.
///
/// Informational — nothing in the router's own pipeline depends on a
/// metric being recorded. A plugin author reaches for this the same way
/// they reach for `logger`: to emit an observation, not to affect control
/// flow.
pub trait Metrics: Send + Sync {
    /// Increments a named counter by `value`.
    fn increment(&self, name: &str, value: u64);

    /// Records an observed duration against a named histogram/timer.
    fn record_duration(&self, name: &str, duration: std::time::Duration);
}

/// A [`Metrics`] implementation that discards every observation. The
/// default when a caller does not wire up a real metrics backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl Metrics for NoopMetrics {
    fn increment(&self, _name: &str, _value: u64) {}
    fn record_duration(&self, _name: &str, _duration: std::time::Duration) {}
}
