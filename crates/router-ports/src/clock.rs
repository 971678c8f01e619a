use chrono::{DateTime, Utc};

/// An injectable source of the current instant.
///
/// Grounded on the router's repeated references to "now" for
/// `processed_at` / `ttl` / envelope timestamps: production code uses
/// [`SystemClock`], tests inject a fixed or stepping fake so assertions on
/// timestamps are deterministic.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock. The default [`Clock`] for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
