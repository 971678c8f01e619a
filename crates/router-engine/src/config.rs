/// Batch-processing configuration for [`crate::EventRouter`].
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Table the router deduplicates against and writes successful events to.
    pub events_table_name: String,
    /// URL of the DLQ queue. `None` means "no DLQ configured".
    pub dlq_url: Option<String>,
    /// Maximum batch size a caller should hand to `process_batch`. The
    /// router itself does not enforce this — it is the contract collaborator
    /// adapters (e.g. the `Store`) size their own chunking against.
    pub batch_size: usize,
    /// Days after which a stored event's `ttl` expires. `0` disables TTL.
    pub ttl_days: i64,
}

impl RouterConfig {
    /// Default `batch_size`.
    pub const DEFAULT_BATCH_SIZE: usize = 50;
    /// Default `ttl_days`.
    pub const DEFAULT_TTL_DAYS: i64 = 30;

    /// Builds a config with no DLQ, `batch_size = 50`, `ttl_days = 30`.
    pub fn new(events_table_name: impl Into<String>) -> Self {
        Self {
            events_table_name: events_table_name.into(),
            dlq_url: None,
            batch_size: Self::DEFAULT_BATCH_SIZE,
            ttl_days: Self::DEFAULT_TTL_DAYS,
        }
    }

    pub fn with_dlq_url(mut self, dlq_url: impl Into<String>) -> Self {
        self.dlq_url = Some(dlq_url.into());
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_ttl_days(mut self, ttl_days: i64) -> Self {
        self.ttl_days = ttl_days;
        self
    }
}
