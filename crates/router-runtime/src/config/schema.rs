//! Configuration schema loaded from YAML.
//!
//! ```yaml
//! router:
//!   events_table_name: events
//!   dlq_url: ${DLQ_URL:-}
//!   batch_size: 50
//!   ttl_days: 30
//! logging:
//!   level: info
//! plugins:
//!   audit-log:
//!     verbose: true
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RuntimeConfig {
    pub router: RouterSectionConfig,
    pub logging: LoggingConfig,
    /// Per-plugin config sections, handed to [`router_manager::PluginManager::new`]
    /// verbatim as each plugin's `PluginContext::config`.
    #[serde(default)]
    pub plugins: HashMap<String, serde_json::Value>,
}

impl RuntimeConfig {
    /// Validates the fields a router config must have to be usable: a
    /// non-empty `events_table_name` and a `batch_size` greater than zero.
    /// Called by [`super::ConfigLoader`] right after parsing, so a malformed
    /// file is rejected before any plugin or router code sees it.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.router.events_table_name.trim().is_empty() {
            return Err(ConfigError::Invalid("router.events_table_name must not be empty".to_string()));
        }
        if self.router.batch_size == 0 {
            return Err(ConfigError::Invalid("router.batch_size must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Mirrors [`router_engine::RouterConfig`]'s fields, with every field
/// optional so a config file only needs to override what it cares about.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSectionConfig {
    pub events_table_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dlq_url: Option<String>,
    pub batch_size: usize,
    pub ttl_days: i64,
}

impl Default for RouterSectionConfig {
    fn default() -> Self {
        Self {
            events_table_name: "events".to_string(),
            dlq_url: None,
            batch_size: router_engine::RouterConfig::DEFAULT_BATCH_SIZE,
            ttl_days: router_engine::RouterConfig::DEFAULT_TTL_DAYS,
        }
    }
}

impl RouterSectionConfig {
    /// Converts this section into the [`router_engine::RouterConfig`] the
    /// engine crate actually consumes.
    pub fn into_router_config(self) -> router_engine::RouterConfig {
        let mut config = router_engine::RouterConfig::new(self.events_table_name)
            .with_batch_size(self.batch_size)
            .with_ttl_days(self.ttl_days);
        if let Some(dlq_url) = self.dlq_url {
            config = config.with_dlq_url(dlq_url);
        }
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}
