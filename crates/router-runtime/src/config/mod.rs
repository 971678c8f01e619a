mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, load_config};
pub use schema::{LoggingConfig, RouterSectionConfig, RuntimeConfig};
