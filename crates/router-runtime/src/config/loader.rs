//! YAML configuration file loader, modeled on the framework's own
//! `ConfigLoader`: search a list of directories for a known filename, expand
//! `${VAR}` / `${VAR:-default}` references, then parse.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::error::{ConfigError, ConfigResult};
use super::schema::RuntimeConfig;

const CONFIG_NAMES: &[&str] = &["router.yaml", "router.yml", "config.yaml", "config.yml"];

/// Locates and parses a [`RuntimeConfig`] from YAML.
pub struct ConfigLoader {
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { search_paths: Vec::new() }
    }

    pub fn add_search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn with_current_dir(self) -> Self {
        if let Ok(cwd) = std::env::current_dir() {
            self.add_search_path(cwd)
        } else {
            self
        }
    }

    pub fn with_user_config_dir(self) -> Self {
        if let Some(config_dir) = dirs::config_dir() {
            self.add_search_path(config_dir.join("router"))
        } else {
            self
        }
    }

    /// Loads from the first matching file in the search paths, falling back
    /// to `RuntimeConfig::default()` if none is found.
    pub fn load(&self) -> ConfigResult<RuntimeConfig> {
        if let Some(path) = self.find_config_file() {
            return self.load_from_file(&path);
        }
        info!("No configuration file found, using defaults");
        Ok(RuntimeConfig::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<RuntimeConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        self.parse_yaml(&content)
    }

    pub fn load_from_str(&self, yaml: &str) -> ConfigResult<RuntimeConfig> {
        self.parse_yaml(yaml)
    }

    fn find_config_file(&self) -> Option<PathBuf> {
        for search_path in &self.search_paths {
            for name in CONFIG_NAMES {
                let path = search_path.join(name);
                debug!("Checking for config file: {}", path.display());
                if path.exists() {
                    info!("Found configuration file: {}", path.display());
                    return Some(path);
                }
            }
        }
        None
    }

    fn parse_yaml(&self, content: &str) -> ConfigResult<RuntimeConfig> {
        let expanded = expand_env_vars(content);
        let config: RuntimeConfig = serde_yaml::from_str(&expanded).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new().with_current_dir().with_user_config_dir()
    }
}

/// Expands `${VAR_NAME}` / `${VAR_NAME:-default}` references against the
/// process environment.
fn expand_env_vars(content: &str) -> String {
    let mut result = content.to_string();
    let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(:-([^}]*))?\}").unwrap();

    for cap in re.captures_iter(content) {
        let full_match = cap.get(0).unwrap().as_str();
        let var_name = cap.get(1).unwrap().as_str();
        let default_value = cap.get(3).map(|m| m.as_str());

        let value = std::env::var(var_name).ok().or_else(|| default_value.map(String::from)).unwrap_or_default();

        result = result.replace(full_match, &value);
    }

    result
}

/// Convenience function: loads configuration with default search paths.
pub fn load_config() -> ConfigResult<RuntimeConfig> {
    ConfigLoader::default().load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = ConfigLoader::new().load_from_str("").unwrap();
        assert_eq!(config.router.events_table_name, "events");
        assert_eq!(config.router.batch_size, 50);
    }

    #[test]
    fn parses_router_section() {
        let yaml = r#"
router:
  events_table_name: my-events
  dlq_url: "https://dlq.example/queue"
  batch_size: 25
  ttl_days: 7
"#;
        let config = ConfigLoader::new().load_from_str(yaml).unwrap();
        assert_eq!(config.router.events_table_name, "my-events");
        assert_eq!(config.router.dlq_url.as_deref(), Some("https://dlq.example/queue"));
        assert_eq!(config.router.batch_size, 25);
        assert_eq!(config.router.ttl_days, 7);
    }

    #[test]
    fn expands_env_var_with_default() {
        let yaml = r#"
router:
  dlq_url: "${NONEXISTENT_ROUTER_DLQ_VAR:-https://fallback.example}"
"#;
        let config = ConfigLoader::new().load_from_str(yaml).unwrap();
        assert_eq!(config.router.dlq_url.as_deref(), Some("https://fallback.example"));
    }

    #[test]
    fn expands_env_var_from_process_environment() {
        // SAFETY: single-threaded test body, var is process-unique.
        unsafe { std::env::set_var("ROUTER_TEST_TABLE_NAME", "env-events") };
        let yaml = r#"
router:
  events_table_name: "${ROUTER_TEST_TABLE_NAME}"
"#;
        let config = ConfigLoader::new().load_from_str(yaml).unwrap();
        assert_eq!(config.router.events_table_name, "env-events");
        // SAFETY: single-threaded test body.
        unsafe { std::env::remove_var("ROUTER_TEST_TABLE_NAME") };
    }

    #[test]
    fn parses_plugin_sections() {
        let yaml = r#"
plugins:
  audit-log:
    verbose: true
"#;
        let config = ConfigLoader::new().load_from_str(yaml).unwrap();
        assert_eq!(config.plugins["audit-log"]["verbose"], serde_json::json!(true));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ConfigLoader::new().load_from_file("/nonexistent/router.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn empty_events_table_name_is_rejected() {
        let yaml = r#"
router:
  events_table_name: ""
"#;
        let err = ConfigLoader::new().load_from_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let yaml = r#"
router:
  batch_size: 0
"#;
        let err = ConfigLoader::new().load_from_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
