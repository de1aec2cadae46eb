//! Configuration file support for research-digest.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `RESEARCH_DIGEST__<SECTION>__<KEY>` environment overrides, then the
//! conventional credential variables for anything still unset.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api_keys]
//! github_token = "ghp_..."
//! product_hunt = "your-product-hunt-key"
//! twitter_bearer_token = "AAAA..."
//!
//! [document_storage]
//! client_id = "..."
//! client_secret = "..."
//! refresh_token = "..."
//! folder_id = "..."
//!
//! [rate_limits]
//! papers_per_minute = 30
//! repositories_per_minute = 30
//! products_per_minute = 20
//! tweets_per_minute = 15
//!
//! [http]
//! timeout_secs = 15
//!
//! [research]
//! days_back = 7
//! max_papers = 10
//! concurrent = true
//!
//! [logging]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};

use super::Config;

/// Name of the configuration file looked up in default locations
const CONFIG_FILE_NAME: &str = "research-digest.toml";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    /// Required credentials are absent
    #[error("Missing required configuration: {}", .0.join(", "))]
    MissingRequired(Vec<String>),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Load configuration from an optional file plus the environment
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::Io(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix("RESEARCH_DIGEST")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: Config = settings.try_deserialize()?;
    Ok(config.with_env_credentials())
}

/// Look for a configuration file in the working directory, then the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("research-digest").join("config.toml"))
        .filter(|path| path.is_file())
}

/// Write a configuration file populated with defaults
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(&Config::default())
        .map_err(|e| ConfigError::Serialize(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
    }

    std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
}
