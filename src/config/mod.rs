//! Configuration management.
//!
//! A single [`Config`] is built at startup and handed to every source adapter;
//! adapters never read the environment themselves.

mod file_config;

pub use file_config::{find_config_file, load_config, write_default_config, ConfigError};

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::ResearchConfig;

/// Conventional environment variables holding credentials.
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_PRODUCT_HUNT_API_KEY: &str = "PRODUCT_HUNT_API_KEY";
pub const ENV_TWITTER_BEARER_TOKEN: &str = "TWITTER_BEARER_TOKEN";
pub const ENV_GOOGLE_CLIENT_ID: &str = "GOOGLE_CLIENT_ID";
pub const ENV_GOOGLE_CLIENT_SECRET: &str = "GOOGLE_CLIENT_SECRET";
pub const ENV_GOOGLE_REFRESH_TOKEN: &str = "GOOGLE_REFRESH_TOKEN";
pub const ENV_NEWSLETTER_FOLDER_ID: &str = "NEWSLETTER_FOLDER_ID";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API keys for the content sources
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// Document-storage credentials
    #[serde(default)]
    pub document_storage: DocumentStorageConfig,

    /// Per-source call budgets
    #[serde(default)]
    pub rate_limits: RateLimitConfig,

    /// Outbound HTTP settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Provider endpoints
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// Batch research defaults
    #[serde(default)]
    pub research: ResearchSettings,

    /// Digest draft settings
    #[serde(default)]
    pub digest: DigestConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Fill credentials that are still unset from the conventional environment
    /// variables (`GITHUB_TOKEN`, `PRODUCT_HUNT_API_KEY`, ...).
    pub fn with_env_credentials(mut self) -> Self {
        fill_from_env(&mut self.api_keys.github_token, ENV_GITHUB_TOKEN);
        fill_from_env(&mut self.api_keys.product_hunt, ENV_PRODUCT_HUNT_API_KEY);
        fill_from_env(&mut self.api_keys.twitter_bearer_token, ENV_TWITTER_BEARER_TOKEN);
        fill_from_env(&mut self.document_storage.client_id, ENV_GOOGLE_CLIENT_ID);
        fill_from_env(&mut self.document_storage.client_secret, ENV_GOOGLE_CLIENT_SECRET);
        fill_from_env(&mut self.document_storage.refresh_token, ENV_GOOGLE_REFRESH_TOKEN);
        fill_from_env(&mut self.document_storage.folder_id, ENV_NEWSLETTER_FOLDER_ID);
        self
    }

    /// Check which credentials are present.
    pub fn validate(&self) -> ConfigReport {
        let mut report = ConfigReport::default();

        let required = [
            (ENV_GOOGLE_CLIENT_ID, &self.document_storage.client_id),
            (ENV_GOOGLE_CLIENT_SECRET, &self.document_storage.client_secret),
            (ENV_GOOGLE_REFRESH_TOKEN, &self.document_storage.refresh_token),
        ];
        let optional = [
            (ENV_NEWSLETTER_FOLDER_ID, &self.document_storage.folder_id),
            (ENV_GITHUB_TOKEN, &self.api_keys.github_token),
            (ENV_PRODUCT_HUNT_API_KEY, &self.api_keys.product_hunt),
            (ENV_TWITTER_BEARER_TOKEN, &self.api_keys.twitter_bearer_token),
        ];

        for (name, value) in required {
            if non_empty(value).is_none() {
                report.missing_required.push(name);
            }
        }
        for (name, value) in optional {
            if non_empty(value).is_none() {
                report.missing_optional.push(name);
            }
        }

        report
    }
}

fn fill_from_env(slot: &mut Option<String>, var: &str) {
    if non_empty(slot).is_some() {
        return;
    }
    if let Ok(value) = std::env::var(var) {
        if !value.trim().is_empty() {
            *slot = Some(value);
        }
    }
}

/// Treat empty strings the same as absent values
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Outcome of [`Config::validate`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigReport {
    pub missing_required: Vec<&'static str>,
    pub missing_optional: Vec<&'static str>,
}

impl ConfigReport {
    /// Whether all required credentials are present
    pub fn is_ok(&self) -> bool {
        self.missing_required.is_empty()
    }

    /// Convert missing required credentials into a [`ConfigError`]
    pub fn into_result(self) -> Result<(), ConfigError> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(ConfigError::MissingRequired(
                self.missing_required.iter().map(|s| s.to_string()).collect(),
            ))
        }
    }

    /// Report the findings to the operator.
    ///
    /// Missing required credentials are logged as errors but do not stop the
    /// process; content tools keep working without document storage.
    pub fn log(&self) {
        if !self.missing_required.is_empty() {
            tracing::error!(
                "Missing REQUIRED configuration: {}",
                self.missing_required.join(", ")
            );
            tracing::error!("Document-storage credentials are required for full functionality; continuing in degraded mode");
        }

        if !self.missing_optional.is_empty() {
            tracing::warn!(
                "Missing optional configuration: {}",
                self.missing_optional.join(", ")
            );
            tracing::warn!("Some sources will be skipped or limited");
        }

        if self.is_ok() {
            tracing::info!("Configuration validation complete");
        }
    }
}

/// API keys for content sources
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiKeys {
    /// Code-host token (optional, raises the search rate limit)
    #[serde(default)]
    pub github_token: Option<String>,

    /// Product-launch API key (source skipped without it)
    #[serde(default)]
    pub product_hunt: Option<String>,

    /// Social-platform bearer token (source skipped without it)
    #[serde(default)]
    pub twitter_bearer_token: Option<String>,
}

/// Document-storage OAuth credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentStorageConfig {
    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Folder that past digests are stored in
    #[serde(default)]
    pub folder_id: Option<String>,
}

/// Calls-per-minute budget for each source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_papers_rpm")]
    pub papers_per_minute: u32,

    #[serde(default = "default_repositories_rpm")]
    pub repositories_per_minute: u32,

    #[serde(default = "default_products_rpm")]
    pub products_per_minute: u32,

    #[serde(default = "default_tweets_rpm")]
    pub tweets_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            papers_per_minute: default_papers_rpm(),
            repositories_per_minute: default_repositories_rpm(),
            products_per_minute: default_products_rpm(),
            tweets_per_minute: default_tweets_rpm(),
        }
    }
}

fn default_papers_rpm() -> u32 {
    30
}

fn default_repositories_rpm() -> u32 {
    30
}

fn default_products_rpm() -> u32 {
    20
}

fn default_tweets_rpm() -> u32 {
    15
}

/// Outbound HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Provider endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_arxiv_url")]
    pub arxiv: String,

    #[serde(default = "default_github_url")]
    pub github: String,

    #[serde(default = "default_product_hunt_url")]
    pub product_hunt: String,

    #[serde(default = "default_twitter_url")]
    pub twitter: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            arxiv: default_arxiv_url(),
            github: default_github_url(),
            product_hunt: default_product_hunt_url(),
            twitter: default_twitter_url(),
        }
    }
}

fn default_arxiv_url() -> String {
    "http://export.arxiv.org/api/query".to_string()
}

fn default_github_url() -> String {
    "https://api.github.com/search/repositories".to_string()
}

fn default_product_hunt_url() -> String {
    "https://api.producthunt.com/v2/api/graphql".to_string()
}

fn default_twitter_url() -> String {
    "https://api.twitter.com/2/tweets/search/recent".to_string()
}

/// Defaults for `fetch_all_research`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchSettings {
    #[serde(default = "default_days_back")]
    pub days_back: u32,

    #[serde(default = "default_max_items")]
    pub max_papers: usize,

    #[serde(default = "default_max_items")]
    pub max_repos: usize,

    #[serde(default = "default_max_items")]
    pub max_products: usize,

    /// Query sources concurrently rather than one after another
    #[serde(default = "default_true")]
    pub concurrent: bool,
}

impl ResearchSettings {
    /// The research request used when a caller supplies no overrides
    pub fn defaults(&self) -> ResearchConfig {
        ResearchConfig {
            days_back: self.days_back,
            max_papers: self.max_papers,
            max_repos: self.max_repos,
            max_products: self.max_products,
        }
    }
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            days_back: default_days_back(),
            max_papers: default_max_items(),
            max_repos: default_max_items(),
            max_products: default_max_items(),
            concurrent: true,
        }
    }
}

fn default_days_back() -> u32 {
    7
}

fn default_max_items() -> usize {
    10
}

fn default_true() -> bool {
    true
}

/// Digest draft settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Title prefix; drafts are titled "<title> #<issue>"
    #[serde(default = "default_digest_title")]
    pub title: String,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            title: default_digest_title(),
        }
    }
}

fn default_digest_title() -> String {
    "AI Research Digest".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit log lines as JSON objects instead of plain text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
