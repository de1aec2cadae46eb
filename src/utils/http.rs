//! HTTP client utilities.

use reqwest::{Client, RequestBuilder};
use std::sync::Arc;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::sources::SourceError;

/// HTTP client owned by a single source adapter
///
/// Every request built through [`HttpClient::get`] or [`HttpClient::post`]
/// carries the adapter's fixed timeout.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client from the shared HTTP settings
    pub fn new(config: &HttpConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SourceError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            timeout: config.timeout(),
        })
    }

    /// Start a GET request bounded by the adapter timeout
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url).timeout(self.timeout)
    }

    /// Start a POST request bounded by the adapter timeout
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url).timeout(self.timeout)
    }

    /// Send a request and return the body of a 2xx response.
    ///
    /// Non-2xx statuses become [`SourceError::Transport`]; transport failures are
    /// classified by the `From<reqwest::Error>` conversion.
    pub async fn send_for_bytes(
        &self,
        request: RequestBuilder,
        provider: &str,
    ) -> Result<Vec<u8>, SourceError> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Transport(format!(
                "{} API returned status: {}",
                provider, status
            )));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
