//! Content source adapters.
//!
//! Every external provider is wrapped by one adapter implementing [`Source`].
//! Adapters own their HTTP client and [`RateLimiter`](crate::utils::RateLimiter),
//! share nothing with each other, and never return an error past their own
//! boundary: each public `fetch` turns every failure into
//! [`SourceResult::Failure`].
//!
//! | Source id      | Provider      | Credential                       |
//! |----------------|---------------|----------------------------------|
//! | `papers`       | arXiv         | none                             |
//! | `repositories` | GitHub search | optional `GITHUB_TOKEN`          |
//! | `products`     | Product Hunt  | required `PRODUCT_HUNT_API_KEY`  |
//! | `tweets`       | Twitter v2    | required `TWITTER_BEARER_TOKEN`  |
//!
//! # Adding a source
//!
//! 1. Create a struct that owns an [`HttpClient`](crate::utils::HttpClient) and a limiter
//! 2. Write an inherent `fetch(&self, &Params) -> SourceResult` that checks
//!    credentials, acquires the limiter, sends one request and maps the payload
//! 3. Implement [`Source`] so the aggregator can call it with a [`ResearchConfig`]
//! 4. Add it to [`SourceRegistry::new`]

mod arxiv;
mod github;
pub mod mock;
mod product_hunt;
mod registry;
mod twitter;

pub use arxiv::{ArxivSource, PaperSearchParams};
pub use github::{timeframe_days, GithubSource, TrendingRepoParams};
pub use mock::MockSource;
pub use product_hunt::{ProductHuntSource, ProductLaunchParams};
pub use registry::SourceRegistry;
pub use twitter::{SocialTrendParams, TwitterSource, DEFAULT_HASHTAGS};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::models::{FailureKind, Item, ResearchConfig, SourceResult};

/// The Source trait defines the interface the aggregator needs from an adapter.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier, also the key under which items are reported (e.g. "papers")
    fn id(&self) -> &str;

    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Whether the credentials this source needs are present.
    ///
    /// The aggregator skips unconfigured sources instead of reporting them as failures.
    fn is_configured(&self) -> bool {
        true
    }

    /// Fetch items using the batch research settings
    async fn fetch_research(&self, config: &ResearchConfig) -> SourceResult;
}

/// Errors that can occur while talking to a provider
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// A credential this source requires is not configured
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// The request exceeded the adapter timeout
    #[error("timeout")]
    Timeout,

    /// Network failure or non-2xx status
    #[error("request failed: {0}")]
    Transport(String),

    /// The provider answered with an unexpected payload
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Request parameters the adapter cannot act on
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

impl SourceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SourceError::MissingCredential(_) => FailureKind::MissingCredential,
            SourceError::Timeout => FailureKind::Timeout,
            SourceError::Transport(_) => FailureKind::TransportError,
            SourceError::MalformedResponse(_) => FailureKind::MalformedResponse,
            SourceError::InvalidParameters(_) => FailureKind::InvalidParameters,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_decode() {
            SourceError::MalformedResponse(err.to_string())
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::MalformedResponse(format!("JSON: {}", err))
    }
}

/// Oldest timestamp inside a lookback window of `days_back` days from now.
///
/// Windows reaching past the representable date range are rejected rather
/// than clamped.
pub(crate) fn lookback_threshold(days_back: u32) -> Result<DateTime<Utc>, SourceError> {
    lookback_threshold_from(Utc::now(), days_back)
}

fn lookback_threshold_from(
    now: DateTime<Utc>,
    days_back: u32,
) -> Result<DateTime<Utc>, SourceError> {
    Duration::try_days(i64::from(days_back))
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| {
            SourceError::InvalidParameters(format!(
                "days_back of {} reaches past the supported date range",
                days_back
            ))
        })
}

/// Convert an adapter's internal outcome into a [`SourceResult`], logging either way
pub(crate) fn into_source_result(
    source: &str,
    outcome: Result<Vec<Item>, SourceError>,
) -> SourceResult {
    match outcome {
        Ok(items) => {
            tracing::info!(source, count = items.len(), "Fetched items");
            SourceResult::success(items)
        }
        Err(err) => {
            tracing::warn!(source, kind = ?err.kind(), "Fetch failed: {}", err);
            SourceResult::failure(source, err.kind(), err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            SourceError::MissingCredential("x".into()).kind(),
            FailureKind::MissingCredential
        );
        assert_eq!(SourceError::Timeout.kind(), FailureKind::Timeout);
        assert_eq!(
            SourceError::Transport("x".into()).kind(),
            FailureKind::TransportError
        );
        assert_eq!(
            SourceError::MalformedResponse("x".into()).kind(),
            FailureKind::MalformedResponse
        );
        assert_eq!(
            SourceError::InvalidParameters("x".into()).kind(),
            FailureKind::InvalidParameters
        );
    }

    #[test]
    fn test_lookback_threshold() {
        let now = Utc::now();
        let threshold = lookback_threshold_from(now, 7).unwrap();
        assert_eq!(now - threshold, Duration::days(7));
        assert_eq!(lookback_threshold_from(now, 0).unwrap(), now);
    }

    #[test]
    fn test_lookback_threshold_out_of_range() {
        let err = lookback_threshold(200_000_000).unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidParameters);
        assert!(err.to_string().contains("200000000"));

        let err = lookback_threshold(u32::MAX).unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidParameters);
    }

    #[test]
    fn test_timeout_reason() {
        let result = into_source_result("papers", Err(SourceError::Timeout));
        let failure = result.failure_ref().unwrap();
        assert_eq!(failure.source, "papers");
        assert_eq!(failure.reason, "timeout");
        assert_eq!(failure.kind, FailureKind::Timeout);
    }

    #[test]
    fn test_json_error_is_malformed() {
        let err: SourceError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), FailureKind::MalformedResponse);
    }
}
