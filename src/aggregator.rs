//! Batch research across every configured source.
//!
//! The aggregator calls each source's adapter and folds the outcomes into one
//! [`AggregateResult`]. A failing source is recorded in `errors` and the batch
//! carries on; nothing is retried within a run.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, info};

use crate::config::Config;
use crate::models::{AggregateResult, ResearchConfig, SourceResult};
use crate::sources::{Source, SourceRegistry};

/// How sources are invoked within one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// All sources in flight at once; latency is the slowest source
    #[default]
    Concurrent,
    /// One source after another in registration order
    Sequential,
}

/// Fans out to a fixed set of sources
#[derive(Debug, Clone)]
pub struct Aggregator {
    sources: Vec<Arc<dyn Source>>,
    mode: FetchMode,
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn Source>>) -> Self {
        Self {
            sources,
            mode: FetchMode::default(),
        }
    }

    /// Aggregator over every registered source, honouring `[research] concurrent`
    pub fn from_registry(registry: &SourceRegistry, config: &Config) -> Self {
        let mode = if config.research.concurrent {
            FetchMode::Concurrent
        } else {
            FetchMode::Sequential
        };
        Self::new(registry.all()).with_mode(mode)
    }

    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    pub fn sources(&self) -> &[Arc<dyn Source>] {
        &self.sources
    }

    /// Attempt every configured source once and merge the results.
    ///
    /// Sources without their credentials are skipped and leave no entry in
    /// either `research_data` or `errors`. Errors are listed in registration
    /// order regardless of the fetch mode.
    pub async fn fetch_all(&self, config: &ResearchConfig) -> AggregateResult {
        let active: Vec<&Arc<dyn Source>> = self
            .sources
            .iter()
            .filter(|source| {
                let configured = source.is_configured();
                if !configured {
                    debug!(source = source.id(), "Skipping unconfigured source");
                }
                configured
            })
            .collect();

        info!(
            sources = active.len(),
            mode = ?self.mode,
            days_back = config.days_back,
            "Starting research batch"
        );

        let results: Vec<(String, SourceResult)> = match self.mode {
            FetchMode::Concurrent => {
                join_all(active.iter().map(|source| async move {
                    (source.id().to_string(), source.fetch_research(config).await)
                }))
                .await
            }
            FetchMode::Sequential => {
                let mut results = Vec::with_capacity(active.len());
                for source in &active {
                    results.push((source.id().to_string(), source.fetch_research(config).await));
                }
                results
            }
        };

        let aggregate: AggregateResult = results.into_iter().collect();

        info!(
            status = ?aggregate.status(),
            sources_fetched = aggregate.sources_fetched(),
            errors = aggregate.errors().len(),
            "Research batch finished"
        );

        aggregate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AggregateStatus, FailureKind};
    use crate::sources::mock::{make_paper, make_post, make_product, make_repository};
    use crate::sources::MockSource;
    use std::time::Duration;

    fn four_sources(tweets: MockSource) -> (Vec<Arc<MockSource>>, Aggregator) {
        let mocks = vec![
            Arc::new(MockSource::succeeding("papers", vec![make_paper(1), make_paper(2)])),
            Arc::new(MockSource::succeeding("repositories", vec![make_repository(1)])),
            Arc::new(MockSource::succeeding("products", vec![make_product(1)])),
            Arc::new(tweets),
        ];
        let sources = mocks
            .iter()
            .map(|m| m.clone() as Arc<dyn Source>)
            .collect();
        (mocks, Aggregator::new(sources))
    }

    #[tokio::test]
    async fn test_one_failure_is_partial() {
        let (mocks, aggregator) =
            four_sources(MockSource::failing("tweets", FailureKind::Timeout, "timeout"));

        let result = aggregator.fetch_all(&ResearchConfig::default()).await;

        assert_eq!(result.status(), AggregateStatus::Partial);
        assert_eq!(result.sources_fetched(), 3);
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].source, "tweets");
        assert_eq!(result.errors()[0].reason, "timeout");
        assert_eq!(result.items("papers").unwrap().len(), 2);
        assert_eq!(result.items("repositories").unwrap().len(), 1);
        assert_eq!(result.items("products").unwrap().len(), 1);
        assert!(result.items("tweets").is_none());
        assert!(mocks.iter().all(|m| m.calls() == 1));
    }

    #[tokio::test]
    async fn test_no_failures_is_complete() {
        let (_, aggregator) =
            four_sources(MockSource::succeeding("tweets", vec![make_post(1)]));

        let result = aggregator.fetch_all(&ResearchConfig::default()).await;

        assert_eq!(result.status(), AggregateStatus::Complete);
        assert!(result.errors().is_empty());
        assert_eq!(result.sources_fetched(), 4);
    }

    #[tokio::test]
    async fn test_unconfigured_source_is_skipped() {
        let (mocks, aggregator) = four_sources(
            MockSource::failing("tweets", FailureKind::MissingCredential, "no token").unconfigured(),
        );

        let result = aggregator.fetch_all(&ResearchConfig::default()).await;

        assert_eq!(result.status(), AggregateStatus::Complete);
        assert_eq!(result.sources_fetched(), 3);
        assert!(!result.by_source().contains_key("tweets"));
        assert_eq!(mocks[3].calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_success_still_counts() {
        let (_, aggregator) = four_sources(MockSource::succeeding("tweets", Vec::new()));

        let result = aggregator.fetch_all(&ResearchConfig::default()).await;

        assert_eq!(result.sources_fetched(), 4);
        assert_eq!(result.items("tweets").unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_errors_keep_registration_order() {
        let sources: Vec<Arc<dyn Source>> = vec![
            Arc::new(
                MockSource::failing("papers", FailureKind::TransportError, "boom")
                    .with_delay(Duration::from_millis(30)),
            ),
            Arc::new(MockSource::failing("repositories", FailureKind::Timeout, "timeout")),
        ];

        let result = Aggregator::new(sources)
            .fetch_all(&ResearchConfig::default())
            .await;

        let failed: Vec<_> = result.errors().iter().map(|e| e.source.as_str()).collect();
        assert_eq!(failed, vec!["papers", "repositories"]);
        assert_eq!(result.sources_fetched(), 0);
        assert_eq!(result.status(), AggregateStatus::Partial);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_latency_is_the_slowest_source() {
        let sources: Vec<Arc<dyn Source>> = vec![
            Arc::new(MockSource::succeeding("papers", vec![]).with_delay(Duration::from_secs(2))),
            Arc::new(
                MockSource::succeeding("repositories", vec![]).with_delay(Duration::from_secs(3)),
            ),
        ];
        let aggregator = Aggregator::new(sources);

        let start = tokio::time::Instant::now();
        aggregator.fetch_all(&ResearchConfig::default()).await;
        assert_eq!(start.elapsed(), Duration::from_secs(3));

        let sequential = aggregator.clone().with_mode(FetchMode::Sequential);
        let start = tokio::time::Instant::now();
        let result = sequential.fetch_all(&ResearchConfig::default()).await;
        assert_eq!(start.elapsed(), Duration::from_secs(5));
        assert_eq!(result.status(), AggregateStatus::Complete);
    }

    #[test]
    fn test_mode_follows_config() {
        let mut config = Config::default();
        let registry = SourceRegistry::new(&config).unwrap();
        assert_eq!(
            Aggregator::from_registry(&registry, &config).mode(),
            FetchMode::Concurrent
        );

        config.research.concurrent = false;
        let aggregator = Aggregator::from_registry(&registry, &config);
        assert_eq!(aggregator.mode(), FetchMode::Sequential);
        assert_eq!(aggregator.sources().len(), 4);
    }
}
