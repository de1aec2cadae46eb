//! Registry for the content source adapters.

use std::sync::Arc;

use super::{ArxivSource, GithubSource, ProductHuntSource, Source, SourceError, TwitterSource};
use crate::config::Config;

/// Registry of every adapter this server knows about
///
/// Typed handles are kept so single-source tools can pass their own parameters,
/// while [`SourceRegistry::all`] exposes the same instances through [`Source`] for
/// the aggregator. Both paths share one rate limiter per source.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    papers: Arc<ArxivSource>,
    repositories: Arc<GithubSource>,
    products: Arc<ProductHuntSource>,
    tweets: Arc<TwitterSource>,
}

impl SourceRegistry {
    /// Build every adapter from the application config
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        Ok(Self {
            papers: Arc::new(ArxivSource::new(config)?),
            repositories: Arc::new(GithubSource::new(config)?),
            products: Arc::new(ProductHuntSource::new(config)?),
            tweets: Arc::new(TwitterSource::new(config)?),
        })
    }

    pub fn papers(&self) -> &ArxivSource {
        &self.papers
    }

    pub fn repositories(&self) -> &GithubSource {
        &self.repositories
    }

    pub fn products(&self) -> &ProductHuntSource {
        &self.products
    }

    pub fn tweets(&self) -> &TwitterSource {
        &self.tweets
    }

    /// All sources in registration order: papers, repositories, products, tweets
    pub fn all(&self) -> Vec<Arc<dyn Source>> {
        vec![
            self.papers.clone(),
            self.repositories.clone(),
            self.products.clone(),
            self.tweets.clone(),
        ]
    }
}
