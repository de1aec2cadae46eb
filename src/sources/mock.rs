//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::models::{FailureKind, Item, Paper, Post, Product, Repository, ResearchConfig, SourceResult};
use crate::sources::Source;

/// A mock source that returns a scripted result and counts its invocations.
#[derive(Debug)]
pub struct MockSource {
    id: String,
    configured: bool,
    result: SourceResult,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockSource {
    /// A source that always returns `items`
    pub fn succeeding(id: &str, items: Vec<Item>) -> Self {
        Self {
            id: id.to_string(),
            configured: true,
            result: SourceResult::success(items),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A source that always fails with `kind`
    pub fn failing(id: &str, kind: FailureKind, reason: &str) -> Self {
        Self {
            id: id.to_string(),
            configured: true,
            result: SourceResult::failure(id, kind, reason),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Report missing credentials so the aggregator skips this source
    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many times `fetch_research` was invoked
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn fetch_research(&self, _config: &ResearchConfig) -> SourceResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }
}

/// Helper function to create a mock paper for testing.
pub fn make_paper(n: usize) -> Item {
    Item::Paper(Paper {
        title: format!("Paper {}", n),
        authors: vec!["Ada Lovelace".to_string()],
        summary: format!("Abstract of paper {}", n),
        published: "2024-01-15".to_string(),
        url: format!("http://arxiv.org/abs/2401.{:05}v1", n),
        pdf_url: Some(format!("http://arxiv.org/pdf/2401.{:05}v1", n)),
        categories: vec!["cs.AI".to_string()],
    })
}

/// Helper function to create a mock repository for testing.
pub fn make_repository(n: usize) -> Item {
    Item::Repository(Repository {
        name: format!("repo-{}", n),
        full_name: format!("acme/repo-{}", n),
        description: format!("Repository {}", n),
        stars: 1000 - n as u64,
        forks: 10,
        url: format!("https://github.com/acme/repo-{}", n),
        language: "Python".to_string(),
        topics: vec!["llm".to_string()],
        created_at: "2024-01-10T00:00:00Z".to_string(),
    })
}

/// Helper function to create a mock product for testing.
pub fn make_product(n: usize) -> Item {
    Item::Product(Product {
        name: format!("Product {}", n),
        tagline: format!("Tagline {}", n),
        description: String::new(),
        votes: 500 - n as u64,
        url: format!("https://www.producthunt.com/posts/product-{}", n),
        launch_date: "2024-01-12T00:00:00Z".to_string(),
    })
}

/// Helper function to create a mock post for testing.
pub fn make_post(n: usize) -> Item {
    Item::Post(Post {
        text: format!("Post {} about #AI", n),
        author: format!("@user{}", n),
        author_name: format!("User {}", n),
        likes: 200,
        reshares: 20,
        replies: 5,
        created_at: "2024-01-14T00:00:00Z".to_string(),
        url: format!("https://twitter.com/user{}/status/{}", n, n),
    })
}
