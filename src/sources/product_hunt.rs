//! Product Hunt launch search (GraphQL API v2).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::{non_empty, Config};
use crate::models::{Item, Product, ResearchConfig, SourceResult};
use crate::sources::{into_source_result, lookback_threshold, Source, SourceError};
use crate::utils::{truncate_chars, HttpClient, RateLimiter};

/// Product Hunt refuses pages larger than this
const PROVIDER_PAGE_CAP: usize = 20;
const DESCRIPTION_BUDGET: usize = 200;

const POSTS_QUERY: &str = r#"
query TopLaunches($first: Int!, $postedAfter: DateTime) {
  posts(order: VOTES, topic: "artificial-intelligence", first: $first, postedAfter: $postedAfter) {
    edges {
      node {
        name
        tagline
        description
        votesCount
        url
        createdAt
      }
    }
  }
}
"#;

/// Parameters for a product-launch search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductLaunchParams {
    pub days_back: u32,
    pub limit: usize,
}

impl Default for ProductLaunchParams {
    fn default() -> Self {
        Self {
            days_back: 7,
            limit: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<PostsData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PostsData {
    posts: PostConnection,
}

#[derive(Debug, Deserialize)]
struct PostConnection {
    #[serde(default)]
    edges: Vec<PostEdge>,
}

#[derive(Debug, Deserialize)]
struct PostEdge {
    node: PostNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostNode {
    name: String,
    #[serde(default)]
    tagline: String,
    description: Option<String>,
    votes_count: u64,
    url: String,
    created_at: String,
}

impl From<PostNode> for Product {
    fn from(node: PostNode) -> Self {
        Product {
            name: node.name,
            tagline: node.tagline,
            description: truncate_chars(node.description.as_deref().unwrap_or(""), DESCRIPTION_BUDGET),
            votes: node.votes_count,
            url: node.url,
            launch_date: node.created_at,
        }
    }
}

/// Whether a launch falls inside the lookback window. Unparseable dates are kept.
fn launched_since(node: &PostNode, threshold: DateTime<Utc>) -> bool {
    match DateTime::parse_from_rfc3339(&node.created_at) {
        Ok(date) => date.with_timezone(&Utc) >= threshold,
        Err(_) => true,
    }
}

/// Product Hunt source; skipped by the aggregator when no API key is configured.
#[derive(Debug, Clone)]
pub struct ProductHuntSource {
    client: HttpClient,
    endpoint: String,
    api_key: Option<String>,
    limiter: RateLimiter,
}

impl ProductHuntSource {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::new(&config.http)?,
            endpoint: config.endpoints.product_hunt.clone(),
            api_key: non_empty(&config.api_keys.product_hunt).map(str::to_string),
            limiter: RateLimiter::per_minute("products", config.rate_limits.products_per_minute),
        })
    }

    /// Replace the rate limiter (for testing)
    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Fetch the most-voted recent AI launches
    pub async fn fetch(&self, params: &ProductLaunchParams) -> SourceResult {
        into_source_result(self.id(), self.try_fetch(params).await)
    }

    async fn try_fetch(&self, params: &ProductLaunchParams) -> Result<Vec<Item>, SourceError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            SourceError::MissingCredential(
                "Product Hunt API key not configured. Set PRODUCT_HUNT_API_KEY environment variable."
                    .to_string(),
            )
        })?;

        let threshold = lookback_threshold(params.days_back)?;
        self.limiter.acquire().await;

        let first = params.limit.min(PROVIDER_PAGE_CAP);
        let body = json!({
            "query": POSTS_QUERY,
            "variables": {
                "first": first,
                "postedAfter": threshold.to_rfc3339(),
            },
        });

        let request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body);

        let body = self.client.send_for_bytes(request, "Product Hunt").await?;
        let response: GraphQlResponse = serde_json::from_slice(&body)?;

        let data = match response.data {
            Some(data) => data,
            None if !response.errors.is_empty() => {
                let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
                return Err(SourceError::Transport(format!(
                    "Product Hunt API error: {}",
                    messages.join("; ")
                )));
            }
            None => {
                return Err(SourceError::MalformedResponse(
                    "Product Hunt response has no data".to_string(),
                ))
            }
        };

        Ok(data
            .posts
            .edges
            .into_iter()
            .map(|edge| edge.node)
            .filter(|node| launched_since(node, threshold))
            .take(first)
            .map(|node| Item::Product(node.into()))
            .collect())
    }
}

#[async_trait]
impl Source for ProductHuntSource {
    fn id(&self) -> &str {
        "products"
    }

    fn name(&self) -> &str {
        "Product Hunt"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_research(&self, config: &ResearchConfig) -> SourceResult {
        let params = ProductLaunchParams {
            days_back: config.days_back,
            limit: config.max_products,
        };
        self.fetch(&params).await
    }
}
