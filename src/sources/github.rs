//! GitHub trending-repository search.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{non_empty, Config};
use crate::models::{Item, Repository, ResearchConfig, SourceResult};
use crate::sources::{into_source_result, Source, SourceError};
use crate::utils::{HttpClient, RateLimiter};

const MAX_TOPICS: usize = 5;
/// GitHub's search API page size limit
const MAX_PER_PAGE: usize = 100;

/// Parameters for a trending-repository search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendingRepoParams {
    pub language: String,
    /// `daily`, `weekly` or `monthly`
    pub timeframe: String,
    pub topic: String,
    pub max_results: usize,
}

impl Default for TrendingRepoParams {
    fn default() -> Self {
        Self {
            language: "python".to_string(),
            timeframe: "weekly".to_string(),
            topic: "artificial-intelligence".to_string(),
            max_results: 10,
        }
    }
}

/// Lookback in days for a timeframe name; anything unrecognised means a month.
pub fn timeframe_days(timeframe: &str) -> i64 {
    match timeframe {
        "daily" => 1,
        "weekly" => 7,
        _ => 30,
    }
}

/// Lower bound for the `created:` qualifier
pub(crate) fn created_after(timeframe: &str, today: NaiveDate) -> NaiveDate {
    today - Duration::days(timeframe_days(timeframe))
}

/// Build the search qualifier string, omitting empty filters
pub(crate) fn build_search_query(params: &TrendingRepoParams, today: NaiveDate) -> String {
    let mut parts = Vec::new();

    if !params.language.is_empty() {
        parts.push(format!("language:{}", params.language));
    }
    parts.push(format!(
        "created:>{}",
        created_after(&params.timeframe, today).format("%Y-%m-%d")
    ));
    if !params.topic.is_empty() {
        parts.push(format!("topic:{}", params.topic));
    }

    parts.join(" ")
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<GithubRepo>,
}

#[derive(Debug, Deserialize)]
struct GithubRepo {
    name: String,
    full_name: String,
    description: Option<String>,
    stargazers_count: u64,
    forks_count: u64,
    html_url: String,
    language: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    created_at: String,
}

impl From<GithubRepo> for Repository {
    fn from(repo: GithubRepo) -> Self {
        Repository {
            name: repo.name,
            full_name: repo.full_name,
            description: repo
                .description
                .unwrap_or_else(|| "No description available".to_string()),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            url: repo.html_url,
            language: repo.language.unwrap_or_else(|| "N/A".to_string()),
            topics: repo.topics.into_iter().take(MAX_TOPICS).collect(),
            created_at: repo.created_at,
        }
    }
}

/// GitHub repository search source
///
/// The token is optional; without it GitHub applies the anonymous search quota.
#[derive(Debug, Clone)]
pub struct GithubSource {
    client: HttpClient,
    endpoint: String,
    token: Option<String>,
    limiter: RateLimiter,
}

impl GithubSource {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::new(&config.http)?,
            endpoint: config.endpoints.github.clone(),
            token: non_empty(&config.api_keys.github_token).map(str::to_string),
            limiter: RateLimiter::per_minute(
                "repositories",
                config.rate_limits.repositories_per_minute,
            ),
        })
    }

    /// Replace the rate limiter (for testing)
    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Search for recently created, most-starred repositories
    pub async fn fetch(&self, params: &TrendingRepoParams) -> SourceResult {
        into_source_result(self.id(), self.try_fetch(params).await)
    }

    async fn try_fetch(&self, params: &TrendingRepoParams) -> Result<Vec<Item>, SourceError> {
        self.limiter.acquire().await;

        let query = build_search_query(params, Utc::now().date_naive());
        let per_page = params.max_results.clamp(1, MAX_PER_PAGE).to_string();

        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ])
            .header("Accept", "application/vnd.github.v3+json");

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {}", token));
        }

        let body = self.client.send_for_bytes(request, "GitHub").await?;
        let response: SearchResponse = serde_json::from_slice(&body)?;

        Ok(response
            .items
            .into_iter()
            .take(params.max_results)
            .map(|repo| Item::Repository(repo.into()))
            .collect())
    }
}

#[async_trait]
impl Source for GithubSource {
    fn id(&self) -> &str {
        "repositories"
    }

    fn name(&self) -> &str {
        "GitHub"
    }

    async fn fetch_research(&self, config: &ResearchConfig) -> SourceResult {
        let params = TrendingRepoParams {
            max_results: config.max_repos,
            ..TrendingRepoParams::default()
        };
        self.fetch(&params).await
    }
}
