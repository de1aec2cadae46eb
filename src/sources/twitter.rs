//! Twitter (API v2 recent search) trending posts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::{non_empty, Config};
use crate::models::{Item, Post, ResearchConfig, SourceResult};
use crate::sources::{into_source_result, lookback_threshold, Source, SourceError};
use crate::utils::{truncate_chars, HttpClient, RateLimiter};

/// Posts requested per search
const PAGE_SIZE: &str = "100";
const TEXT_BUDGET: usize = 280;
/// Posts returned after ranking
const TOP_POSTS: usize = 10;

pub const DEFAULT_HASHTAGS: [&str; 5] = ["AI", "MachineLearning", "LLM", "ChatGPT", "GenerativeAI"];

/// Parameters for a social trend search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialTrendParams {
    pub hashtags: Vec<String>,
    /// Minimum like count for a post to be kept
    pub min_likes: u64,
    pub days_back: u32,
}

impl Default for SocialTrendParams {
    fn default() -> Self {
        Self {
            hashtags: DEFAULT_HASHTAGS.iter().map(|s| s.to_string()).collect(),
            min_likes: 100,
            days_back: 7,
        }
    }
}

impl SocialTrendParams {
    /// `(#A OR #B) -is:retweet lang:en`
    pub(crate) fn search_query(&self) -> String {
        let hashtags: Vec<String> = if self.hashtags.is_empty() {
            DEFAULT_HASHTAGS.iter().map(|tag| format!("#{}", tag)).collect()
        } else {
            self.hashtags
                .iter()
                .map(|tag| format!("#{}", tag.trim_start_matches('#')))
                .collect()
        };

        format!("({}) -is:retweet lang:en", hashtags.join(" OR "))
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub data: Vec<Tweet>,
    #[serde(default)]
    pub includes: Includes,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Includes {
    #[serde(default)]
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Tweet {
    pub id: String,
    pub text: String,
    pub author_id: Option<String>,
    pub created_at: Option<String>,
    #[serde(default)]
    pub public_metrics: PublicMetrics,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PublicMetrics {
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub reply_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct User {
    pub id: String,
    pub username: String,
    pub name: String,
}

/// Filter, rank and cap raw search results.
///
/// Keeps posts with at least `min_likes` likes created at or after `threshold`
/// (posts without a parseable date are kept), orders them by
/// `likes + 2 * reshares` descending, and returns the top ten.
pub(crate) fn rank_posts(response: SearchResponse, min_likes: u64, threshold: DateTime<Utc>) -> Vec<Post> {
    let users: HashMap<&str, &User> = response
        .includes
        .users
        .iter()
        .map(|user| (user.id.as_str(), user))
        .collect();

    let mut posts: Vec<Post> = response
        .data
        .iter()
        .filter(|tweet| tweet.public_metrics.like_count >= min_likes)
        .filter(|tweet| posted_since(tweet, threshold))
        .map(|tweet| {
            let author = tweet
                .author_id
                .as_deref()
                .and_then(|id| users.get(id).copied());
            let username = author.map(|u| u.username.as_str());

            Post {
                text: truncate_chars(&tweet.text, TEXT_BUDGET),
                author: format!("@{}", username.unwrap_or("unknown")),
                author_name: author
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                likes: tweet.public_metrics.like_count,
                reshares: tweet.public_metrics.retweet_count,
                replies: tweet.public_metrics.reply_count,
                created_at: tweet.created_at.clone().unwrap_or_default(),
                url: format!(
                    "https://twitter.com/{}/status/{}",
                    username.unwrap_or("i"),
                    tweet.id
                ),
            }
        })
        .collect();

    posts.sort_by(|a, b| b.engagement().cmp(&a.engagement()));
    posts.truncate(TOP_POSTS);
    posts
}

fn posted_since(tweet: &Tweet, threshold: DateTime<Utc>) -> bool {
    tweet
        .created_at
        .as_deref()
        .and_then(|date| DateTime::parse_from_rfc3339(date).ok())
        .map_or(true, |date| date.with_timezone(&Utc) >= threshold)
}

/// Twitter source; skipped by the aggregator when no bearer token is configured.
#[derive(Debug, Clone)]
pub struct TwitterSource {
    client: HttpClient,
    endpoint: String,
    bearer_token: Option<String>,
    limiter: RateLimiter,
}

impl TwitterSource {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::new(&config.http)?,
            endpoint: config.endpoints.twitter.clone(),
            bearer_token: non_empty(&config.api_keys.twitter_bearer_token).map(str::to_string),
            limiter: RateLimiter::per_minute("tweets", config.rate_limits.tweets_per_minute),
        })
    }

    /// Replace the rate limiter (for testing)
    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Fetch the most engaging recent posts for the hashtags
    pub async fn fetch(&self, params: &SocialTrendParams) -> SourceResult {
        into_source_result(self.id(), self.try_fetch(params).await)
    }

    async fn try_fetch(&self, params: &SocialTrendParams) -> Result<Vec<Item>, SourceError> {
        let token = self.bearer_token.as_deref().ok_or_else(|| {
            SourceError::MissingCredential(
                "Twitter API token not configured. Set TWITTER_BEARER_TOKEN environment variable."
                    .to_string(),
            )
        })?;

        let threshold = lookback_threshold(params.days_back)?;
        self.limiter.acquire().await;

        let query = params.search_query();
        let request = self
            .client
            .get(&self.endpoint)
            .bearer_auth(token)
            .query(&[
                ("query", query.as_str()),
                ("max_results", PAGE_SIZE),
                ("tweet.fields", "public_metrics,created_at,author_id"),
                ("expansions", "author_id"),
                ("user.fields", "username,name"),
            ]);

        let body = self.client.send_for_bytes(request, "Twitter").await?;
        let response: SearchResponse = serde_json::from_slice(&body)?;

        Ok(rank_posts(response, params.min_likes, threshold)
            .into_iter()
            .map(Item::Post)
            .collect())
    }
}

#[async_trait]
impl Source for TwitterSource {
    fn id(&self) -> &str {
        "tweets"
    }

    fn name(&self) -> &str {
        "Twitter"
    }

    fn is_configured(&self) -> bool {
        self.bearer_token.is_some()
    }

    async fn fetch_research(&self, config: &ResearchConfig) -> SourceResult {
        let params = SocialTrendParams {
            days_back: config.days_back,
            ..SocialTrendParams::default()
        };
        self.fetch(&params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tweet(id: &str, likes: u64, retweets: u64, created_at: &str) -> Tweet {
        Tweet {
            id: id.to_string(),
            text: format!("post {}", id),
            author_id: Some("u1".to_string()),
            created_at: Some(created_at.to_string()),
            public_metrics: PublicMetrics {
                like_count: likes,
                retweet_count: retweets,
                reply_count: 1,
            },
        }
    }

    fn response(data: Vec<Tweet>) -> SearchResponse {
        SearchResponse {
            data,
            includes: Includes {
                users: vec![User {
                    id: "u1".to_string(),
                    username: "researcher".to_string(),
                    name: "A Researcher".to_string(),
                }],
            },
        }
    }

    fn epoch() -> DateTime<Utc> {
        "2024-01-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_min_likes_filter_and_engagement_order() {
        let raw = response(vec![
            tweet("1", 50, 500, "2024-01-05T00:00:00Z"),
            tweet("2", 150, 200, "2024-01-05T00:00:00Z"),
            tweet("3", 300, 0, "2024-01-05T00:00:00Z"),
        ]);

        let posts = rank_posts(raw, 100, epoch());
        assert_eq!(posts.len(), 2);
        // 150 + 2*200 = 550 beats 300 + 0
        assert_eq!(posts[0].likes, 150);
        assert_eq!(posts[1].likes, 300);
        assert_eq!(posts[0].author, "@researcher");
        assert_eq!(posts[0].author_name, "A Researcher");
        assert_eq!(posts[0].url, "https://twitter.com/researcher/status/2");
    }

    #[test]
    fn test_top_ten_only() {
        let data = (0..15)
            .map(|i| tweet(&i.to_string(), 100 + i, 0, "2024-01-05T00:00:00Z"))
            .collect();
        let posts = rank_posts(response(data), 100, epoch());
        assert_eq!(posts.len(), TOP_POSTS);
        assert_eq!(posts[0].likes, 114);
        assert_eq!(posts[9].likes, 105);
    }

    #[test]
    fn test_old_posts_dropped_and_unknown_author() {
        let mut orphan = tweet("9", 500, 0, "2024-01-05T00:00:00Z");
        orphan.author_id = Some("missing".to_string());
        let raw = response(vec![tweet("8", 900, 0, "2023-12-01T00:00:00Z"), orphan]);

        let posts = rank_posts(raw, 100, epoch());
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].author, "@unknown");
        assert_eq!(posts[0].author_name, "Unknown");
        assert_eq!(posts[0].url, "https://twitter.com/i/status/9");
    }

    #[test]
    fn test_text_truncated() {
        let mut long = tweet("1", 200, 0, "2024-01-05T00:00:00Z");
        long.text = "y".repeat(400);
        let posts = rank_posts(response(vec![long]), 100, epoch());
        assert_eq!(posts[0].text.len(), TEXT_BUDGET);
    }

    #[test]
    fn test_search_query() {
        let params = SocialTrendParams::default();
        assert_eq!(
            params.search_query(),
            "(#AI OR #MachineLearning OR #LLM OR #ChatGPT OR #GenerativeAI) -is:retweet lang:en"
        );

        let custom = SocialTrendParams {
            hashtags: vec!["#rust".to_string(), "wasm".to_string()],
            ..SocialTrendParams::default()
        };
        assert_eq!(custom.search_query(), "(#rust OR #wasm) -is:retweet lang:en");
    }

    #[test]
    fn test_empty_response_payload() {
        let raw: SearchResponse =
            serde_json::from_str(r#"{"meta": {"result_count": 0}}"#).unwrap();
        assert!(rank_posts(raw, 0, epoch()).is_empty());
    }
}
