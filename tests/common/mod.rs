//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use chrono::{Duration, Utc};
use research_digest::config::Config;
use serde_json::{json, Value};

pub const ARXIV_PATH: &str = "/api/query";
pub const GITHUB_PATH: &str = "/search/repositories";
pub const PRODUCT_HUNT_PATH: &str = "/v2/api/graphql";
pub const TWITTER_PATH: &str = "/2/tweets/search/recent";

/// Config pointing every provider at `base`, with throttling disabled
pub fn config_for(base: &str) -> Config {
    let mut config = Config::default();
    config.endpoints.arxiv = format!("{}{}", base, ARXIV_PATH);
    config.endpoints.github = format!("{}{}", base, GITHUB_PATH);
    config.endpoints.product_hunt = format!("{}{}", base, PRODUCT_HUNT_PATH);
    config.endpoints.twitter = format!("{}{}", base, TWITTER_PATH);
    config.rate_limits.papers_per_minute = 0;
    config.rate_limits.repositories_per_minute = 0;
    config.rate_limits.products_per_minute = 0;
    config.rate_limits.tweets_per_minute = 0;
    config.http.timeout_secs = 5;
    config
}

/// Same as [`config_for`] with every credential present
pub fn configured_for(base: &str) -> Config {
    let mut config = config_for(base);
    config.api_keys.github_token = Some("gh-token".to_string());
    config.api_keys.product_hunt = Some("ph-key".to_string());
    config.api_keys.twitter_bearer_token = Some("tw-token".to_string());
    config
}

fn days_ago(days: i64) -> String {
    (Utc::now() - Duration::days(days)).to_rfc3339()
}

/// Atom feed with `total` entries, the first `recent` of them inside a week
pub fn arxiv_feed(total: usize, recent: usize) -> String {
    let entries: String = (0..total)
        .map(|i| {
            let published = if i < recent { days_ago(1) } else { days_ago(30 + i as i64) };
            format!(
                r#"<entry>
    <id>http://arxiv.org/abs/2401.{i:05}v1</id>
    <title>Paper {i}</title>
    <summary>Abstract {i}</summary>
    <published>{published}</published>
    <updated>{published}</updated>
    <author><name>Author {i}</name></author>
    <link title="pdf" href="http://arxiv.org/pdf/2401.{i:05}v1" rel="related" type="application/pdf"/>
    <category term="cs.AI"/>
  </entry>"#
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>arXiv Query Results</title>
  <id>http://arxiv.org/api/query</id>
  <updated>{}</updated>
  {}
</feed>"#,
        days_ago(0),
        entries
    )
}

pub fn github_body(count: usize) -> Value {
    let items: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "name": format!("repo-{}", i),
                "full_name": format!("acme/repo-{}", i),
                "description": "An agent framework",
                "stargazers_count": 5000 - i,
                "forks_count": 12,
                "html_url": format!("https://github.com/acme/repo-{}", i),
                "language": "Python",
                "topics": ["llm", "agents"],
                "created_at": days_ago(2)
            })
        })
        .collect();
    json!({ "total_count": count, "items": items })
}

pub fn product_hunt_body() -> Value {
    json!({
        "data": {"posts": {"edges": [
            {"node": {"name": "Recent", "tagline": "New", "description": "Fresh launch",
                      "votesCount": 300, "url": "https://www.producthunt.com/posts/recent",
                      "createdAt": days_ago(1)}},
            {"node": {"name": "Stale", "tagline": "Old", "description": null,
                      "votesCount": 900, "url": "https://www.producthunt.com/posts/stale",
                      "createdAt": days_ago(40)}}
        ]}}
    })
}

/// Posts with likes 50, 150 and 300; the 150-like post has the most reshares
pub fn twitter_body() -> Value {
    json!({
        "data": [
            {"id": "1", "text": "low", "author_id": "u1", "created_at": days_ago(1),
             "public_metrics": {"like_count": 50, "retweet_count": 500, "reply_count": 1}},
            {"id": "2", "text": "shared", "author_id": "u1", "created_at": days_ago(1),
             "public_metrics": {"like_count": 150, "retweet_count": 200, "reply_count": 3}},
            {"id": "3", "text": "liked", "author_id": "u2", "created_at": days_ago(2),
             "public_metrics": {"like_count": 300, "retweet_count": 0, "reply_count": 9}}
        ],
        "includes": {"users": [
            {"id": "u1", "username": "first", "name": "First User"},
            {"id": "u2", "username": "second", "name": "Second User"}
        ]},
        "meta": {"result_count": 3}
    })
}
