//! arXiv paper search.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use feed_rs::parser;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::models::{Item, Paper, ResearchConfig, SourceResult};
use crate::sources::{into_source_result, lookback_threshold, Source, SourceError};
use crate::utils::{collapse_whitespace, truncate_with_ellipsis, HttpClient, RateLimiter};

/// Characters of abstract kept per paper
const SUMMARY_BUDGET: usize = 400;
const MAX_AUTHORS: usize = 3;
const MAX_CATEGORIES: usize = 3;
/// Field prefixes understood by the arXiv query syntax
const FIELD_PREFIXES: [&str; 9] = ["ti", "au", "abs", "co", "jr", "cat", "rn", "id", "all"];

/// Build the `search_query` value: free text searches every field, while a
/// query already using field prefixes (e.g. `ti:transformers AND cat:cs.CL`)
/// is sent as written.
pub(crate) fn search_query(query: &str) -> String {
    let qualified = query.split_whitespace().any(|term| {
        term.trim_start_matches('(')
            .split_once(':')
            .is_some_and(|(field, _)| FIELD_PREFIXES.contains(&field))
    });
    if qualified {
        query.to_string()
    } else {
        format!("all:{}", query)
    }
}

/// Parameters for a paper search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperSearchParams {
    pub query: String,
    pub max_results: usize,
    /// Only keep papers published in the last N days
    pub days_back: u32,
}

impl Default for PaperSearchParams {
    fn default() -> Self {
        Self {
            query: "artificial intelligence".to_string(),
            max_results: 10,
            days_back: 7,
        }
    }
}

/// arXiv research source
///
/// Fetches twice the requested number of candidates, newest first, so that
/// enough remain after the lookback filter.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: HttpClient,
    endpoint: String,
    limiter: RateLimiter,
}

impl ArxivSource {
    /// Create a new arXiv source from the application config
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::new(&config.http)?,
            endpoint: config.endpoints.arxiv.clone(),
            limiter: RateLimiter::per_minute("papers", config.rate_limits.papers_per_minute),
        })
    }

    /// Replace the rate limiter (for testing)
    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Search for recent papers. Never fails; errors are reported as [`SourceResult::Failure`].
    pub async fn fetch(&self, params: &PaperSearchParams) -> SourceResult {
        into_source_result(self.id(), self.try_fetch(params).await)
    }

    async fn try_fetch(&self, params: &PaperSearchParams) -> Result<Vec<Item>, SourceError> {
        let threshold = lookback_threshold(params.days_back)?;
        self.limiter.acquire().await;

        let candidates = params.max_results.saturating_mul(2).to_string();
        let search_query = search_query(&params.query);
        let request = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("search_query", search_query.as_str()),
                ("start", "0"),
                ("max_results", candidates.as_str()),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
            ])
            .header("Accept", "application/atom+xml");

        let body = self.client.send_for_bytes(request, "arXiv").await?;
        let feed = parser::parse(body.as_slice()).map_err(|e| {
            SourceError::MalformedResponse(format!("Failed to parse Atom feed: {}", e))
        })?;

        Ok(select_recent(&feed.entries, threshold, params.max_results))
    }
}

/// Keep entries published at or after `threshold`, in feed order, up to `max_results`.
pub(crate) fn select_recent(
    entries: &[Entry],
    threshold: DateTime<Utc>,
    max_results: usize,
) -> Vec<Item> {
    entries
        .iter()
        .filter(|entry| {
            entry
                .published
                .or(entry.updated)
                .is_some_and(|date| date >= threshold)
        })
        .take(max_results)
        .map(|entry| Item::Paper(parse_entry(entry)))
        .collect()
}

/// Map an Atom entry onto a [`Paper`]
fn parse_entry(entry: &Entry) -> Paper {
    let title = entry
        .title
        .as_ref()
        .map(|t| collapse_whitespace(&t.content))
        .unwrap_or_default();

    let summary = entry
        .summary
        .as_ref()
        .map(|s| collapse_whitespace(&s.content))
        .unwrap_or_default();

    let pdf_url = entry
        .links
        .iter()
        .find(|link| {
            link.media_type.as_deref() == Some("application/pdf")
                || link.title.as_deref() == Some("pdf")
        })
        .map(|link| link.href.clone());

    Paper {
        title,
        authors: entry
            .authors
            .iter()
            .take(MAX_AUTHORS)
            .map(|a| a.name.clone())
            .collect(),
        summary: truncate_with_ellipsis(&summary, SUMMARY_BUDGET),
        published: entry
            .published
            .or(entry.updated)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        url: entry.id.clone(),
        pdf_url,
        categories: entry
            .categories
            .iter()
            .take(MAX_CATEGORIES)
            .map(|c| c.term.clone())
            .collect(),
    }
}

#[async_trait]
impl Source for ArxivSource {
    fn id(&self) -> &str {
        "papers"
    }

    fn name(&self) -> &str {
        "arXiv"
    }

    async fn fetch_research(&self, config: &ResearchConfig) -> SourceResult {
        let params = PaperSearchParams {
            max_results: config.max_papers,
            days_back: config.days_back,
            ..PaperSearchParams::default()
        };
        self.fetch(&params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_prefix() {
        assert_eq!(search_query("large language models"), "all:large language models");
        assert_eq!(search_query("ti:transformers"), "ti:transformers");
        assert_eq!(
            search_query("(cat:cs.CL OR cat:cs.AI) AND abs:agents"),
            "(cat:cs.CL OR cat:cs.AI) AND abs:agents"
        );
        // an unknown prefix is free text
        assert_eq!(search_query("note: agents"), "all:note: agents");
    }

    fn feed_with(entries: &str) -> feed_rs::model::Feed {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>arXiv Query Results</title>
  <id>http://arxiv.org/api/query</id>
  <updated>2024-01-20T00:00:00Z</updated>
  {}
</feed>"#,
            entries
        );
        parser::parse(xml.as_bytes()).unwrap()
    }

    fn entry(id: &str, published: &str, summary: &str) -> String {
        format!(
            r#"<entry>
    <id>http://arxiv.org/abs/{id}v1</id>
    <title>Paper {id}
      with a wrapped title</title>
    <summary>{summary}</summary>
    <published>{published}</published>
    <updated>{published}</updated>
    <author><name>Ada</name></author>
    <author><name>Grace</name></author>
    <author><name>Alan</name></author>
    <author><name>Edsger</name></author>
    <link href="http://arxiv.org/abs/{id}v1" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/{id}v1" rel="related" type="application/pdf"/>
    <category term="cs.AI"/>
    <category term="cs.LG"/>
    <category term="cs.CL"/>
    <category term="stat.ML"/>
  </entry>"#
        )
    }

    #[test]
    fn test_default_params() {
        let params = PaperSearchParams::default();
        assert_eq!(params.query, "artificial intelligence");
        assert_eq!(params.max_results, 10);
        assert_eq!(params.days_back, 7);
    }

    #[test]
    fn test_parse_entry_caps_and_truncation() {
        let long_summary = "word ".repeat(200);
        let feed = feed_with(&entry("2401.00001", "2024-01-15T10:00:00Z", &long_summary));
        let paper = parse_entry(&feed.entries[0]);

        assert_eq!(paper.title, "Paper 2401.00001 with a wrapped title");
        assert_eq!(paper.authors, vec!["Ada", "Grace", "Alan"]);
        assert_eq!(paper.categories, vec!["cs.AI", "cs.LG", "cs.CL"]);
        assert_eq!(paper.published, "2024-01-15");
        assert_eq!(paper.url, "http://arxiv.org/abs/2401.00001v1");
        assert_eq!(
            paper.pdf_url.as_deref(),
            Some("http://arxiv.org/pdf/2401.00001v1")
        );
        assert!(paper.summary.ends_with("..."));
        assert_eq!(paper.summary.chars().count(), SUMMARY_BUDGET + 3);
    }

    #[test]
    fn test_short_summary_is_untouched() {
        let feed = feed_with(&entry("2401.00002", "2024-01-15T10:00:00Z", "Short abstract."));
        let paper = parse_entry(&feed.entries[0]);
        assert_eq!(paper.summary, "Short abstract.");
    }

    #[test]
    fn test_select_recent_filters_and_truncates() {
        let entries = [
            entry("1", "2024-01-19T00:00:00Z", "a"),
            entry("2", "2024-01-18T00:00:00Z", "b"),
            entry("3", "2024-01-17T00:00:00Z", "c"),
            entry("4", "2024-01-01T00:00:00Z", "d"),
        ]
        .join("\n");
        let feed = feed_with(&entries);
        let threshold = "2024-01-13T00:00:00Z".parse::<DateTime<Utc>>().unwrap();

        let all_recent = select_recent(&feed.entries, threshold, 10);
        assert_eq!(all_recent.len(), 3);

        let capped = select_recent(&feed.entries, threshold, 2);
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].url(), "http://arxiv.org/abs/1v1");
    }
}
