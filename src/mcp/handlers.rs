//! Tool handlers for research and digest operations.
//!
//! Source failures are part of a normal answer: handlers return `Ok` with
//! `"status": "error"` so the agent sees why a source produced nothing. Only
//! arguments of the wrong type are reported as `Err`.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use super::tools::ToolHandler;
use crate::aggregator::Aggregator;
use crate::digest::{self, Digest};
use crate::models::{Item, ResearchConfig, SourceResult};
use crate::sources::{
    PaperSearchParams, ProductLaunchParams, SocialTrendParams, SourceRegistry, TrendingRepoParams,
};

/// Deserialize tool arguments, treating absent arguments as all defaults
pub(crate) fn parse_args<T: DeserializeOwned + Default>(args: Value) -> Result<T, String> {
    match args {
        Value::Null => Ok(T::default()),
        args => serde_json::from_value(args).map_err(|e| format!("Invalid arguments: {}", e)),
    }
}

/// Shape a single-source result as `{status, count, <key>: [...], ..extra}`
pub(crate) fn source_response(result: SourceResult, key: &str, extra: Map<String, Value>) -> Value {
    match result {
        SourceResult::Success { items } => {
            let mut body = Map::new();
            body.insert("status".to_string(), json!("success"));
            body.insert("count".to_string(), json!(items.len()));
            body.insert(key.to_string(), json!(items));
            body.extend(extra);
            Value::Object(body)
        }
        SourceResult::Failure(failure) => json!({
            "status": "error",
            "message": failure.reason,
            "kind": failure.kind,
        }),
    }
}

/// Handler for `search_papers`
#[derive(Debug)]
pub struct SearchPapersHandler {
    pub sources: SourceRegistry,
}

#[async_trait::async_trait]
impl ToolHandler for SearchPapersHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let params: PaperSearchParams = parse_args(args)?;
        let result = self.sources.papers().fetch(&params).await;

        let mut extra = Map::new();
        extra.insert("query".to_string(), json!(params.query));
        Ok(source_response(result, "papers", extra))
    }
}

/// Handler for `fetch_trending_repos`
#[derive(Debug)]
pub struct TrendingReposHandler {
    pub sources: SourceRegistry,
}

#[async_trait::async_trait]
impl ToolHandler for TrendingReposHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let params: TrendingRepoParams = parse_args(args)?;
        let result = self.sources.repositories().fetch(&params).await;

        let mut extra = Map::new();
        extra.insert("timeframe".to_string(), json!(params.timeframe));
        Ok(source_response(result, "repositories", extra))
    }
}

/// Handler for `search_product_launches`
#[derive(Debug)]
pub struct ProductLaunchesHandler {
    pub sources: SourceRegistry,
}

#[async_trait::async_trait]
impl ToolHandler for ProductLaunchesHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let params: ProductLaunchParams = parse_args(args)?;
        let result = self.sources.products().fetch(&params).await;
        Ok(source_response(result, "products", Map::new()))
    }
}

/// Handler for `fetch_social_trends`
#[derive(Debug)]
pub struct SocialTrendsHandler {
    pub sources: SourceRegistry,
}

#[async_trait::async_trait]
impl ToolHandler for SocialTrendsHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let params: SocialTrendParams = parse_args(args)?;
        let result = self.sources.tweets().fetch(&params).await;
        Ok(source_response(result, "trending", Map::new()))
    }
}

/// Handler for `fetch_all_research`
#[derive(Debug)]
pub struct FetchAllResearchHandler {
    pub aggregator: Aggregator,
    /// Used for any field the caller leaves out
    pub defaults: ResearchConfig,
}

impl FetchAllResearchHandler {
    fn research_config(&self, args: &Value) -> Result<ResearchConfig, String> {
        let Some(overrides) = args.get("config").filter(|v| !v.is_null()) else {
            return Ok(self.defaults.clone());
        };
        let Some(overrides) = overrides.as_object() else {
            return Err("Invalid arguments: 'config' must be an object".to_string());
        };

        let mut merged = serde_json::to_value(&self.defaults).map_err(|e| e.to_string())?;
        if let Value::Object(base) = &mut merged {
            for (key, value) in overrides {
                base.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(merged).map_err(|e| format!("Invalid arguments: {}", e))
    }
}

#[async_trait::async_trait]
impl ToolHandler for FetchAllResearchHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let config = self.research_config(&args)?;
        let result = self.aggregator.fetch_all(&config).await;

        let mut body = serde_json::to_value(&result).map_err(|e| e.to_string())?;
        if let Value::Object(map) = &mut body {
            map.insert("config".to_string(), json!(config));
        }
        Ok(body)
    }
}

/// Handler for `create_digest_draft`
#[derive(Debug)]
pub struct CreateDigestDraftHandler {
    /// Title prefix for new drafts
    pub title: String,
}

#[derive(Debug, serde::Deserialize)]
struct DraftArgs {
    #[serde(default)]
    research_data: BTreeMap<String, Vec<Item>>,
    #[serde(default = "first_issue")]
    issue_number: u32,
}

impl Default for DraftArgs {
    fn default() -> Self {
        Self {
            research_data: BTreeMap::new(),
            issue_number: first_issue(),
        }
    }
}

fn first_issue() -> u32 {
    1
}

#[async_trait::async_trait]
impl ToolHandler for CreateDigestDraftHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let args: DraftArgs = parse_args(args)?;
        let draft = digest::create_draft(&args.research_data, args.issue_number, &self.title);

        Ok(json!({
            "status": "success",
            "draft": draft,
        }))
    }
}

#[derive(Debug, Default, serde::Deserialize)]
struct DraftRef {
    #[serde(default)]
    draft: Digest,
}

/// Handler for `validate_digest`
#[derive(Debug)]
pub struct ValidateDigestHandler;

#[async_trait::async_trait]
impl ToolHandler for ValidateDigestHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let args: DraftRef = parse_args(args)?;
        serde_json::to_value(digest::validate(&args.draft)).map_err(|e| e.to_string())
    }
}

/// Handler for `preview_digest`
#[derive(Debug)]
pub struct PreviewDigestHandler;

#[async_trait::async_trait]
impl ToolHandler for PreviewDigestHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let args: DraftRef = parse_args(args)?;
        let preview = digest::preview(&args.draft);

        Ok(json!({
            "status": "success",
            "preview": preview.preview,
            "word_count": preview.word_count,
        }))
    }
}

/// Handler for `organize_content_sections`
#[derive(Debug)]
pub struct OrganizeSectionsHandler;

#[derive(Debug, Default, serde::Deserialize)]
struct OrganizeArgs {
    #[serde(default)]
    raw_content: Map<String, Value>,
    #[serde(default)]
    priorities: Option<Vec<String>>,
}

#[async_trait::async_trait]
impl ToolHandler for OrganizeSectionsHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let args: OrganizeArgs = parse_args(args)?;
        let organized = match &args.priorities {
            Some(priorities) => digest::organize_sections(&args.raw_content, priorities),
            None => digest::organize_sections(&args.raw_content, &digest::DEFAULT_PRIORITIES),
        };

        Ok(json!({
            "status": "success",
            "organized_content": organized,
        }))
    }
}
