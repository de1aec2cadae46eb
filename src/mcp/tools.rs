//! Tool registry for MCP tools.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use super::handlers::{
    CreateDigestDraftHandler, FetchAllResearchHandler, OrganizeSectionsHandler,
    PreviewDigestHandler, ProductLaunchesHandler, SearchPapersHandler, SocialTrendsHandler,
    TrendingReposHandler, ValidateDigestHandler,
};
use crate::aggregator::Aggregator;
use crate::config::Config;
use crate::sources::{SourceRegistry, DEFAULT_HASHTAGS};

/// An MCP tool that can be called by the client
#[derive(Clone)]
pub struct Tool {
    /// Tool name (e.g., "search_papers")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for input parameters
    pub input_schema: serde_json::Value,

    /// Handler function to execute the tool
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish()
    }
}

/// Handler for executing a tool
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync + std::fmt::Debug {
    /// Execute the tool with the given arguments
    async fn execute(&self, args: Value) -> Result<Value, String>;
}

/// Registry for all MCP tools
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Tool>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register the research and digest tools backed by `sources`
    pub fn from_sources(sources: &SourceRegistry, aggregator: Aggregator, config: &Config) -> Self {
        let mut registry = Self::new();
        registry.register_research_tools(sources, aggregator, config);
        registry.register_digest_tools(config);
        registry
    }

    fn register_research_tools(
        &mut self,
        sources: &SourceRegistry,
        aggregator: Aggregator,
        config: &Config,
    ) {
        let defaults = config.research.defaults();

        self.register(Tool {
            name: "search_papers".to_string(),
            description: "Search arXiv for recent papers matching a query".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query string",
                        "default": "artificial intelligence"
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of papers to return",
                        "default": 10
                    },
                    "days_back": {
                        "type": "integer",
                        "description": "Only include papers published in the last N days",
                        "default": 7
                    }
                }
            }),
            handler: Arc::new(SearchPapersHandler {
                sources: sources.clone(),
            }),
        });

        self.register(Tool {
            name: "fetch_trending_repos".to_string(),
            description: "Find the most-starred recently created GitHub repositories".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "language": {
                        "type": "string",
                        "description": "Programming language filter (empty for any)",
                        "default": "python"
                    },
                    "timeframe": {
                        "type": "string",
                        "description": "Creation window",
                        "enum": ["daily", "weekly", "monthly"],
                        "default": "weekly"
                    },
                    "topic": {
                        "type": "string",
                        "description": "GitHub topic filter (empty for any)",
                        "default": "artificial-intelligence"
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of repositories",
                        "default": 10
                    }
                }
            }),
            handler: Arc::new(TrendingReposHandler {
                sources: sources.clone(),
            }),
        });

        self.register(Tool {
            name: "search_product_launches".to_string(),
            description: "List the most-voted recent AI launches on Product Hunt (requires PRODUCT_HUNT_API_KEY)".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "days_back": {
                        "type": "integer",
                        "description": "Lookback window in days",
                        "default": 7
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of launches (provider caps pages at 20)",
                        "default": 10
                    }
                }
            }),
            handler: Arc::new(ProductLaunchesHandler {
                sources: sources.clone(),
            }),
        });

        self.register(Tool {
            name: "fetch_social_trends".to_string(),
            description: "Top ten most engaging recent posts for a set of hashtags (requires TWITTER_BEARER_TOKEN)".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "hashtags": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Hashtags to search, with or without '#'",
                        "default": DEFAULT_HASHTAGS
                    },
                    "min_likes": {
                        "type": "integer",
                        "description": "Minimum like count",
                        "default": 100
                    },
                    "days_back": {
                        "type": "integer",
                        "description": "Lookback window in days",
                        "default": 7
                    }
                }
            }),
            handler: Arc::new(SocialTrendsHandler {
                sources: sources.clone(),
            }),
        });

        self.register(Tool {
            name: "fetch_all_research".to_string(),
            description: format!(
                "Gather papers, repositories, product launches and posts from {} sources in one call. Failed sources are listed in 'errors' and the rest are still returned.",
                aggregator.sources().len()
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "config": {
                        "type": "object",
                        "description": "Overrides for the batch; omitted fields use the server defaults",
                        "properties": {
                            "days_back": {"type": "integer", "default": defaults.days_back},
                            "max_papers": {"type": "integer", "default": defaults.max_papers},
                            "max_repos": {"type": "integer", "default": defaults.max_repos},
                            "max_products": {"type": "integer", "default": defaults.max_products}
                        }
                    }
                }
            }),
            handler: Arc::new(FetchAllResearchHandler {
                aggregator,
                defaults,
            }),
        });
    }

    fn register_digest_tools(&mut self, config: &Config) {
        let draft_schema = json!({
            "type": "object",
            "properties": {
                "draft": {
                    "type": "object",
                    "description": "Digest draft as returned by create_digest_draft"
                }
            },
            "required": ["draft"]
        });

        self.register(Tool {
            name: "create_digest_draft".to_string(),
            description: "Create a structured digest draft from fetch_all_research output".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "research_data": {
                        "type": "object",
                        "description": "The research_data mapping from fetch_all_research"
                    },
                    "issue_number": {
                        "type": "integer",
                        "description": "Digest issue number",
                        "default": 1
                    }
                },
                "required": ["research_data"]
            }),
            handler: Arc::new(CreateDigestDraftHandler {
                title: config.digest.title.clone(),
            }),
        });

        self.register(Tool {
            name: "organize_content_sections".to_string(),
            description: "Order raw research content into digest sections by priority".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "raw_content": {
                        "type": "object",
                        "description": "Raw content keyed by section name"
                    },
                    "priorities": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Section names in priority order (default: big_story, papers, products, repositories, tweets)"
                    }
                },
                "required": ["raw_content"]
            }),
            handler: Arc::new(OrganizeSectionsHandler),
        });

        self.register(Tool {
            name: "validate_digest".to_string(),
            description: "Check a digest draft for missing required parts and thin sections".to_string(),
            input_schema: draft_schema.clone(),
            handler: Arc::new(ValidateDigestHandler),
        });

        self.register(Tool {
            name: "preview_digest".to_string(),
            description: "Render a plain-text preview of a digest draft".to_string(),
            input_schema: draft_schema,
            handler: Arc::new(PreviewDigestHandler),
        });
    }

    /// Register a tool
    pub fn register(&mut self, tool: Tool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get all tools, sorted by name
    pub fn all(&self) -> Vec<&Tool> {
        let mut tools: Vec<&Tool> = self.tools.values().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, String> {
        let tool = self
            .get(name)
            .ok_or_else(|| format!("Tool '{}' not found", name))?;

        tracing::debug!(tool = name, "Executing tool");
        tool.handler.execute(args).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
