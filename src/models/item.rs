//! Normalized content items returned by the source adapters.

use serde::{Deserialize, Serialize};

/// The kind of source an item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Paper,
    Repository,
    Product,
    Post,
}

impl SourceType {
    /// Returns the display name of the item kind
    pub fn name(&self) -> &'static str {
        match self {
            SourceType::Paper => "Paper",
            SourceType::Repository => "Repository",
            SourceType::Product => "Product",
            SourceType::Post => "Post",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A research paper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub title: String,

    /// First three authors
    pub authors: Vec<String>,

    /// Abstract, truncated with an ellipsis marker
    pub summary: String,

    /// Publication date (YYYY-MM-DD)
    pub published: String,

    /// Abstract page URL
    pub url: String,

    pub pdf_url: Option<String>,

    /// First three category tags
    pub categories: Vec<String>,
}

/// A trending source-code repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub stars: u64,
    pub forks: u64,
    pub url: String,
    pub language: String,

    /// First five topic tags
    pub topics: Vec<String>,

    pub created_at: String,
}

/// A product launch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub votes: u64,
    pub url: String,
    pub launch_date: String,
}

/// A social-platform post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub text: String,

    /// Handle, e.g. `@someone`
    pub author: String,
    pub author_name: String,
    pub likes: u64,

    /// Re-share count (retweets)
    pub reshares: u64,
    pub replies: u64,
    pub created_at: String,
    pub url: String,
}

impl Post {
    /// Composite engagement score used for ranking
    pub fn engagement(&self) -> u64 {
        self.likes.saturating_add(self.reshares.saturating_mul(2))
    }
}

/// One normalized record from any source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source_type", rename_all = "snake_case")]
pub enum Item {
    Paper(Paper),
    Repository(Repository),
    Product(Product),
    Post(Post),
}

impl Item {
    /// Display title or name
    pub fn title(&self) -> &str {
        match self {
            Item::Paper(p) => &p.title,
            Item::Repository(r) => &r.name,
            Item::Product(p) => &p.name,
            Item::Post(p) => &p.text,
        }
    }

    /// Canonical URL
    pub fn url(&self) -> &str {
        match self {
            Item::Paper(p) => &p.url,
            Item::Repository(r) => &r.url,
            Item::Product(p) => &p.url,
            Item::Post(p) => &p.url,
        }
    }

    pub fn source_type(&self) -> SourceType {
        match self {
            Item::Paper(_) => SourceType::Paper,
            Item::Repository(_) => SourceType::Repository,
            Item::Product(_) => SourceType::Product,
            Item::Post(_) => SourceType::Post,
        }
    }
}

impl From<Paper> for Item {
    fn from(paper: Paper) -> Self {
        Item::Paper(paper)
    }
}

impl From<Repository> for Item {
    fn from(repo: Repository) -> Self {
        Item::Repository(repo)
    }
}

impl From<Product> for Item {
    fn from(product: Product) -> Self {
        Item::Product(product)
    }
}

impl From<Post> for Item {
    fn from(post: Post) -> Self {
        Item::Post(post)
    }
}
