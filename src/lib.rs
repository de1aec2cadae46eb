//! # Research Digest
//!
//! A Model Context Protocol (MCP) server that gathers recent AI research content
//! (arXiv papers, trending GitHub repositories, Product Hunt launches and
//! Twitter posts) and assembles it into digest drafts.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`]: Configuration file, environment overrides and credential checks
//! - [`models`]: Items, per-source results and the aggregate result
//! - [`sources`]: One adapter per provider behind the [`Source`] trait
//! - [`aggregator`]: Fan-out over every configured source with failure isolation
//! - [`digest`]: Draft, validate and preview digests
//! - [`mcp`]: Tool registry and the pmcp server
//! - [`utils`]: HTTP client, rate limiter and text helpers

pub mod aggregator;
pub mod config;
pub mod digest;
pub mod mcp;
pub mod models;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use aggregator::{Aggregator, FetchMode};
pub use config::Config;
pub use models::{AggregateResult, AggregateStatus, Item, ResearchConfig, SourceResult};
pub use sources::{Source, SourceRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
