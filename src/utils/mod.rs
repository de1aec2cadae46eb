//! Utility modules supporting the source adapters.
//!
//! - [`HttpClient`]: HTTP client with a fixed per-adapter timeout
//! - [`RateLimiter`]: per-source minimum-spacing throttle
//! - [`truncate_chars`] / [`truncate_with_ellipsis`]: character-budget text truncation
//!
//! # Rate limiting
//!
//! ```rust,no_run
//! use research_digest::utils::RateLimiter;
//!
//! # #[tokio::main]
//! # async fn main() {
//! // 30 calls per minute: successive calls start at least two seconds apart
//! let limiter = RateLimiter::per_minute("papers", 30);
//! limiter.acquire().await;
//! limiter.acquire().await;
//! # }
//! ```

mod http;
mod rate_limit;
mod text;

pub use http::HttpClient;
pub use rate_limit::RateLimiter;
pub use text::{collapse_whitespace, truncate_chars, truncate_with_ellipsis};
