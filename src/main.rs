use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use is_terminal::IsTerminal;
use research_digest::aggregator::Aggregator;
use research_digest::config::{
    find_config_file, load_config, write_default_config, Config, ENV_GITHUB_TOKEN,
    ENV_GOOGLE_CLIENT_ID, ENV_GOOGLE_CLIENT_SECRET, ENV_GOOGLE_REFRESH_TOKEN,
    ENV_NEWSLETTER_FOLDER_ID, ENV_PRODUCT_HUNT_API_KEY, ENV_TWITTER_BEARER_TOKEN,
};
use research_digest::mcp::server::McpServer;
use research_digest::models::{ResearchConfig, SourceResult};
use research_digest::sources::{
    PaperSearchParams, ProductLaunchParams, SocialTrendParams, SourceRegistry,
    TrendingRepoParams,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Research Digest - Gather AI research content and draft digests
#[derive(Parser, Debug)]
#[command(name = "research-digest")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Gather AI papers, repositories, launches and posts for a research digest", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the MCP server
    Serve {
        /// Use stdio transport (default)
        #[arg(long, default_value_t = true)]
        stdio: bool,

        /// Use streamable HTTP transport
        #[arg(long)]
        http: bool,

        /// Port for HTTP mode
        #[arg(long, default_value_t = 3000)]
        port: u16,

        /// Host for HTTP mode
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Fetch from every configured source in one batch
    #[command(alias = "r")]
    Research {
        /// Lookback window in days
        #[arg(long)]
        days_back: Option<u32>,

        /// Maximum number of papers
        #[arg(long)]
        max_papers: Option<usize>,

        /// Maximum number of repositories
        #[arg(long)]
        max_repos: Option<usize>,

        /// Maximum number of product launches
        #[arg(long)]
        max_products: Option<usize>,
    },

    /// Search arXiv for recent papers
    Papers {
        /// Search query string
        #[arg(default_value = "artificial intelligence")]
        query: String,

        /// Maximum number of results
        #[arg(long, short, default_value_t = 10)]
        max_results: usize,

        /// Lookback window in days
        #[arg(long, default_value_t = 7)]
        days_back: u32,
    },

    /// Find trending GitHub repositories
    Trending {
        /// Language filter (empty for any)
        #[arg(long, short, default_value = "python")]
        language: String,

        /// daily, weekly or monthly
        #[arg(long, short, default_value = "weekly")]
        timeframe: String,

        /// Topic filter (empty for any)
        #[arg(long, default_value = "artificial-intelligence")]
        topic: String,

        /// Maximum number of results
        #[arg(long, short, default_value_t = 10)]
        max_results: usize,
    },

    /// List recent Product Hunt launches
    Products {
        /// Lookback window in days
        #[arg(long, default_value_t = 7)]
        days_back: u32,

        /// Maximum number of launches
        #[arg(long, short, default_value_t = 10)]
        limit: usize,
    },

    /// Find the most engaging recent posts for a set of hashtags
    Social {
        /// Hashtags (defaults to the AI set)
        #[arg(long = "hashtag", short = 't')]
        hashtags: Vec<String>,

        /// Minimum like count
        #[arg(long, default_value_t = 100)]
        min_likes: u64,

        /// Lookback window in days
        #[arg(long, default_value_t = 7)]
        days_back: u32,
    },

    /// List sources and whether their credentials are configured
    #[command(alias = "ls")]
    Sources,

    /// Write a default configuration file
    InitConfig {
        /// Destination path
        #[arg(default_value = "research-digest.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
}

/// Print all recognised environment variables
fn print_env_vars() {
    println!("Research Digest - Environment Variables");
    println!();
    println!("Source credentials:");
    println!("  {:<28}GitHub token (optional, raises search quota)", ENV_GITHUB_TOKEN);
    println!("  {:<28}Product Hunt API key (source skipped when unset)", ENV_PRODUCT_HUNT_API_KEY);
    println!("  {:<28}Twitter API v2 bearer token (source skipped when unset)", ENV_TWITTER_BEARER_TOKEN);
    println!();
    println!("Document storage (required):");
    println!("  {:<28}OAuth client id", ENV_GOOGLE_CLIENT_ID);
    println!("  {:<28}OAuth client secret", ENV_GOOGLE_CLIENT_SECRET);
    println!("  {:<28}OAuth refresh token", ENV_GOOGLE_REFRESH_TOKEN);
    println!("  {:<28}Folder for digests (optional)", ENV_NEWSLETTER_FOLDER_ID);
    println!();
    println!("Overrides (any config key, '__' separates sections):");
    println!("  RESEARCH_DIGEST__HTTP__TIMEOUT_SECS            Request timeout (default: 15)");
    println!("  RESEARCH_DIGEST__RATE_LIMITS__PAPERS_PER_MINUTE  arXiv budget (default: 30, 0 = unlimited)");
    println!("  RESEARCH_DIGEST__RESEARCH__CONCURRENT           Fetch sources concurrently (default: true)");
    println!("  RESEARCH_DIGEST__LOGGING__LEVEL                 Log level (default: info)");
    println!("  RESEARCH_DIGEST__LOGGING__JSON                  Emit JSON log lines (default: false)");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                    Rust logging level (e.g., debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export PRODUCT_HUNT_API_KEY=\"your-key-here\"");
    println!("  export RESEARCH_DIGEST__RESEARCH__DAYS_BACK=\"3\"");
}

/// Log level from flags, falling back to the configured level
fn log_level(verbose: u8, quiet: bool, configured: &str) -> String {
    if quiet {
        return "error".to_string();
    }
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Print JSON, pretty on a terminal and compact otherwise
fn output_json<T: Serialize>(value: &T) -> Result<()> {
    let text = if std::io::stdout().is_terminal() {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}

/// Print a single-source result; failures go to stderr with a non-zero exit
fn output_source_result(result: SourceResult) -> Result<()> {
    match result {
        SourceResult::Success { items } => output_json(&items),
        SourceResult::Failure(failure) => {
            anyhow::bail!("{} failed ({:?}): {}", failure.source, failure.kind, failure.reason)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.env {
        print_env_vars();
        return Ok(());
    }

    let config_path = cli.config.clone().or_else(find_config_file);
    let config: Config = load_config(config_path.as_deref()).context("Failed to load configuration")?;

    let level = log_level(cli.verbose, cli.quiet, &config.logging.level);
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("research_digest={}", level)),
    );
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if config.logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry().with(filter).with(fmt_layer).init();
    }

    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    if let Some(Commands::InitConfig { path, force }) = &cli.command {
        if path.exists() && !force {
            anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
        }
        write_default_config(path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    config.validate().log();

    let registry = SourceRegistry::new(&config)?;

    match cli.command {
        Some(Commands::Serve {
            stdio,
            http,
            port,
            host,
        }) => {
            let server = McpServer::new(&registry, &config)?;

            if http || !stdio {
                let addr = format!("{}:{}", host, port);
                let (bound_addr, handle) = server.run_http(&addr).await?;
                tracing::info!("MCP server listening on {}", bound_addr);

                handle
                    .await
                    .map_err(|e| anyhow::anyhow!("Server task failed: {}", e))?;
            } else {
                server.run().await?;
            }
        }

        Some(Commands::Research {
            days_back,
            max_papers,
            max_repos,
            max_products,
        }) => {
            let defaults = config.research.defaults();
            let research = ResearchConfig {
                days_back: days_back.unwrap_or(defaults.days_back),
                max_papers: max_papers.unwrap_or(defaults.max_papers),
                max_repos: max_repos.unwrap_or(defaults.max_repos),
                max_products: max_products.unwrap_or(defaults.max_products),
            };

            let result = Aggregator::from_registry(&registry, &config)
                .fetch_all(&research)
                .await;
            output_json(&result)?;
        }

        Some(Commands::Papers {
            query,
            max_results,
            days_back,
        }) => {
            let params = PaperSearchParams {
                query,
                max_results,
                days_back,
            };
            output_source_result(registry.papers().fetch(&params).await)?;
        }

        Some(Commands::Trending {
            language,
            timeframe,
            topic,
            max_results,
        }) => {
            let params = TrendingRepoParams {
                language,
                timeframe,
                topic,
                max_results,
            };
            output_source_result(registry.repositories().fetch(&params).await)?;
        }

        Some(Commands::Products { days_back, limit }) => {
            let params = ProductLaunchParams { days_back, limit };
            output_source_result(registry.products().fetch(&params).await)?;
        }

        Some(Commands::Social {
            hashtags,
            min_likes,
            days_back,
        }) => {
            let mut params = SocialTrendParams {
                min_likes,
                days_back,
                ..SocialTrendParams::default()
            };
            if !hashtags.is_empty() {
                params.hashtags = hashtags;
            }
            output_source_result(registry.tweets().fetch(&params).await)?;
        }

        Some(Commands::Sources) => {
            for source in registry.all() {
                let state = if source.is_configured() {
                    "configured"
                } else {
                    "missing credentials"
                };
                println!("{:<14} {:<14} {}", source.id(), source.name(), state);
            }
        }

        Some(Commands::InitConfig { .. }) => {}

        None => {
            // Default to stdio server, the way MCP clients launch us
            let server = McpServer::new(&registry, &config)?;
            server.run().await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["research-digest"]);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert!(!cli.env);
        assert!(cli.config.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::parse_from(["research-digest", "-vv"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(log_level(cli.verbose, false, "info"), "trace");
        assert_eq!(log_level(0, false, "warn"), "warn");
        assert_eq!(log_level(3, true, "info"), "error");
    }

    #[test]
    fn test_cli_serve_http_mode() {
        let cli = Cli::parse_from(["research-digest", "serve", "--http", "--port", "8080"]);
        match cli.command {
            Some(Commands::Serve { http, port, host, .. }) => {
                assert!(http);
                assert_eq!(port, 8080);
                assert_eq!(host, "127.0.0.1");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_research_overrides() {
        let cli = Cli::parse_from(["research-digest", "research", "--days-back", "3", "--max-repos", "5"]);
        match cli.command {
            Some(Commands::Research {
                days_back,
                max_papers,
                max_repos,
                ..
            }) => {
                assert_eq!(days_back, Some(3));
                assert_eq!(max_papers, None);
                assert_eq!(max_repos, Some(5));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_papers_defaults() {
        let cli = Cli::parse_from(["research-digest", "papers"]);
        match cli.command {
            Some(Commands::Papers {
                query,
                max_results,
                days_back,
            }) => {
                assert_eq!(query, "artificial intelligence");
                assert_eq!(max_results, 10);
                assert_eq!(days_back, 7);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_social_hashtags() {
        let cli = Cli::parse_from(["research-digest", "social", "-t", "rust", "--hashtag", "wasm"]);
        match cli.command {
            Some(Commands::Social { hashtags, min_likes, .. }) => {
                assert_eq!(hashtags, vec!["rust", "wasm"]);
                assert_eq!(min_likes, 100);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_init_config_and_global_flags() {
        let cli = Cli::parse_from([
            "research-digest",
            "init-config",
            "out.toml",
            "--config",
            "custom.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(
            cli.command,
            Some(Commands::InitConfig { ref path, force: false }) if path == &PathBuf::from("out.toml")
        ));
    }
}
