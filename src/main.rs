//! Wikifeed main entry point
//!
//! This is the command-line interface for the Wikifeed trending-article feed.

use anyhow::Context;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use wikifeed::config::{load_config_with_hash, Config};
use wikifeed::crawler::crawl;
use wikifeed::output::{load_statistics, print_articles, print_report, print_statistics};
use wikifeed::project::ensure_project;
use wikifeed::server::serve;
use wikifeed::storage::open_storage;
use wikifeed::{ArticleSource, ArticleStore, Denylist, RankingFilter, WikiClient};

/// Wikifeed: trending Wikipedia articles, refreshed
///
/// Wikifeed fetches the daily most-viewed articles of each configured
/// Wikipedia project, collects their summaries and lead images, and keeps a
/// rolling feed of them in a SQLite database.
#[derive(Parser, Debug)]
#[command(name = "wikifeed")]
#[command(version = "1.0.0")]
#[command(about = "A trending Wikipedia article feed", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true, default_value = "wikifeed.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database schema
    Setup,

    /// Run one crawl pass over every configured project
    Crawl,

    /// Print the current top articles of a project without storing them
    FetchTopArticles {
        #[arg(long, default_value = "en")]
        project: String,

        #[arg(long, default_value_t = 10)]
        num_articles: usize,
    },

    /// List stored articles of a project, most viewed first
    Articles {
        #[arg(long, default_value = "en")]
        project: String,

        #[arg(long, default_value_t = 0)]
        offset: u32,

        #[arg(long, default_value_t = 20)]
        limit: u32,
    },

    /// Write a project's stored feed as markdown
    Export {
        #[arg(long, default_value = "en")]
        project: String,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        #[arg(long, default_value_t = 100)]
        limit: u32,
    },

    /// Serve the stored feed over HTTP
    Server {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },

    /// Show stored article counts for every configured project
    Stats,

    /// Validate the configuration and print it
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    match cli.command {
        Command::Setup => handle_setup(&config),
        Command::Crawl => handle_crawl(&config).await,
        Command::FetchTopArticles {
            project,
            num_articles,
        } => handle_fetch_top_articles(&config, &project, num_articles).await,
        Command::Articles {
            project,
            offset,
            limit,
        } => handle_articles(&config, &project, offset, limit).await,
        Command::Export {
            project,
            output,
            limit,
        } => handle_export(&config, &project, &output, limit).await,
        Command::Server { port } => handle_server(&config, port).await,
        Command::Stats => handle_stats(&config).await,
        Command::CheckConfig => {
            handle_check_config(&config, &config_hash);
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wikifeed=info,warn"),
            1 => EnvFilter::new("wikifeed=debug,info"),
            2 => EnvFilter::new("wikifeed=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn handle_setup(config: &Config) -> anyhow::Result<()> {
    open_storage(Path::new(&config.output.database_path))
        .with_context(|| format!("failed to set up {}", config.output.database_path))?;
    println!("✓ Database ready: {}", config.output.database_path);
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Projects: {}", config.crawler.projects.join(", "));

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping crawl");
            on_interrupt.cancel();
        }
    });

    match crawl(config, &cancel).await {
        Ok(report) => {
            tracing::info!("Crawl completed successfully");
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e).context("crawl failed")
        }
    }
}

/// Serves the read API until interrupted
async fn handle_server(config: &Config, port: u16) -> anyhow::Result<()> {
    let storage = open_storage(Path::new(&config.output.database_path))
        .with_context(|| format!("failed to open {}", config.output.database_path))?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping server");
            on_interrupt.cancel();
        }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    serve(Arc::new(storage), addr, cancel)
        .await
        .with_context(|| format!("server on {} failed", addr))
}

/// Fetches and prints the current top articles of a project
async fn handle_fetch_top_articles(
    config: &Config,
    project: &str,
    num_articles: usize,
) -> anyhow::Result<()> {
    ensure_project(project)?;

    let client = WikiClient::new(&config.user_agent, config.api.clone(), &config.crawler)?;
    let day = (Utc::now() - Duration::days(1)).date_naive();
    let ranking = client
        .fetch_ranking(project, day)
        .await
        .with_context(|| format!("failed to fetch the {} ranking for {}", project, day))?;
    let ranking = Denylist::new(&config.denylist).retain(ranking);

    for item in ranking.into_iter().take(num_articles) {
        match client.fetch_detail(project, &item.article).await {
            Ok(detail) => {
                println!("{}. {} ({} views)", item.rank, detail.title, item.views);
                println!("   {}\n", detail.extract);
            }
            Err(e) => {
                println!("{}. {} ({} views)", item.rank, item.article, item.views);
                println!("   [detail unavailable: {}]\n", e);
            }
        }
    }

    Ok(())
}

/// Lists stored articles of a project
async fn handle_articles(
    config: &Config,
    project: &str,
    offset: u32,
    limit: u32,
) -> anyhow::Result<()> {
    ensure_project(project)?;

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let articles = storage.get_articles(project, offset, limit).await?;
    print_articles(&articles, offset);

    Ok(())
}

/// Exports a project's stored feed as markdown
async fn handle_export(
    config: &Config,
    project: &str,
    output: &Path,
    limit: u32,
) -> anyhow::Result<()> {
    ensure_project(project)?;

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let articles = storage.get_articles(project, 0, limit).await?;

    wikifeed::output::write_markdown_feed(project, &articles, Utc::now(), output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "✓ Exported {} {} articles to: {}",
        articles.len(),
        project,
        output.display()
    );
    Ok(())
}

/// Shows stored article counts
async fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage, &config.crawler.projects).await?;
    print_statistics(&stats);

    Ok(())
}

/// Prints the parsed configuration
fn handle_check_config(config: &Config, config_hash: &str) {
    println!("=== Wikifeed Configuration ===\n");

    println!("Crawler:");
    println!("  Projects: {}", config.crawler.projects.join(", "));
    println!("  Retention: {}h", config.crawler.retention_hours);
    println!("  Write concurrency: {}", config.crawler.write_concurrency);
    println!(
        "  Rate limit: {} req/s (burst {})",
        config.crawler.rate_limit_rps, config.crawler.rate_limit_burst
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nAPI:");
    println!("  Pageviews: {}", config.api.pageviews_url);
    println!("  Project: {}", config.api.project_url_template);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nDenylist:");
    println!("  Prefixes: {:?}", config.denylist.prefixes);
    println!("  Exact: {:?}", config.denylist.exact);
    println!("  Contains: {:?}", config.denylist.contains);

    println!("\n✓ Configuration is valid (hash: {})", config_hash);
}
