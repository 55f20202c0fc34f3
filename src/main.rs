//! naver-crawl
//!
//! CLI crawler for Naver search, shopping, and news verticals.

mod cli;
mod config;
mod export;
mod retry;
mod scraper;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so piped record output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "naver_crawl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            query,
            pages,
            output,
            format,
            no_cache,
        } => cli::run_search(query, pages, output, format, no_cache).await,
        Commands::News {
            query,
            pages,
            output,
            format,
            no_cache,
        } => cli::run_news(query, pages, output, format, no_cache).await,
        Commands::Shopping {
            query,
            pages,
            output,
            format,
            no_cache,
        } => cli::run_shopping(query, pages, output, format, no_cache).await,
        Commands::Extract {
            input,
            marker,
            fields,
        } => cli::run_extract(input, marker, fields),
    }
}
