//! CLI commands for naver-crawl.
//!
//! Crawl commands per vertical, plus a local extraction command for working
//! on saved documents.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::export::{write_records, ExportFormat};
use crate::scraper::extract::{extract_from, ExtractionOutcome};
use crate::scraper::parsers::{
    NewsArticle, NewsParser, SearchHit, SearchResultParser, ShoppingItem, ShoppingParser,
};
use crate::scraper::project::Projection;
use crate::scraper::{self, CacheCategory, Fetcher, PageCache};

#[derive(Parser)]
#[command(name = "naver-crawl")]
#[command(version, about = "Naver search/shopping/news crawler", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Crawl integrated web search results
    Search {
        /// Search query
        query: String,

        /// Pages to crawl (10 results per page)
        #[arg(short, long)]
        pages: Option<u32>,

        /// Write records to this file instead of printing a table
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (json, jsonl)
        #[arg(short, long, default_value = "jsonl")]
        format: String,

        /// Bypass the page cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Crawl news search results
    News {
        /// Search query
        query: String,

        /// Pages to crawl (10 results per page)
        #[arg(short, long)]
        pages: Option<u32>,

        /// Write records to this file instead of printing a table
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (json, jsonl)
        #[arg(short, long, default_value = "jsonl")]
        format: String,

        /// Bypass the page cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Crawl shopping search results
    Shopping {
        /// Search query
        query: String,

        /// Pages to crawl
        #[arg(short, long)]
        pages: Option<u32>,

        /// Write records to this file instead of printing a table
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (json, jsonl)
        #[arg(short, long, default_value = "jsonl")]
        format: String,

        /// Bypass the page cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Extract embedded JSON payloads from a saved document
    Extract {
        /// Path to the document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Marker literal preceding the payload
        #[arg(short, long)]
        marker: String,

        /// Project fields out of each payload (repeatable, NAME=PATH)
        #[arg(long = "field", value_name = "NAME=PATH")]
        fields: Vec<String>,
    },
}

struct CrawlSetup {
    config: AppConfig,
    fetcher: Fetcher,
    cache: Option<PageCache>,
}

fn crawl_setup(no_cache: bool) -> anyhow::Result<CrawlSetup> {
    let config = AppConfig::load()?;
    let fetcher = Fetcher::new(&config.fetcher)?;
    let cache = (config.cache.enabled && !no_cache)
        .then(|| PageCache::new(PathBuf::from(&config.cache.dir)));

    Ok(CrawlSetup {
        config,
        fetcher,
        cache,
    })
}

/// Fetch one page, through the cache when it is enabled.
async fn fetch_page(
    setup: &CrawlSetup,
    category: CacheCategory,
    key: &str,
    url: &str,
) -> anyhow::Result<String> {
    if let Some(cache) = &setup.cache {
        if let Some(html) = cache.get::<String>(category, key) {
            debug!("cache hit: {}", key);
            return Ok(html);
        }
    }

    let html = setup.fetcher.fetch(url).await?;

    if let Some(cache) = &setup.cache {
        if let Err(e) = cache.set(category, key, &html) {
            warn!("cache write failed for {}: {}", key, e);
        }
    }

    Ok(html)
}

/// Crawl the integrated web search vertical.
pub async fn run_search(
    query: String,
    pages: Option<u32>,
    output: Option<PathBuf>,
    format: String,
    no_cache: bool,
) -> anyhow::Result<()> {
    let setup = crawl_setup(no_cache)?;
    let pages = pages.unwrap_or(setup.config.crawl.pages).max(1);

    let mut hits: Vec<SearchHit> = Vec::new();
    for page in 1..=pages {
        let url = scraper::search_url(&query, page);
        let key = format!("{}_p{}", query, page);
        let html = fetch_page(&setup, CacheCategory::Search, &key, &url).await?;

        let page_hits = SearchResultParser::parse(&html)?;
        eprintln!("page {}: {} hits", page, page_hits.len());
        if page_hits.is_empty() {
            break;
        }
        hits.extend(page_hits);
    }

    match output {
        Some(path) => {
            write_records(&path, &hits, ExportFormat::from_flag(&format))?;
            eprintln!("{} hits written to {}", hits.len(), path.display());
        }
        None => print_search_table(&query, &hits),
    }

    Ok(())
}

/// Crawl the news vertical.
pub async fn run_news(
    query: String,
    pages: Option<u32>,
    output: Option<PathBuf>,
    format: String,
    no_cache: bool,
) -> anyhow::Result<()> {
    let setup = crawl_setup(no_cache)?;
    let pages = pages.unwrap_or(setup.config.crawl.pages).max(1);

    let mut articles: Vec<NewsArticle> = Vec::new();
    for page in 1..=pages {
        let url = scraper::news_url(&query, page);
        let key = format!("{}_p{}", query, page);
        let html = fetch_page(&setup, CacheCategory::News, &key, &url).await?;

        let page_articles = NewsParser::parse(&html)?;
        eprintln!("page {}: {} articles", page, page_articles.len());
        if page_articles.is_empty() {
            break;
        }
        articles.extend(page_articles);
    }

    match output {
        Some(path) => {
            write_records(&path, &articles, ExportFormat::from_flag(&format))?;
            eprintln!("{} articles written to {}", articles.len(), path.display());
        }
        None => print_news_table(&query, &articles),
    }

    Ok(())
}

/// Crawl the shopping vertical.
pub async fn run_shopping(
    query: String,
    pages: Option<u32>,
    output: Option<PathBuf>,
    format: String,
    no_cache: bool,
) -> anyhow::Result<()> {
    let setup = crawl_setup(no_cache)?;
    let pages = pages.unwrap_or(setup.config.crawl.pages).max(1);

    let mut items: Vec<ShoppingItem> = Vec::new();
    let mut total: Option<u64> = None;
    for page in 1..=pages {
        let url = scraper::shopping_url(&query, page);
        let key = format!("{}_p{}", query, page);
        let text = fetch_page(&setup, CacheCategory::Shopping, &key, &url).await?;

        // A broken payload spoils one page, not the batch
        let parsed = match ShoppingParser::parse(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("page {} skipped: {}", page, e);
                continue;
            }
        };

        total = total.or(parsed.total);
        eprintln!("page {}: {} products", page, parsed.items.len());
        if parsed.items.is_empty() {
            break;
        }
        items.extend(parsed.items);
    }

    match output {
        Some(path) => {
            write_records(&path, &items, ExportFormat::from_flag(&format))?;
            eprintln!("{} products written to {}", items.len(), path.display());
        }
        None => print_shopping_table(&query, total, &items),
    }

    Ok(())
}

/// Run the extractor over a saved document, one marker occurrence at a time.
pub fn run_extract(input: PathBuf, marker: String, fields: Vec<String>) -> anyhow::Result<()> {
    anyhow::ensure!(!marker.is_empty(), "marker must be non-empty");

    let text = std::fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let projection = parse_projection(&fields)?;

    let mut found = 0u32;
    let mut pos = 0usize;
    loop {
        let (outcome, next) = extract_from(&text, &marker, pos);
        match outcome {
            ExtractionOutcome::Found(payload) => {
                found += 1;
                match &projection {
                    Some(projection) => {
                        let projected = projection.project(&payload);
                        println!("{}", serde_json::to_string_pretty(&projected.record)?);
                        if !projected.missing.is_empty() {
                            eprintln!("missing fields: {}", projected.missing.join(", "));
                        }
                    }
                    None => println!("{}", serde_json::to_string_pretty(&payload)?),
                }
            }
            ExtractionOutcome::NotFound => {
                if found == 0 {
                    eprintln!("no payload found for marker `{}`", marker);
                }
                break;
            }
            ExtractionOutcome::MalformedJson => {
                eprintln!("payload after marker `{}` is malformed", marker);
                break;
            }
        }
        if next <= pos {
            break;
        }
        pos = next;
    }

    eprintln!("{} payload(s) extracted", found);
    Ok(())
}

/// Build a projection from repeated `NAME=PATH` flags.
fn parse_projection(fields: &[String]) -> anyhow::Result<Option<Projection>> {
    if fields.is_empty() {
        return Ok(None);
    }

    let mut projection = Projection::new();
    for field in fields {
        let (name, path) = field
            .split_once('=')
            .with_context(|| format!("expected NAME=PATH, got `{}`", field))?;
        projection = projection.field(name, path);
    }

    Ok(Some(projection))
}

fn print_search_table(query: &str, hits: &[SearchHit]) {
    println!("Query: {} ({} hits)", query, hits.len());
    println!();
    for (i, hit) in hits.iter().enumerate() {
        println!("{:3}. {}", i + 1, hit.title);
        if let Some(source) = &hit.source {
            println!("     [{}]", source);
        }
        println!("     {}", hit.url);
        if let Some(description) = &hit.description {
            println!("     {}", description);
        }
    }
}

fn print_news_table(query: &str, articles: &[NewsArticle]) {
    println!("Query: {} ({} articles)", query, articles.len());
    println!();
    for (i, article) in articles.iter().enumerate() {
        let press = article.press.as_deref().unwrap_or("-");
        let published = article.published.as_deref().unwrap_or("-");
        println!("{:3}. [{} | {}] {}", i + 1, press, published, article.title);
        println!("     {}", article.url);
    }
}

fn print_shopping_table(query: &str, total: Option<u64>, items: &[ShoppingItem]) {
    match total {
        Some(total) => println!("Query: {} ({} of {} products)", query, items.len(), total),
        None => println!("Query: {} ({} products)", query, items.len()),
    }
    println!();
    for (i, item) in items.iter().enumerate() {
        let price = item
            .price
            .map(|p| format!("{}원", p))
            .unwrap_or_else(|| "-".to_string());
        let mall = item.mall_name.as_deref().unwrap_or("-");
        println!("{:3}. {:>12}  {}  ({})", i + 1, price, item.title, mall);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_projection() {
        let fields = vec![
            "total=shoppingResult.total".to_string(),
            "first=shoppingResult.products[0].productTitle".to_string(),
        ];
        let projection = parse_projection(&fields).unwrap().unwrap();

        let payload = serde_json::json!({
            "shoppingResult": {"total": 9, "products": [{"productTitle": "티셔츠"}]}
        });
        let projected = projection.project(&payload);
        assert_eq!(projected.record.get("total"), Some(&serde_json::json!(9)));
        assert_eq!(
            projected.record.get("first"),
            Some(&serde_json::json!("티셔츠"))
        );
        assert!(projected.missing.is_empty());
    }

    #[test]
    fn test_parse_projection_rejects_bare_name() {
        let fields = vec!["nopath".to_string()];
        assert!(parse_projection(&fields).is_err());
    }

    #[test]
    fn test_parse_projection_empty_is_none() {
        assert!(parse_projection(&[]).unwrap().is_none());
    }
}
