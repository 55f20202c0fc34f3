//! Scraper for the Naver portal verticals.
//!
//! Provides the HTTP session, page parsing, and embedded-payload extraction.

use url::Url;

pub mod cache;
pub mod extract;
pub mod fetcher;
pub mod parsers;
pub mod project;
pub mod rate_limiter;

pub use cache::{CacheCategory, PageCache};
pub use extract::{extract, extract_all, ExtractionOutcome};
pub use fetcher::Fetcher;
pub use rate_limiter::RateLimiter;

/// Base URLs for the portal
pub const SEARCH_URL: &str = "https://search.naver.com/search.naver";
pub const SHOPPING_URL: &str = "https://search.shopping.naver.com/search/all";

/// Results per page on the search/news verticals
pub const PAGE_SIZE: u32 = 10;

/// `start` parameter for a 1-based page on search/news (1, 11, 21, ...)
fn page_start(page: u32) -> u32 {
    (page.max(1) - 1) * PAGE_SIZE + 1
}

/// Build an integrated web search URL
pub fn search_url(query: &str, page: u32) -> String {
    let start = page_start(page).to_string();
    let url = Url::parse_with_params(
        SEARCH_URL,
        [("where", "nexearch"), ("query", query), ("start", start.as_str())],
    )
    .expect("static base URL");
    url.into()
}

/// Build a news search URL
pub fn news_url(query: &str, page: u32) -> String {
    let start = page_start(page).to_string();
    let url = Url::parse_with_params(
        SEARCH_URL,
        [("where", "news"), ("query", query), ("start", start.as_str())],
    )
    .expect("static base URL");
    url.into()
}

/// Build a shopping search URL (shopping paginates by index, not offset)
pub fn shopping_url(query: &str, page: u32) -> String {
    let index = page.max(1).to_string();
    let url = Url::parse_with_params(
        SHOPPING_URL,
        [("query", query), ("pagingIndex", index.as_str())],
    )
    .expect("static base URL");
    url.into()
}
