//! HTTP session for portal requests.
//!
//! One `reqwest` client carries the session headers and cookie jar; pacing
//! and retry wrap every GET. All knobs come from an immutable
//! [`FetcherConfig`] handed over at construction, so there is no ambient
//! session state anywhere in the process.

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use std::time::Duration;
use tracing::debug;

use crate::config::FetcherConfig;
use crate::retry::{retry, RetryPolicy};
use crate::scraper::rate_limiter::RateLimiter;

/// HTTP session with pacing and retry.
pub struct Fetcher {
    client: reqwest::Client,
    limiter: RateLimiter,
    retry: RetryPolicy,
}

impl Fetcher {
    /// Build a session from the given configuration.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("invalid user_agent")?,
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language).context("invalid accept_language")?,
        );
        if let Some(referer) = &config.referer {
            headers.insert(
                REFERER,
                HeaderValue::from_str(referer).context("invalid referer")?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            limiter: RateLimiter::new(
                config.requests_per_minute,
                config.delay_min_secs,
                config.delay_max_secs,
            ),
            retry: config.retry.clone(),
        })
    }

    /// Fetch one page as decoded text.
    ///
    /// Non-success statuses are errors and go through the retry policy.
    /// `reqwest` handles charset decoding, so callers always see UTF-8.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        self.limiter.acquire().await;
        debug!("GET {}", url);

        retry(&self.retry, url, || async {
            let response = self.client.get(url).send().await?;
            response.error_for_status()?.text().await
        })
        .await
        .with_context(|| format!("failed to fetch {}", url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_from_default_config() {
        let config = FetcherConfig::default();
        assert!(Fetcher::new(&config).is_ok());
    }

    #[test]
    fn test_rejects_invalid_header_value() {
        let config = FetcherConfig {
            user_agent: "bad\nagent".to_string(),
            ..FetcherConfig::default()
        };
        assert!(Fetcher::new(&config).is_err());
    }
}
