//! Cached page fetching through a scraping proxy API
//!
//! Competitor listing pages are fetched via a rendering proxy and the raw
//! body is cached for an hour, so repeated research on the same keyword does
//! not re-scrape the same page. Parsing the fetched HTML is the caller's
//! concern; this module only moves bytes and timestamps.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::cache::CacheManager;
use crate::client::{ApiClient, ClientError};

/// Base URL of the scraping proxy
const SCRAPER_API_BASE_URL: &str = "http://api.scraperapi.com/";

/// How long a fetched page stays fresh in the cache
const PAGE_CACHE_MAX_AGE_HOURS: i64 = 1;

/// A fetched page body plus its fetch time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Raw page body as returned by the proxy
    pub html: String,
    /// When the page was fetched
    pub fetched_at: DateTime<Utc>,
}

/// Errors that can occur when fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    /// The proxy request failed (after retries)
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The response body could not be read
    #[error("failed to read response body: {0}")]
    Body(#[from] reqwest::Error),
}

/// Fetches rendered pages through the scraping proxy, cache-first
#[derive(Debug, Clone)]
pub struct PageFetcher {
    /// Retrying HTTP client used for proxy requests
    client: ApiClient,
    /// Cache for fetched pages; `None` disables caching
    cache: Option<CacheManager>,
    /// Scraping proxy API key
    api_key: String,
    /// Proxy base URL (overridable for testing)
    base_url: String,
}

impl PageFetcher {
    /// Creates a fetcher for the scraping proxy
    pub fn new(client: ApiClient, cache: Option<CacheManager>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            cache,
            api_key: api_key.into(),
            base_url: SCRAPER_API_BASE_URL.to_string(),
        }
    }

    /// Creates a fetcher pointed at a custom proxy URL (for testing)
    #[cfg(test)]
    fn with_base_url(
        client: ApiClient,
        cache: Option<CacheManager>,
        api_key: &str,
        base_url: String,
    ) -> Self {
        Self {
            client,
            cache,
            api_key: api_key.to_string(),
            base_url,
        }
    }

    /// Cache key for a target URL
    fn cache_key(url: &str) -> String {
        format!("page_data_{}", url)
    }

    /// Fetches a page, serving from cache when a fresh copy exists
    ///
    /// # Arguments
    /// * `url` - The target page URL (not the proxy URL)
    ///
    /// # Returns
    /// * `Ok(Page)` - The page body, from cache or freshly fetched
    /// * `Err(FetchError)` - If the proxy request exhausts its retries
    ///
    /// Cache reads and writes are best-effort; a broken cache only costs a
    /// re-fetch.
    pub async fn fetch_page(&self, url: &str) -> Result<Page, FetchError> {
        let key = Self::cache_key(url);

        if let Some(ref cache) = self.cache {
            if let Some(page) =
                cache.get::<Page>(&key, Duration::hours(PAGE_CACHE_MAX_AGE_HOURS))
            {
                debug!(url, "serving page from cache");
                return Ok(page);
            }
        }

        let mut params = HashMap::new();
        params.insert("api_key".to_string(), self.api_key.clone());
        params.insert("url".to_string(), url.to_string());
        params.insert("render".to_string(), "true".to_string());

        let response = self.client.get(&self.base_url, None, Some(&params)).await?;
        let html = response.text().await?;

        let page = Page {
            html,
            fetched_at: Utc::now(),
        };
        if let Some(ref cache) = self.cache {
            cache.set(&key, &page);
        }

        Ok(page)
    }
}
