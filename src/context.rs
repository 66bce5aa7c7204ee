//! Application context owning the core service instances
//!
//! One context is built at startup and passed by reference to every handler,
//! replacing ambient globals: it owns the retrying HTTP client, the cache,
//! the state store, and the optional page fetcher.

use thiserror::Error;
use tracing::debug;

use crate::cache::CacheManager;
use crate::client::ApiClient;
use crate::config::Config;
use crate::scrape::PageFetcher;
use crate::state::StateStore;

/// Errors that can occur while initializing the context
#[derive(Debug, Error)]
pub enum ContextError {
    /// No platform directory could be resolved and no explicit path was set
    #[error("could not determine a {0} directory; set the path explicitly")]
    NoProjectDirs(&'static str),
}

/// Shared handles for the core services
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Configuration the context was built from
    pub config: Config,
    /// Retrying HTTP client (one connection pool per context)
    pub client: ApiClient,
    /// Time-bounded disk cache
    pub cache: CacheManager,
    /// Durable state store
    pub store: StateStore,
    /// Page fetcher; present only when a scraper API key is configured
    pub fetcher: Option<PageFetcher>,
}

impl AppContext {
    /// Initializes the context from a configuration
    ///
    /// Paths not set in the configuration fall back to the platform's XDG
    /// directories.
    pub fn init(config: Config) -> Result<Self, ContextError> {
        let client = ApiClient::with_policy(config.retry.clone());

        let cache = match config.cache_dir {
            Some(ref dir) => CacheManager::with_dir(dir.clone()),
            None => CacheManager::new().ok_or(ContextError::NoProjectDirs("cache"))?,
        };
        let store = match config.state_file {
            Some(ref path) => StateStore::with_file(path.clone()),
            None => StateStore::new().ok_or(ContextError::NoProjectDirs("data"))?,
        };

        let fetcher = config
            .scraper_api_key
            .as_ref()
            .map(|key| PageFetcher::new(client.clone(), Some(cache.clone()), key.clone()));

        debug!("application context initialized");
        Ok(Self {
            config,
            client,
            cache,
            store,
            fetcher,
        })
    }

    /// Tears down the context
    ///
    /// Dropping the context releases the HTTP connection pool; this method
    /// just makes the lifecycle explicit at call sites.
    pub fn close(self) {
        debug!("application context closed");
    }
}
