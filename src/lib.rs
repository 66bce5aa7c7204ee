//! Gigscout core library
//!
//! The reusable core behind the keyword research tooling: a retrying HTTP
//! client, a time-bounded disk cache, a durable JSON state store, a cached
//! page fetcher over a scraping proxy, and the application context tying
//! them together. Page parsing and content generation live outside this
//! crate and call into these services.

pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod scrape;
pub mod state;
