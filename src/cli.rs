//! Command-line interface parsing for gigscout
//!
//! This module defines the clap argument structure: subcommands for managing
//! favorites, saved gigs, and analysis history, plus a fetch command that
//! exercises the scraping proxy.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// gigscout - research service-marketplace keywords
#[derive(Parser, Debug)]
#[command(name = "gigscout")]
#[command(about = "Keyword research with cached scraping and locally persisted favorites")]
#[command(version)]
pub struct Cli {
    /// Override the state file path (default: XDG data dir)
    #[arg(long, value_name = "PATH")]
    pub state_file: Option<PathBuf>,

    /// Override the cache directory (default: XDG cache dir)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage favorite keywords
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Manage saved gigs
    Gigs {
        #[command(subcommand)]
        action: GigsAction,
    },
    /// List keywords with an analysis history entry
    History,
    /// Fetch a page through the scraping proxy (requires SCRAPER_API_KEY)
    Fetch {
        /// Target page URL
        url: String,
    },
    /// Reset all persisted state and empty the cache
    Clear,
}

/// Operations on the favorites collection
#[derive(Subcommand, Debug)]
pub enum FavoritesAction {
    /// Add a keyword to favorites
    Add { keyword: String },
    /// Remove a keyword from favorites
    Remove { keyword: String },
    /// List favorite keywords
    List,
}

/// Operations on the saved gigs collection
#[derive(Subcommand, Debug)]
pub enum GigsAction {
    /// List keywords with a saved gig
    List,
    /// Delete the saved gig for a keyword
    Delete { keyword: String },
}
