//! gigscout - research service-marketplace keywords from the terminal
//!
//! Thin driver around the core services: favorites and saved gigs live in
//! the durable state store, and the fetch command pulls listing pages
//! through the retrying client with an hour of caching.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gigscout::cli::{Cli, Command, FavoritesAction, GigsAction};
use gigscout::config::Config;
use gigscout::context::AppContext;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(path) = cli.state_file {
        config.state_file = Some(path);
    }
    if let Some(dir) = cli.cache_dir {
        config.cache_dir = Some(dir);
    }

    let ctx = AppContext::init(config)?;
    let result = run(&ctx, cli.command).await;
    ctx.close();
    result
}

/// Dispatches a parsed subcommand against the application context
async fn run(ctx: &AppContext, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Favorites { action } => match action {
            FavoritesAction::Add { keyword } => {
                ctx.store.add_to_favorites(&keyword)?;
                println!("Added '{}' to favorites", keyword);
            }
            FavoritesAction::Remove { keyword } => {
                ctx.store.remove_from_favorites(&keyword)?;
                println!("Removed '{}' from favorites", keyword);
            }
            FavoritesAction::List => {
                for keyword in ctx.store.get_favorites() {
                    println!("{}", keyword);
                }
            }
        },
        Command::Gigs { action } => match action {
            GigsAction::List => {
                for (keyword, _) in ctx.store.get_saved_gigs() {
                    println!("{}", keyword);
                }
            }
            GigsAction::Delete { keyword } => {
                ctx.store.delete_gig(&keyword)?;
                println!("Deleted saved gig for '{}'", keyword);
            }
        },
        Command::History => {
            for (keyword, _) in ctx.store.get_analysis_history() {
                println!("{}", keyword);
            }
        }
        Command::Fetch { url } => {
            let Some(ref fetcher) = ctx.fetcher else {
                return Err("SCRAPER_API_KEY is not set; the fetch command needs it".into());
            };
            let page = fetcher.fetch_page(&url).await?;
            println!("{}", page.html);
        }
        Command::Clear => {
            ctx.store.clear_state()?;
            ctx.cache.clear();
            println!("Cleared persisted state and cache");
        }
    }
    Ok(())
}
