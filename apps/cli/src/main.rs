//! seenlist CLI — builds a Radarr list from the Scott Hasn't Seen wiki page.
//!
//! Scrapes the episode list, resolves each movie on TMDB, and writes a
//! sorted JSON list Radarr can import.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    // A missing .env is fine; the key may come from the real environment.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
