mod cli;
mod logging;
mod provider;
mod state;
mod sync;
mod utils;

use clap::Parser;
use cli::{Cli, Commands};
use state::Config;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (ignores if missing)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let data_dir = PathBuf::from(".tubefav");

    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        Config::load_or_default(&Config::config_path(&data_dir))
            .map(|config| config.log_level)
            .unwrap_or_else(|_| "info".to_string())
    };
    logging::init_tracing(&log_level)?;

    let playlist = cli.playlist.as_deref();

    match cli.command {
        Commands::Init {
            playlist,
            max_results,
        } => {
            cli::commands::init::run(&playlist, max_results, &data_dir).await?;
        }
        Commands::Auth { key } => {
            cli::commands::auth::run(key, &data_dir).await?;
        }
        Commands::Logout => {
            cli::commands::auth::logout(&data_dir).await?;
        }
        Commands::List { favorites_only } => {
            cli::commands::playlist::list(favorites_only, playlist, &data_dir).await?;
        }
        Commands::Toggle { video_id } => {
            cli::commands::playlist::toggle(&video_id, playlist, &data_dir).await?;
        }
        Commands::Favorites => {
            cli::commands::playlist::favorites(&data_dir).await?;
        }
        Commands::Play { video_id } => {
            cli::commands::play::run(&video_id).await?;
        }
        Commands::Session => {
            cli::commands::session::run(playlist, &data_dir).await?;
        }
    }

    Ok(())
}
