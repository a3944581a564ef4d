use crate::cli::commands::utils::extract_playlist_id;
use crate::state::Config;
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub async fn run(playlist: &str, max_results: Option<u32>, data_dir: &Path) -> Result<()> {
    let playlist_id = extract_playlist_id(playlist)?;
    let config_path = Config::config_path(data_dir);

    let mut config = Config::load_or_default(&config_path)?;
    config.playlist_id = Some(playlist_id.clone());
    if let Some(max_results) = max_results {
        config.max_results = max_results;
    }

    config.save(&config_path)?;
    info!(playlist_id = %playlist_id, "Saved configuration");

    println!("Following playlist {}", playlist_id);
    println!("  Page size: {}", config.max_results);
    println!("  Config: {:?}", config_path);

    Ok(())
}
