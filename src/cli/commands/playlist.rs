use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::cli::commands::utils::{build_service, format_entry, open_store};

pub async fn list(favorites_only: bool, playlist: Option<&str>, data_dir: &Path) -> Result<()> {
    let service = build_service(playlist, data_dir)?;

    let entries = service
        .activate()
        .await
        .context("Failed to fetch playlist")?;

    let favorites = entries.iter().filter(|e| e.is_favorite).count();
    println!(
        "\nPlaylist: {} videos, {} favorite(s)\n",
        entries.len(),
        favorites
    );

    for item in entries.iter().filter(|e| !favorites_only || e.is_favorite) {
        println!("{}", format_entry(item));
    }

    Ok(())
}

pub async fn toggle(video_id: &str, playlist: Option<&str>, data_dir: &Path) -> Result<()> {
    let service = build_service(playlist, data_dir)?;

    // the toggle itself works offline, the fetch only gives us a title
    if let Err(e) = service.activate().await {
        warn!(error = %e, "Playlist unavailable, toggling without it");
    }

    let favorite = service
        .toggle_favorite(video_id)
        .with_context(|| format!("Failed to toggle favorite for {}", video_id))?;

    let state = service.current_state();
    let title = state
        .entries
        .iter()
        .find(|e| e.entry.video_id == video_id)
        .map(|e| e.entry.title.as_str())
        .unwrap_or(video_id);

    if favorite {
        println!("♥ Saved {}", title);
    } else {
        println!("Removed {} from favorites", title);
    }

    Ok(())
}

pub async fn favorites(data_dir: &Path) -> Result<()> {
    let store = open_store(data_dir)?;
    let saved = store.list();

    if saved.is_empty() {
        println!("No favorites yet. Use 'tubefav toggle <video-id>' to save one.");
        return Ok(());
    }

    println!("\nFavorites ({}):\n", saved.len());
    for video in saved {
        println!(
            "♥ {}  saved {}",
            video.youtube_id,
            video.saved_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}
