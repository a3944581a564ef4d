use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::{
    provider::YoutubeClient,
    state::{credentials, Config, FileFavoritesStore},
    sync::{PlaylistSyncService, SyncConfig, ViewModelEntry},
};

/// Extract playlist ID from URL or return as-is if already an ID
pub fn extract_playlist_id(input: &str) -> Result<String> {
    let input = input.trim();
    if !(input.contains("youtube.com") || input.contains("youtu.be")) {
        return Ok(input.to_string());
    }

    // https://www.youtube.com/playlist?list=PLrAXtmErZgOeiKm4sgNOknGvNjby9efdf
    let query = input.split_once('?').map(|(_, query)| query).unwrap_or_default();
    let query = query.split('#').next().unwrap_or_default();

    match query.split('&').find_map(|pair| pair.strip_prefix("list=")) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => bail!("'{}' has no playlist in it (expected a list= parameter)", input),
    }
}

pub fn open_store(data_dir: &Path) -> Result<Arc<FileFavoritesStore>> {
    let path = FileFavoritesStore::favorites_path(data_dir);
    let store = FileFavoritesStore::open(&path)?;
    Ok(Arc::new(store))
}

/// Wire config, API key and favorites into a ready-to-activate service.
pub fn build_service(playlist: Option<&str>, data_dir: &Path) -> Result<PlaylistSyncService> {
    let config = Config::load_or_default(&Config::config_path(data_dir))?;

    let playlist_id = playlist
        .map(extract_playlist_id)
        .transpose()?
        .or(config.playlist_id)
        .context("No playlist configured. Run 'tubefav init <playlist>' or pass --playlist.")?;

    let api_key = credentials::resolve_api_key(data_dir)?;
    let store = open_store(data_dir)?;

    let sync_config = SyncConfig {
        playlist_id,
        max_results: config.max_results,
        api_key,
    };

    Ok(PlaylistSyncService::new(
        Arc::new(YoutubeClient::new()),
        store,
        sync_config,
    ))
}

pub fn format_entry(item: &ViewModelEntry) -> String {
    let mark = if item.is_favorite { "♥" } else { " " };
    format!(
        "{:>3}. [{}] {}  ({})",
        item.entry.position, mark, item.entry.title, item.entry.video_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PlaylistEntry;

    #[test]
    fn test_extract_playlist_id_from_url() {
        assert_eq!(
            extract_playlist_id(
                "https://www.youtube.com/playlist?list=PL9JwhzITbbGZGA5qjHDbVfNQnK5Sc_XWG&si=abc"
            )
            .unwrap(),
            "PL9JwhzITbbGZGA5qjHDbVfNQnK5Sc_XWG"
        );
        assert_eq!(
            extract_playlist_id(" https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PLxyz#t=3 \n")
                .unwrap(),
            "PLxyz"
        );
    }

    #[test]
    fn test_extract_playlist_id_passthrough() {
        assert_eq!(extract_playlist_id("  PLabc ").unwrap(), "PLabc");
    }

    #[test]
    fn test_extract_playlist_id_rejects_url_without_list() {
        for input in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/playlist?list=",
            "https://www.youtube.com/watch?v=abc&playlist=PLnope",
        ] {
            assert!(extract_playlist_id(input).is_err(), "accepted {}", input);
        }
    }

    #[test]
    fn test_format_entry() {
        let item = ViewModelEntry {
            entry: PlaylistEntry {
                video_id: "x1".to_string(),
                title: "A".to_string(),
                position: 3,
            },
            is_favorite: true,
        };
        assert_eq!(format_entry(&item), "  3. [♥] A  (x1)");
    }
}
