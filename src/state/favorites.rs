use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Failure reported by a favorites backend. Opaque to the sync core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Favorites store error: {message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Saved-video collection the sync service reads and mutates one id at a time.
#[cfg_attr(test, mockall::automock)]
pub trait FavoritesStore: Send + Sync {
    fn contains(&self, video_id: &str) -> bool;

    fn save(&self, video_id: &str) -> Result<(), StoreError>;

    fn remove(&self, video_id: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedVideo {
    pub youtube_id: String,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct FavoritesFile {
    #[serde(default)]
    videos: Vec<SavedVideo>,
}

/// YAML-backed store. Every mutation rewrites the whole file.
pub struct FileFavoritesStore {
    path: PathBuf,
    videos: Mutex<Vec<SavedVideo>>,
}

impl FileFavoritesStore {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let videos = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read favorites from {:?}", path))?;
            let file: FavoritesFile = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse favorites YAML from {:?}", path))?;
            file.videos
        } else {
            Vec::new()
        };

        debug!(path = ?path, count = videos.len(), "Opened favorites store");

        Ok(Self {
            path: path.to_path_buf(),
            videos: Mutex::new(videos),
        })
    }

    pub fn favorites_path(data_dir: &Path) -> PathBuf {
        data_dir.join("favorites.yaml")
    }

    /// Saved videos in the order they were added.
    pub fn list(&self) -> Vec<SavedVideo> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SavedVideo>> {
        self.videos.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn persist(&self, videos: &[SavedVideo]) -> Result<(), StoreError> {
        let file = FavoritesFile {
            videos: videos.to_vec(),
        };
        let yaml = serde_yaml::to_string(&file)
            .map_err(|e| StoreError::new(format!("failed to serialize favorites: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::new(format!("failed to create directory {:?}: {}", parent, e))
            })?;
        }

        fs::write(&self.path, yaml)
            .map_err(|e| StoreError::new(format!("failed to write {:?}: {}", self.path, e)))
    }
}

impl FavoritesStore for FileFavoritesStore {
    fn contains(&self, video_id: &str) -> bool {
        self.lock().iter().any(|v| v.youtube_id == video_id)
    }

    fn save(&self, video_id: &str) -> Result<(), StoreError> {
        let mut videos = self.lock();
        if videos.iter().any(|v| v.youtube_id == video_id) {
            return Ok(());
        }

        let mut updated = videos.clone();
        updated.push(SavedVideo {
            youtube_id: video_id.to_string(),
            saved_at: Utc::now(),
        });
        self.persist(&updated)?;
        *videos = updated;

        Ok(())
    }

    fn remove(&self, video_id: &str) -> Result<(), StoreError> {
        let mut videos = self.lock();
        if !videos.iter().any(|v| v.youtube_id == video_id) {
            return Ok(());
        }

        let updated: Vec<SavedVideo> = videos
            .iter()
            .filter(|v| v.youtube_id != video_id)
            .cloned()
            .collect();
        self.persist(&updated)?;
        *videos = updated;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_reopen() {
        let temp = TempDir::new().unwrap();
        let path = FileFavoritesStore::favorites_path(temp.path());

        let store = FileFavoritesStore::open(&path).unwrap();
        assert!(!store.contains("x1"));

        store.save("x1").unwrap();
        store.save("x2").unwrap();
        assert!(store.contains("x1"));

        let reopened = FileFavoritesStore::open(&path).unwrap();
        let ids: Vec<String> = reopened.list().into_iter().map(|v| v.youtube_id).collect();
        assert_eq!(ids, vec!["x1", "x2"]);
    }

    #[test]
    fn test_save_twice_keeps_one_record() {
        let temp = TempDir::new().unwrap();
        let store = FileFavoritesStore::open(&temp.path().join("favorites.yaml")).unwrap();

        store.save("x1").unwrap();
        store.save("x1").unwrap();

        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_remove() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("favorites.yaml");
        let store = FileFavoritesStore::open(&path).unwrap();

        store.save("x1").unwrap();
        store.remove("x1").unwrap();
        store.remove("never-saved").unwrap();

        assert!(!store.contains("x1"));
        assert!(FileFavoritesStore::open(&path).unwrap().list().is_empty());
    }

    #[test]
    fn test_write_failure_leaves_memory_untouched() {
        let temp = TempDir::new().unwrap();
        // a directory where the file should be makes every write fail
        let path = temp.path().join("favorites.yaml");
        fs::create_dir_all(&path).unwrap();

        let store = FileFavoritesStore {
            path: path.clone(),
            videos: Mutex::new(Vec::new()),
        };

        assert!(store.save("x1").is_err());
        assert!(!store.contains("x1"));
    }

    #[test]
    fn test_open_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("favorites.yaml");
        fs::write(&path, "videos: [[[").unwrap();

        assert!(FileFavoritesStore::open(&path).is_err());
    }
}
