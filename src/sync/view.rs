use crate::provider::{FetchError, PlaylistEntry, PlaylistPage};
use crate::state::{FavoritesStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModelEntry {
    pub entry: PlaylistEntry,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Point-in-time copy of what the service currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncState {
    pub status: SyncStatus,
    pub entries: Vec<ViewModelEntry>,
    /// Set only while `status` is `Failed`
    pub error: Option<FetchError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Full replacement sequence, never a diff
    Published(Vec<ViewModelEntry>),
    FetchFailed(FetchError),
    StoreFailed { video_id: String, error: StoreError },
}

/// Flag every entry of `page` against the store, keeping page order.
pub fn build_entries(page: &PlaylistPage, store: &dyn FavoritesStore) -> Vec<ViewModelEntry> {
    page.entries()
        .iter()
        .map(|entry| ViewModelEntry {
            is_favorite: store.contains(&entry.video_id),
            entry: entry.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::favorites::MockFavoritesStore;

    #[test]
    fn test_build_entries_flags_duplicates_independently() {
        let page = PlaylistPage::new(vec![
            PlaylistEntry {
                video_id: "x1".to_string(),
                title: "A".to_string(),
                position: 0,
            },
            PlaylistEntry {
                video_id: "x2".to_string(),
                title: "B".to_string(),
                position: 1,
            },
            PlaylistEntry {
                video_id: "x1".to_string(),
                title: "A again".to_string(),
                position: 2,
            },
        ]);

        let mut store = MockFavoritesStore::new();
        store
            .expect_contains()
            .times(3)
            .returning(|id| id == "x1");

        let entries = build_entries(&page, &store);
        let flags: Vec<(&str, bool)> = entries
            .iter()
            .map(|e| (e.entry.title.as_str(), e.is_favorite))
            .collect();

        assert_eq!(flags, vec![("A", true), ("B", false), ("A again", true)]);
    }
}
