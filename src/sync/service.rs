use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, info, warn};

use crate::provider::{FetchError, PlaylistClient, PlaylistPage};
use crate::state::{FavoritesStore, StoreError};
use crate::sync::view::{build_entries, SyncEvent, SyncState, SyncStatus, ViewModelEntry};

type Callback = Arc<dyn Fn(&SyncEvent) + Send + Sync>;
type Flight = Shared<BoxFuture<'static, Result<Vec<ViewModelEntry>, FetchError>>>;

/// Which playlist to sync and how.
#[derive(Clone)]
pub struct SyncConfig {
    pub playlist_id: String,
    pub max_results: u32,
    pub api_key: String,
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("playlist_id", &self.playlist_id)
            .field("max_results", &self.max_results)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

struct SyncInner {
    status: SyncStatus,
    /// Last page that fetched successfully
    page: Option<PlaylistPage>,
    entries: Vec<ViewModelEntry>,
    error: Option<FetchError>,
    generation: u64,
    /// Bumped on every change a subscriber can see
    version: u64,
    in_flight: Option<Flight>,
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    callbacks: Vec<(u64, Callback)>,
}

struct ServiceCore {
    client: Arc<dyn PlaylistClient>,
    store: Arc<dyn FavoritesStore>,
    config: SyncConfig,
    inner: Mutex<SyncInner>,
    subscribers: Mutex<Subscribers>,
    /// Version of the last view handed to subscribers. Held while
    /// delivering so deliveries never interleave.
    delivered: Mutex<u64>,
}

/// Keeps one playlist in sync with the favorites store and publishes the
/// merged view to subscribers.
///
/// Cloning is cheap and every clone drives the same state. At most one
/// fetch started by [`activate`](Self::activate) is in flight at a time.
#[derive(Clone)]
pub struct PlaylistSyncService {
    core: Arc<ServiceCore>,
}

/// Keeps a subscriber registered. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    core: Weak<ServiceCore>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(core) = self.core.upgrade() {
            core.lock_subscribers().callbacks.retain(|(id, _)| *id != self.id);
        }
    }
}

impl ServiceCore {
    fn lock_inner(&self) -> MutexGuard<'_, SyncInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_delivered(&self) -> MutexGuard<'_, u64> {
        self.delivered.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Deliver a view change stamped with `version`. A view older than the
    /// one subscribers already have is dropped.
    fn publish_view(&self, version: u64, event: &SyncEvent) {
        let mut delivered = self.lock_delivered();
        if version <= *delivered {
            debug!(version, delivered = *delivered, "Skipping outdated view");
            return;
        }
        *delivered = version;
        self.deliver(event);
    }

    fn publish_notice(&self, event: &SyncEvent) {
        let _delivered = self.lock_delivered();
        self.deliver(event);
    }

    fn deliver(&self, event: &SyncEvent) {
        let callbacks: Vec<Callback> = self
            .lock_subscribers()
            .callbacks
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in callbacks {
            callback(event);
        }
    }

    fn complete(
        &self,
        generation: u64,
        result: Result<PlaylistPage, FetchError>,
    ) -> Result<Vec<ViewModelEntry>, FetchError> {
        let (version, event, outcome) = {
            let mut inner = self.lock_inner();

            if inner.generation != generation {
                debug!(
                    generation,
                    current = inner.generation,
                    "Discarding superseded playlist fetch"
                );
                return result.map(|page| build_entries(&page, self.store.as_ref()));
            }

            inner.in_flight = None;
            inner.version += 1;
            let version = inner.version;

            match result {
                Ok(page) => {
                    let entries = build_entries(&page, self.store.as_ref());
                    info!(generation, entries = entries.len(), "Playlist sync ready");

                    inner.page = Some(page);
                    inner.entries = entries.clone();
                    inner.status = SyncStatus::Ready;
                    inner.error = None;

                    (version, SyncEvent::Published(entries.clone()), Ok(entries))
                }
                Err(error) => {
                    warn!(generation, error = %error, "Playlist sync failed");

                    inner.status = SyncStatus::Failed;
                    inner.error = Some(error.clone());

                    (version, SyncEvent::FetchFailed(error.clone()), Err(error))
                }
            }
        };

        self.publish_view(version, &event);
        outcome
    }
}

impl PlaylistSyncService {
    pub fn new(
        client: Arc<dyn PlaylistClient>,
        store: Arc<dyn FavoritesStore>,
        config: SyncConfig,
    ) -> Self {
        Self {
            core: Arc::new(ServiceCore {
                client,
                store,
                config,
                inner: Mutex::new(SyncInner {
                    status: SyncStatus::Idle,
                    page: None,
                    entries: Vec::new(),
                    error: None,
                    generation: 0,
                    version: 0,
                    in_flight: None,
                }),
                subscribers: Mutex::new(Subscribers::default()),
                delivered: Mutex::new(0),
            }),
        }
    }

    /// Start a fetch-and-publish cycle, or join the one already running.
    ///
    /// The activation is registered when this is called, not when the
    /// returned future is first polled, so it must run inside a Tokio
    /// runtime. Dropping the future does not cancel the fetch.
    pub fn activate(
        &self,
    ) -> impl Future<Output = Result<Vec<ViewModelEntry>, FetchError>> + Send + 'static {
        let mut inner = self.core.lock_inner();

        if let Some(flight) = inner.in_flight.clone() {
            debug!(generation = inner.generation, "Joining in-flight activation");
            return flight;
        }

        self.start_flight(&mut inner)
    }

    /// Start a new fetch even if one is in flight. The older result is
    /// dropped when it lands instead of overwriting this one.
    pub fn refresh(
        &self,
    ) -> impl Future<Output = Result<Vec<ViewModelEntry>, FetchError>> + Send + 'static {
        let mut inner = self.core.lock_inner();
        self.start_flight(&mut inner)
    }

    fn start_flight(&self, inner: &mut SyncInner) -> Flight {
        inner.generation += 1;
        inner.status = SyncStatus::Loading;
        inner.error = None;

        let generation = inner.generation;
        info!(
            generation,
            playlist_id = %self.core.config.playlist_id,
            "Activating playlist sync"
        );

        let core = Arc::clone(&self.core);
        let task = tokio::spawn(async move {
            let config = &core.config;
            let result = core
                .client
                .fetch(&config.playlist_id, config.max_results, &config.api_key)
                .await;
            core.complete(generation, result)
        });

        let flight = async move {
            task.await.unwrap_or_else(|e| {
                Err(FetchError::TransportFailure {
                    cause: format!("fetch task failed: {}", e),
                })
            })
        }
        .boxed()
        .shared();

        inner.in_flight = Some(flight.clone());
        flight
    }

    /// Flip favorite membership of `video_id` and republish.
    ///
    /// Returns the new flag. A store failure leaves the view untouched and
    /// is published as [`SyncEvent::StoreFailed`].
    pub fn toggle_favorite(&self, video_id: &str) -> Result<bool, StoreError> {
        let store = self.core.store.as_ref();
        let was_favorite = store.contains(video_id);

        let outcome = if was_favorite {
            store.remove(video_id)
        } else {
            store.save(video_id)
        };

        if let Err(error) = outcome {
            warn!(video_id = %video_id, error = %error, "Failed to toggle favorite");
            self.core.publish_notice(&SyncEvent::StoreFailed {
                video_id: video_id.to_string(),
                error: error.clone(),
            });
            return Err(error);
        }

        debug!(video_id = %video_id, favorite = !was_favorite, "Toggled favorite");

        let (version, entries) = {
            let mut inner = self.core.lock_inner();
            let entries = match &inner.page {
                Some(page) => build_entries(page, store),
                None => Vec::new(),
            };
            inner.entries = entries.clone();
            inner.version += 1;
            (inner.version, entries)
        };

        self.core.publish_view(version, &SyncEvent::Published(entries));
        Ok(!was_favorite)
    }

    pub fn current_state(&self) -> SyncState {
        let inner = self.core.lock_inner();
        SyncState {
            status: inner.status,
            entries: inner.entries.clone(),
            error: inner.error.clone(),
        }
    }

    /// Register `callback` for every later event.
    ///
    /// Callbacks run on whichever thread changed the state, one event at a
    /// time, and must not call [`toggle_favorite`](Self::toggle_favorite)
    /// themselves.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SyncEvent) + Send + Sync + 'static,
    {
        let mut subscribers = self.core.lock_subscribers();
        subscribers.next_id += 1;
        let id = subscribers.next_id;
        subscribers.callbacks.push((id, Arc::new(callback)));

        Subscription {
            id,
            core: Arc::downgrade(&self.core),
        }
    }
}
