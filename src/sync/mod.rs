mod service;
mod view;

pub use service::{PlaylistSyncService, SyncConfig};
pub use view::{SyncEvent, ViewModelEntry};
