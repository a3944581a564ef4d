mod config;
pub mod credentials;
pub mod favorites;

pub use config::Config;
pub use favorites::{FavoritesStore, FileFavoritesStore, StoreError};
