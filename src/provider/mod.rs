mod error;
mod traits;
mod types;
pub mod youtube;

pub use error::FetchError;
#[cfg(test)]
pub use traits::MockPlaylistClient;
pub use traits::PlaylistClient;
pub use types::*;
pub use youtube::YoutubeClient;
