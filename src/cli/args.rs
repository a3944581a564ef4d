use clap::{Parser, Subcommand};

/// tubefav - browse a YouTube playlist and keep your favorites
///
/// Fetches one page of a playlist, marks the videos you saved, and lets
/// you toggle favorites from the terminal.
#[derive(Parser, Debug)]
#[command(name = "tubefav")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Playlist URL or ID, overrides the configured one
    #[arg(short = 'l', long, global = true)]
    pub playlist: Option<String>,

    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Configure the playlist to follow
    Init {
        /// Playlist URL or ID (e.g., https://www.youtube.com/playlist?list=PL... or PL...)
        playlist: String,
        /// Items per fetch, 1 to 50
        #[arg(short, long)]
        max_results: Option<u32>,
    },
    /// Store a YouTube Data API key
    Auth {
        /// API key, read from stdin when omitted
        #[arg(short, long)]
        key: Option<String>,
    },
    /// Delete the stored API key
    Logout,
    /// Fetch the playlist and show it
    List {
        /// Only show favorite videos
        #[arg(short, long)]
        favorites_only: bool,
    },
    /// Toggle favorite status of a video
    Toggle {
        /// Video ID
        video_id: String,
    },
    /// Show saved favorites
    Favorites,
    /// Open a video in the browser
    Play {
        /// Video ID
        video_id: String,
    },
    /// Interactive session: r = sync, R = force refresh, t <id> = toggle, s = status, q = quit
    Session,
}
