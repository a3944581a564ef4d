use anyhow::{bail, Result};

use crate::provider::watch_url;

pub async fn run(video_id: &str) -> Result<()> {
    if video_id.trim().is_empty() {
        bail!("Video ID must not be empty");
    }

    let url = watch_url(video_id.trim());
    println!("Opening {}", url);

    if let Err(e) = open::that(&url) {
        println!("Couldn't open a browser ({}), visit the URL above.", e);
    }

    Ok(())
}
