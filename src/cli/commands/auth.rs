use crate::state::credentials::{self, ApiCredential};
use anyhow::{bail, Context, Result};
use std::io::BufRead;
use std::path::Path;

/// Store the API key, prompting on stdin if it wasn't passed.
pub async fn run(key: Option<String>, data_dir: &Path) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None => {
            println!("Paste your YouTube Data API key:");
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("Failed to read API key from stdin")?;
            line
        }
    };

    let key = key.trim();
    if key.is_empty() {
        bail!("API key must not be empty");
    }

    credentials::save(data_dir, &ApiCredential::new(key))?;

    println!("\nAPI key stored (encrypted) in {:?}", data_dir.join("credentials"));
    Ok(())
}

pub async fn logout(data_dir: &Path) -> Result<()> {
    // an unreadable file still gets deleted
    let stored = credentials::load(data_dir).ok().flatten();

    if !credentials::delete(data_dir)? {
        println!("No stored API key");
        return Ok(());
    }

    match stored {
        Some(credential) => println!(
            "Deleted API key stored on {}",
            credential.stored_at.format("%Y-%m-%d")
        ),
        None => println!("Deleted stored API key"),
    }
    Ok(())
}
