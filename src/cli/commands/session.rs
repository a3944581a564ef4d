use std::path::Path;

use anyhow::{Context, Result};
use futures::FutureExt;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::commands::utils::{build_service, format_entry};
use crate::sync::{PlaylistSyncService, SyncEvent};

#[derive(Debug, PartialEq, Eq)]
enum SessionCommand {
    Sync,
    Refresh,
    Toggle(String),
    Status,
    Quit,
}

fn parse_command(line: &str) -> Option<SessionCommand> {
    let mut parts = line.split_whitespace();
    let command = match (parts.next()?, parts.next()) {
        ("r", None) => SessionCommand::Sync,
        ("R", None) => SessionCommand::Refresh,
        ("t", Some(video_id)) => SessionCommand::Toggle(video_id.to_string()),
        ("s", None) => SessionCommand::Status,
        ("q", None) => SessionCommand::Quit,
        _ => return None,
    };

    if parts.next().is_some() {
        return None;
    }
    Some(command)
}

fn render(event: &SyncEvent) {
    match event {
        SyncEvent::Published(entries) => {
            println!("\n--- {} videos ---", entries.len());
            for item in entries {
                println!("{}", format_entry(item));
            }
        }
        SyncEvent::FetchFailed(error) => println!("\n! {}", error),
        SyncEvent::StoreFailed { video_id, error } => {
            println!("\n! Couldn't update {}: {}", video_id, error)
        }
    }
}

fn spawn_activation(service: &PlaylistSyncService, force: bool) {
    let activation = if force {
        service.refresh().boxed()
    } else {
        service.activate().boxed()
    };
    // results reach the terminal through the subscriber
    tokio::spawn(async move {
        let _ = activation.await;
    });
}

pub async fn run(playlist: Option<&str>, data_dir: &Path) -> Result<()> {
    let service = build_service(playlist, data_dir)?;
    let subscription = service.subscribe(render);

    println!("r = sync, R = force refresh, t <video-id> = toggle, s = status, q = quit");
    spawn_activation(&service, false);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Some(SessionCommand::Sync) => spawn_activation(&service, false),
            Some(SessionCommand::Refresh) => spawn_activation(&service, true),
            Some(SessionCommand::Toggle(video_id)) => {
                // failures are rendered by the subscriber
                let _ = service.toggle_favorite(&video_id);
            }
            Some(SessionCommand::Status) => {
                let state = service.current_state();
                let favorites = state.entries.iter().filter(|e| e.is_favorite).count();
                println!(
                    "{:?}: {} videos, {} favorite(s)",
                    state.status,
                    state.entries.len(),
                    favorites
                );
                if let Some(error) = state.error {
                    println!("  last error: {}", error);
                }
            }
            Some(SessionCommand::Quit) => break,
            None => println!("Unknown command '{}'", line.trim()),
        }
    }

    subscription.unsubscribe();
    Ok(())
}
