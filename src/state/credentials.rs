use crate::utils::crypto::SecretBox;
use anyhow::{Context, Result};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// Associated data for the sealed key file.
const API_KEY_PURPOSE: &str = "YouTube API key";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCredential {
    pub api_key: String,
    pub stored_at: DateTime<Utc>,
}

impl ApiCredential {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            stored_at: Utc::now(),
        }
    }
}

pub fn save(data_dir: &Path, credential: &ApiCredential) -> Result<()> {
    let path = credentials_path(data_dir);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create credentials dir {:?}", parent))?;
    }

    let json = serde_json::to_string(credential).context("Failed to serialize API key")?;

    let sealed = SecretBox::open(data_dir)?.seal(API_KEY_PURPOSE, json.as_bytes())?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(&sealed);

    fs::write(&path, encoded)
        .with_context(|| format!("Failed to write credentials to {:?}", path))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

pub fn load(data_dir: &Path) -> Result<Option<ApiCredential>> {
    let path = credentials_path(data_dir);

    if !path.exists() {
        return Ok(None);
    }

    let encoded = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read credentials from {:?}", path))?;

    let sealed = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .context("Failed to decode credentials")?;

    let plain = SecretBox::open(data_dir)?
        .unseal(API_KEY_PURPOSE, &sealed)
        .with_context(|| format!("Failed to read API key from {:?}", path))?;

    let credential =
        serde_json::from_slice(&plain).context("Failed to parse stored API key")?;

    Ok(Some(credential))
}

pub fn delete(data_dir: &Path) -> Result<bool> {
    let path = credentials_path(data_dir);

    if !path.exists() {
        return Ok(false);
    }

    fs::remove_file(&path).with_context(|| format!("Failed to delete credentials {:?}", path))?;
    Ok(true)
}

/// Environment first, then the encrypted store.
pub fn resolve_api_key(data_dir: &Path) -> Result<String> {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            return Ok(key.trim().to_string());
        }
    }

    let credential = load(data_dir)?.with_context(|| {
        format!(
            "No API key found. Set {} or run 'tubefav auth' first.",
            API_KEY_ENV
        )
    })?;

    Ok(credential.api_key)
}

fn credentials_path(data_dir: &Path) -> PathBuf {
    data_dir.join("credentials").join("youtube.key")
}
