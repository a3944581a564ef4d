use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::provider::youtube::MAX_PAGE_SIZE;

fn default_max_results() -> u32 {
    MAX_PAGE_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub playlist_id: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            playlist_id: None,
            max_results: default_max_results(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config TOML from {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Missing file means defaults; a broken one is still an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;
        let content =
            toml::to_string_pretty(&self).with_context(|| "Failed to serialize config to TOML")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        fs::write(path, content).with_context(|| format!("Failed to write config to {:?}", path))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.max_results) {
            anyhow::bail!(
                "max_results must be between 1 and {}, got {}",
                MAX_PAGE_SIZE,
                self.max_results
            );
        }
        if let Some(id) = &self.playlist_id {
            if id.trim().is_empty() {
                anyhow::bail!("playlist_id must not be empty");
            }
        }
        Ok(())
    }

    pub fn config_path(data_dir: &Path) -> PathBuf {
        data_dir.join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.playlist_id, None);
        assert_eq!(config.max_results, 50);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_config_save_and_load() {
        let temp = TempDir::new().unwrap();
        let config_path = Config::config_path(temp.path());

        let config = Config {
            playlist_id: Some("PL9JwhzITbbGZGA5qjHDbVfNQnK5Sc_XWG".to_string()),
            max_results: 25,
            log_level: "debug".to_string(),
        };

        config.save(&config_path).unwrap();
        let loaded = Config::load(&config_path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, "playlist_id = \"PLabc\"\n").unwrap();

        let loaded = Config::load(&config_path).unwrap();
        assert_eq!(loaded.playlist_id.as_deref(), Some("PLabc"));
        assert_eq!(loaded.max_results, 50);
    }

    #[test]
    fn test_load_or_default_without_file() {
        let temp = TempDir::new().unwrap();
        let loaded = Config::load_or_default(&temp.path().join("missing.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_rejects_page_size_out_of_range() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, "max_results = 500\n").unwrap();

        assert!(Config::load(&config_path).is_err());
        assert!(Config {
            max_results: 0,
            ..Config::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_config_path() {
        assert_eq!(
            Config::config_path(Path::new(".tubefav")),
            PathBuf::from(".tubefav/config.toml")
        );
    }
}
