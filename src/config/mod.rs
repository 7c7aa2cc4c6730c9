//! # Configuration Management Module
//!
//! Loads and writes the game's TOML configuration. Every section has sensible
//! defaults so `mystery-mansion init` can produce a working file.
//!
//! ## Configuration Structure
//!
//! - [`GameConfig`] - Title, default player id, optional seed file
//! - [`StorageConfig`] - Where the sled database lives
//! - [`LoggingConfig`] - Log level and optional log file
//!
//! ## Configuration File Format
//!
//! ```toml
//! [game]
//! title = "Mystery Mansion"
//! default_player_id = 1
//! autosave_on_quit = true
//! # seed_file = "data/seeds/mansion.json"
//!
//! [storage]
//! data_dir = "./data"
//!
//! [logging]
//! level = "info"
//! file = "mystery-mansion.log"
//! ```
//!
//! CLI flags take precedence over the file (e.g. `-v` raises the log level).

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub game: GameConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub title: String,
    /// Player id used by `play` when `--player` is not given.
    pub default_player_id: u32,
    /// JSON world to seed an empty store with instead of the built-in mansion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_file: Option<String>,
    /// Save progress automatically when the player quits.
    #[serde(default = "default_autosave_on_quit")]
    pub autosave_on_quit: bool,
}

fn default_autosave_on_quit() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Optional override for the sled database path; defaults to `<data_dir>/mystery`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
}

impl StorageConfig {
    pub fn db_path(&self) -> PathBuf {
        match &self.db_path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(&self.data_dir).join("mystery"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl LoggingConfig {
    /// Parsed level filter. Unknown values fall back to `Info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        log::LevelFilter::from_str(&self.level).unwrap_or_else(|_| {
            eprintln!(
                "Invalid logging level '{}', defaulting to info",
                self.level
            );
            log::LevelFilter::Info
        })
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            game: GameConfig {
                title: "Mystery Mansion".to_string(),
                default_player_id: 1,
                seed_file: None,
                autosave_on_quit: true,
            },
            storage: StorageConfig {
                data_dir: "./data".to_string(),
                db_path: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("mystery-mansion.log".to_string()),
            },
        }
    }
}
