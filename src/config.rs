//! Application configuration management.
//!
//! This module loads the application configuration, which covers the
//! remote data store's base URL and the API key used to authenticate
//! against it. Configuration is read once at startup and never written
//! back.
//!
//! Configuration is stored at `~/.config/squadboard/config.json`;
//! `SQUADBOARD_BASE_URL` and `SQUADBOARD_API_KEY` override it.

use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;

/// Application name used for the config directory path
const APP_NAME: &str = "squadboard";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default base URL for the remote data store
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var("SQUADBOARD_BASE_URL") {
            config.base_url = Some(url);
        }
        if let Ok(key) = std::env::var("SQUADBOARD_API_KEY") {
            config.api_key = Some(key);
        }
        Ok(config)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
