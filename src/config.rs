use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/client.json";

const API_URL_ENV: &str = "CHAT_API_URL";
const POLL_INTERVAL_ENV: &str = "CHAT_POLL_INTERVAL_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    pub poll_interval_ms: u64,
    pub database_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            poll_interval_ms: 2000,
            database_path: "data/client.db".to_string(),
        }
    }
}

impl AppConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Apply `CHAT_API_URL` / `CHAT_POLL_INTERVAL_MS` on top of the file values.
    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = var(API_URL_ENV)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
        {
            self.api_url = url;
        }

        if let Some(raw) = var(POLL_INTERVAL_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => self.poll_interval_ms = ms,
                _ => log::warn!("Ignoring invalid {POLL_INTERVAL_ENV}={raw}"),
            }
        }

        self
    }
}

/// File values (or defaults when the file is missing or broken), then
/// environment overrides on top.
pub fn load_config(path: impl AsRef<Path>) -> AppConfig {
    read_config_file(path.as_ref()).with_overrides(|key| env::var(key).ok())
}

fn read_config_file(path: &Path) -> AppConfig {
    fs::read_to_string(path)
        .map_err(|err| log::info!("No config at {} ({err}); using defaults", path.display()))
        .and_then(|content| {
            serde_json::from_str::<AppConfig>(&content).map_err(|err| {
                log::warn!("Ignoring malformed config {}: {err}", path.display())
            })
        })
        .unwrap_or_default()
}
