//! `tourchat.toml` loading.
//!
//! Every section is optional; a missing file yields the built-in defaults.
//! `TOURCHAT_API_URL` (also read from `.env`) overrides `api.base_url`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tourchat_widget::{ApiConfig, WidgetConfig};

pub const API_URL_ENV: &str = "TOURCHAT_API_URL";

#[derive(Debug, Deserialize)]
pub struct TourchatConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub widget: WidgetConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// File under `data_dir` holding the durable credential slot.
    #[serde(default = "default_storage_file")]
    pub file: String,
    /// Key of the bearer token inside that file.
    #[serde(default = "default_storage_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            file: default_storage_file(),
            key: default_storage_key(),
        }
    }
}

impl Default for TourchatConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            api: ApiConfig::default(),
            widget: WidgetConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_storage_file() -> String {
    "storage.json".to_string()
}
fn default_storage_key() -> String {
    "token".to_string()
}

impl TourchatConfig {
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(&self.storage.file)
    }

    /// Apply an explicit API URL override (from the environment).
    pub fn with_api_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url;
        }
        self
    }
}

/// Read `path`, or fall back to defaults when it does not exist.
pub async fn load(path: &Path) -> anyhow::Result<TourchatConfig> {
    let config = if path.exists() {
        let config_str = tokio::fs::read_to_string(path).await.map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;
        toml::from_str(&config_str)?
    } else {
        tracing::info!(path = %path.display(), "No config file, using defaults");
        TourchatConfig::default()
    };

    let config = config.with_api_url(std::env::var(API_URL_ENV).ok());
    config.api.validate()?;
    Ok(config)
}
