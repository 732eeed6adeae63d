use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::audio::{
    config::{AudioConfig, ConfigDocument},
    error::AudioError,
    traits::AssetSource,
};

pub fn config_path(item_id: &str) -> String {
    format!("audio/{item_id}/config.json")
}

pub fn media_path(item_id: &str, file_name: &str) -> String {
    format!("audio/{item_id}/{file_name}")
}

pub struct ConfigLoader {
    source: Arc<dyn AssetSource>,
}

impl ConfigLoader {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self { source }
    }

    pub async fn load(&self, item_id: &str) -> Result<AudioConfig, AudioError> {
        let path = config_path(item_id);
        let result = match self.source.fetch(&path).await {
            Ok(bytes) => ConfigDocument::parse(item_id, &bytes)
                .and_then(|document| document.into_config(item_id)),
            Err(e) => Err(e),
        };

        match &result {
            Ok(config) => debug!(
                item_id,
                file = %config.file_name,
                start = config.start_time,
                end = config.end_time,
                "Loaded audio config"
            ),
            Err(e) => warn!(item_id, "Failed to load audio config: {e}"),
        }
        result
    }

    pub async fn media(&self, item_id: &str, config: &AudioConfig) -> Result<Vec<u8>, AudioError> {
        self.source
            .fetch(&media_path(item_id, &config.file_name))
            .await
            .map_err(|e| {
                warn!(item_id, "Failed to fetch media: {e}");
                AudioError::MediaOpen {
                    item_id: item_id.to_string(),
                    reason: e.to_string(),
                }
            })
    }

    pub async fn discover(&self) -> Vec<String> {
        self.source.list_items().await
    }
}

/// Assets below a local directory.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetSource for DirSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, AudioError> {
        tokio::fs::read(self.root.join(path))
            .await
            .map_err(|e| AudioError::ConfigFetch {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }

    async fn list_items(&self) -> Vec<String> {
        let audio_dir = self.root.join("audio");
        let mut entries = match tokio::fs::read_dir(&audio_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot list {}: {e}", audio_dir.display());
                return Vec::new();
            }
        };

        let mut items = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let has_config = tokio::fs::try_exists(entry.path().join("config.json"))
                .await
                .unwrap_or(false);
            if !has_config {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                items.push(name.to_string());
            }
        }
        items.sort();
        items
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Assets served over HTTP(S) relative to a base URL.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl AssetSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, AudioError> {
        let url = self.url(path);
        let fetch_error = |reason: String| AudioError::ConfigFetch {
            path: url.clone(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| fetch_error(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
