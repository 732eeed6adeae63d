use crate::audio::{config::AudioConfig, error::AudioError};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};

/// Where `audio/<item>/…` files are read from.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, AudioError>;

    /// Item ids available under `audio/`. Sources that cannot enumerate
    /// return an empty list.
    async fn list_items(&self) -> Vec<String> {
        Vec::new()
    }

    fn describe(&self) -> String;
}

/// A single playable resource. Volume is the logical level the fades work
/// on; muting silences output without touching it.
///
/// Methods are called with the player lock held and must return without
/// waiting on the audio device.
pub trait MediaHandle: Send + Sync {
    fn play(&self) -> Result<(), AudioError>;
    fn pause(&self);
    fn seek(&self, position: Duration);
    fn position(&self) -> Duration;
    fn set_volume(&self, volume: f32);
    fn volume(&self) -> f32;
    fn set_muted(&self, muted: bool);
    fn is_muted(&self) -> bool;
}

#[async_trait]
pub trait MediaBackend: Send + Sync {
    async fn open(
        &self,
        item_id: &str,
        config: &AudioConfig,
    ) -> Result<Arc<dyn MediaHandle>, AudioError>;
}
