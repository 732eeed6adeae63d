#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use flume::Receiver;
use musicards::{
    audio::{
        config::AudioConfig,
        error::AudioError,
        loader::ConfigLoader,
        manager::ExperienceManager,
        traits::{AssetSource, MediaBackend, MediaHandle},
    },
    event::events::Event,
};
use tokio::time::Instant;

#[derive(Default)]
struct MockState {
    base: Duration,
    playing_since: Option<Instant>,
    volume: f32,
    muted: bool,
    seeks: Vec<Duration>,
    volumes: Vec<f32>,
}

/// Media whose position advances with the (paused) tokio clock.
#[derive(Default)]
pub struct MockMedia {
    state: Mutex<MockState>,
    pub fail_play: AtomicBool,
}

impl MockMedia {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing_since.is_some()
    }

    pub fn seeks(&self) -> Vec<Duration> {
        self.state.lock().unwrap().seeks.clone()
    }

    pub fn volumes(&self) -> Vec<f32> {
        self.state.lock().unwrap().volumes.clone()
    }

    fn position_of(state: &MockState) -> Duration {
        match state.playing_since {
            Some(since) => state.base + since.elapsed(),
            None => state.base,
        }
    }
}

impl MediaHandle for MockMedia {
    fn play(&self) -> Result<(), AudioError> {
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(AudioError::PlaybackStart {
                item_id: "mock".into(),
                reason: "refused".into(),
            });
        }
        let mut state = self.state.lock().unwrap();
        if state.playing_since.is_none() {
            state.playing_since = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&self) {
        let mut state = self.state.lock().unwrap();
        state.base = Self::position_of(&state);
        state.playing_since = None;
    }

    fn seek(&self, position: Duration) {
        let mut state = self.state.lock().unwrap();
        state.base = position;
        if state.playing_since.is_some() {
            state.playing_since = Some(Instant::now());
        }
        state.seeks.push(position);
    }

    fn position(&self) -> Duration {
        Self::position_of(&self.state.lock().unwrap())
    }

    fn set_volume(&self, volume: f32) {
        let mut state = self.state.lock().unwrap();
        state.volume = volume;
        state.volumes.push(volume);
    }

    fn volume(&self) -> f32 {
        self.state.lock().unwrap().volume
    }

    fn set_muted(&self, muted: bool) {
        self.state.lock().unwrap().muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.state.lock().unwrap().muted
    }
}

/// Hands out [`MockMedia`] and remembers every one it created.
#[derive(Default)]
pub struct MockBackend {
    pub opens: AtomicUsize,
    created: Mutex<HashMap<String, Vec<Arc<MockMedia>>>>,
    failing: Mutex<HashSet<String>>,
}

impl MockBackend {
    pub fn fail_play(&self, item_id: &str) {
        self.failing.lock().unwrap().insert(item_id.to_string());
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn media(&self, item_id: &str) -> Option<Arc<MockMedia>> {
        self.created
            .lock()
            .unwrap()
            .get(item_id)
            .and_then(|all| all.last().cloned())
    }

    pub fn created(&self, item_id: &str) -> usize {
        self.created
            .lock()
            .unwrap()
            .get(item_id)
            .map_or(0, |all| all.len())
    }
}

#[async_trait]
impl MediaBackend for MockBackend {
    async fn open(
        &self,
        item_id: &str,
        _config: &AudioConfig,
    ) -> Result<Arc<dyn MediaHandle>, AudioError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let media = MockMedia::new();
        if self.failing.lock().unwrap().contains(item_id) {
            media.fail_play.store(true, Ordering::SeqCst);
        }
        self.created
            .lock()
            .unwrap()
            .entry(item_id.to_string())
            .or_default()
            .push(media.clone());
        Ok(media)
    }
}

/// In-memory asset tree with optional per-path latency.
#[derive(Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
    delays: HashMap<String, Duration>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl MemorySource {
    pub fn with_config(mut self, item_id: &str, json: &str) -> Self {
        self.files.insert(
            format!("audio/{item_id}/config.json"),
            json.as_bytes().to_vec(),
        );
        self
    }

    pub fn with_delay(mut self, item_id: &str, delay: Duration) -> Self {
        self.delays
            .insert(format!("audio/{item_id}/config.json"), delay);
        self
    }

    pub fn fetches(&self, path: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl AssetSource for MemorySource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, AudioError> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default() += 1;

        if let Some(delay) = self.delays.get(path) {
            tokio::time::sleep(*delay).await;
        }
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| AudioError::ConfigFetch {
                path: path.to_string(),
                reason: "not found".into(),
            })
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}

pub fn window(start: f64, end: f64, looping: bool) -> AudioConfig {
    AudioConfig {
        file_name: "clip.mp3".into(),
        start_time: start,
        end_time: end,
        volume: 0.7,
        looping,
        fade_in_ms: 800,
        fade_out_ms: 1000,
    }
}

pub fn drain(rx: &Receiver<Event>) -> Vec<Event> {
    rx.try_iter().collect()
}

pub struct Fixture {
    pub manager: Arc<ExperienceManager>,
    pub backend: Arc<MockBackend>,
    pub source: Arc<MemorySource>,
    pub events: Receiver<Event>,
}

pub fn fixture(source: MemorySource) -> Fixture {
    let (tx, events) = flume::unbounded();
    let source = Arc::new(source);
    let backend = Arc::new(MockBackend::default());
    let loader = Arc::new(ConfigLoader::new(source.clone()));
    let manager = Arc::new(
        ExperienceManager::new(loader, backend.clone(), tx)
            .with_switch_fade(Duration::from_millis(500)),
    );

    Fixture {
        manager,
        backend,
        source,
        events,
    }
}

pub fn standard_source() -> MemorySource {
    MemorySource::default()
        .with_config(
            "cats",
            r#"{"audios":[{"nome":"memory.mp3","tempo_inicio":1,"tempo_fim":20}]}"#,
        )
        .with_config(
            "rent",
            r#"{"audios":[{"nome":"seasons.mp3","tempo_inicio":30,"tempo_fim":50,"volume":0.5}]}"#,
        )
        .with_config(
            "wicked",
            r#"{"audios":[{"nome":"gravity.mp3","tempo_inicio":0,"tempo_fim":40,"loop":true}]}"#,
        )
        .with_config(
            "inverted",
            r#"{"audios":[{"nome":"x.mp3","tempo_inicio":5,"tempo_fim":3}]}"#,
        )
        .with_config(
            "endless",
            r#"{"audios":[{"nome":"x.mp3","tempo_inicio":1e20,"tempo_fim":2e20}]}"#,
        )
        .with_config("garbled", r#"{"audios": [ {"nome": "#)
}
