use std::{
    io::Cursor,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread,
    time::Duration,
};

use async_trait::async_trait;
use flume::Sender;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, cpal::BufferSize, mixer::Mixer};
use tracing::{debug, warn};

use crate::audio::{
    config::AudioConfig,
    error::AudioError,
    loader::ConfigLoader,
    traits::{MediaBackend, MediaHandle},
};

/// Keeps the output stream open. Must stay alive for as long as any sink
/// plays, and lives on the thread that opened it.
pub struct AudioDevice {
    _stream: OutputStream,
    mixer: Mixer,
}

impl AudioDevice {
    pub fn open() -> Result<Self, AudioError> {
        let device_error = |e: &dyn std::fmt::Display| AudioError::Device(e.to_string());
        let stream = OutputStreamBuilder::from_default_device()
            .map_err(|e| device_error(&e))?
            .with_buffer_size(BufferSize::Fixed(4096))
            .open_stream_or_fallback()
            .map_err(|e| device_error(&e))?;
        let mixer = stream.mixer().clone();

        Ok(Self {
            _stream: stream,
            mixer,
        })
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }
}

#[derive(Clone)]
struct SharedBytes(Arc<[u8]>);

impl AsRef<[u8]> for SharedBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

struct Level {
    volume: f32,
    muted: bool,
}

/// Logical volume and mute flag, pushed to `output` as one value under a
/// single lock so a fade tick can never undo a mute.
struct Gain<O> {
    level: Mutex<Level>,
    output: O,
}

impl<O: Fn(f32)> Gain<O> {
    fn new(output: O) -> Self {
        Self {
            level: Mutex::new(Level {
                volume: 0.0,
                muted: false,
            }),
            output,
        }
    }

    fn level(&self) -> MutexGuard<'_, Level> {
        self.level.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply(&self, level: &Level) {
        (self.output)(if level.muted { 0.0 } else { level.volume });
    }

    fn set_volume(&self, volume: f32) {
        let mut level = self.level();
        level.volume = volume.clamp(0.0, 1.0);
        self.apply(&level);
    }

    fn volume(&self) -> f32 {
        self.level().volume
    }

    fn set_muted(&self, muted: bool) {
        let mut level = self.level();
        level.muted = muted;
        self.apply(&level);
    }

    fn is_muted(&self) -> bool {
        self.level().muted
    }
}

type SinkGain = Gain<Box<dyn Fn(f32) + Send + Sync>>;

/// One item's audio on its own sink, connected to the shared mixer.
///
/// Seeks are handed to a worker thread: the sink only acknowledges them from
/// the audio callback, and callers hold the player lock.
pub struct RodioMedia {
    item_id: String,
    sink: Arc<Sink>,
    bytes: SharedBytes,
    gain: SinkGain,
    seek_tx: Sender<Duration>,
}

impl RodioMedia {
    pub fn new(item_id: &str, mixer: &Mixer, bytes: Vec<u8>) -> Result<Self, AudioError> {
        let open_error = |reason: String| AudioError::MediaOpen {
            item_id: item_id.to_string(),
            reason,
        };

        let sink = Arc::new(Sink::connect_new(mixer));
        sink.pause();
        sink.set_volume(0.0);

        let seeker = sink.clone();
        let id = item_id.to_string();
        let seek_tx = spawn_seeker(format!("seek-{item_id}"), move |target| {
            if let Err(e) = seeker.try_seek(target) {
                warn!(item_id = %id, "Seek failed: {e}");
            }
        })
        .map_err(|e| open_error(e.to_string()))?;

        let output = sink.clone();
        let media = Self {
            item_id: item_id.to_string(),
            sink,
            bytes: SharedBytes(bytes.into()),
            gain: Gain::new(Box::new(move |volume| output.set_volume(volume))),
            seek_tx,
        };
        media.reload().map_err(open_error)?;
        Ok(media)
    }

    fn reload(&self) -> Result<(), String> {
        let decoder = Decoder::new(Cursor::new(self.bytes.clone())).map_err(|e| e.to_string())?;
        self.sink.append(decoder);
        Ok(())
    }

    /// The decoder is consumed once the file ends; windows near the end of a
    /// file need it back before they can seek or play again.
    fn ensure_loaded(&self) -> Result<(), String> {
        if self.sink.empty() {
            debug!(item_id = %self.item_id, "Source drained, decoding again");
            self.reload()?;
        }
        Ok(())
    }

}

impl MediaHandle for RodioMedia {
    fn play(&self) -> Result<(), AudioError> {
        self.ensure_loaded()
            .map_err(|reason| AudioError::PlaybackStart {
                item_id: self.item_id.clone(),
                reason,
            })?;
        self.sink.play();
        Ok(())
    }

    fn pause(&self) {
        self.sink.pause();
    }

    fn seek(&self, position: Duration) {
        if let Err(e) = self.ensure_loaded() {
            warn!(item_id = %self.item_id, "Cannot seek: {e}");
            return;
        }
        if self.seek_tx.send(position).is_err() {
            warn!(item_id = %self.item_id, "Seek worker is gone");
        }
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn set_volume(&self, volume: f32) {
        self.gain.set_volume(volume);
    }

    fn volume(&self) -> f32 {
        self.gain.volume()
    }

    fn set_muted(&self, muted: bool) {
        self.gain.set_muted(muted);
    }

    fn is_muted(&self) -> bool {
        self.gain.is_muted()
    }
}

/// Runs `seek` on its own thread until the returned sender is dropped. Only
/// the latest of several queued targets is applied.
fn spawn_seeker<F>(name: String, seek: F) -> std::io::Result<Sender<Duration>>
where
    F: Fn(Duration) + Send + 'static,
{
    let (seek_tx, seek_rx) = flume::unbounded::<Duration>();

    thread::Builder::new().name(name).spawn(move || {
        while let Ok(mut target) = seek_rx.recv() {
            while let Ok(newer) = seek_rx.try_recv() {
                target = newer;
            }
            seek(target);
        }
    })?;

    Ok(seek_tx)
}

/// Opens media by fetching the item's file through the [`ConfigLoader`] and
/// decoding it onto the device mixer.
pub struct RodioBackend {
    mixer: Mixer,
    loader: Arc<ConfigLoader>,
}

impl RodioBackend {
    pub fn new(mixer: Mixer, loader: Arc<ConfigLoader>) -> Self {
        Self { mixer, loader }
    }
}

#[async_trait]
impl MediaBackend for RodioBackend {
    async fn open(
        &self,
        item_id: &str,
        config: &AudioConfig,
    ) -> Result<Arc<dyn MediaHandle>, AudioError> {
        let bytes = self.loader.media(item_id, config).await?;
        let mixer = self.mixer.clone();
        let id = item_id.to_string();

        let media = tokio::task::spawn_blocking(move || RodioMedia::new(&id, &mixer, bytes))
            .await
            .map_err(|e| AudioError::MediaOpen {
                item_id: item_id.to_string(),
                reason: e.to_string(),
            })??;

        Ok(Arc::new(media))
    }
}
