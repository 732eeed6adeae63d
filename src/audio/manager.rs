use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use flume::Sender;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use crate::{
    audio::{
        config::AudioConfig, error::AudioError, loader::ConfigLoader, player::SegmentPlayer,
        traits::MediaBackend,
    },
    event::events::Event,
};

/// Fade used when one card hands over to another or loses the pointer.
pub const DEFAULT_SWITCH_FADE: Duration = Duration::from_millis(500);

/// Audio stays silent until the user has interacted with the app once.
#[derive(Clone, Default)]
pub struct AudioUnlockGate {
    unlocked: Arc<AtomicBool>,
}

impl AudioUnlockGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` only for the call that actually opened the gate.
    pub fn unlock(&self) -> bool {
        !self.unlocked.swap(true, Ordering::SeqCst)
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The unlock gate is still closed.
    Locked,
    Started,
    /// A newer request or a deactivation arrived while this one was loading.
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
struct Ticket {
    item_id: String,
    id: u64,
}

/// A claimed but not yet started activation.
#[derive(Debug)]
pub struct ActivationRequest {
    ticket: Ticket,
}

impl ActivationRequest {
    pub fn item_id(&self) -> &str {
        &self.ticket.item_id
    }
}

type PlayerSlot = Arc<OnceCell<SegmentPlayer>>;

#[derive(Default)]
struct Session {
    players: HashMap<String, PlayerSlot>,
    configs: HashMap<String, AudioConfig>,
    active: Option<String>,
    pending: Option<Ticket>,
    next_ticket: u64,
    muted: bool,
}

impl Session {
    fn issue(&mut self, item_id: &str) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket {
            item_id: item_id.to_string(),
            id: self.next_ticket,
        };
        self.pending = Some(ticket.clone());
        ticket
    }

    fn holds(&self, ticket: &Ticket) -> bool {
        self.pending.as_ref() == Some(ticket)
    }

    fn player(&self, item_id: &str) -> Option<SegmentPlayer> {
        self.players.get(item_id).and_then(|slot| slot.get().cloned())
    }

    fn slot(&mut self, item_id: &str) -> PlayerSlot {
        self.players
            .entry(item_id.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }
}

/// Decides which card is audible. Owns every [`SegmentPlayer`] for the
/// lifetime of the process, the config cache and the mute flag.
pub struct ExperienceManager {
    loader: Arc<ConfigLoader>,
    backend: Arc<dyn MediaBackend>,
    gate: AudioUnlockGate,
    session: Mutex<Session>,
    event_tx: Sender<Event>,
    switch_fade: Duration,
}

impl ExperienceManager {
    pub fn new(
        loader: Arc<ConfigLoader>,
        backend: Arc<dyn MediaBackend>,
        event_tx: Sender<Event>,
    ) -> Self {
        Self {
            loader,
            backend,
            gate: AudioUnlockGate::new(),
            session: Mutex::new(Session::default()),
            event_tx,
            switch_fade: DEFAULT_SWITCH_FADE,
        }
    }

    pub fn with_switch_fade(mut self, fade: Duration) -> Self {
        self.switch_fade = fade;
        self
    }

    pub fn gate(&self) -> &AudioUnlockGate {
        &self.gate
    }

    pub fn unlock(&self) -> bool {
        let first = self.gate.unlock();
        if first {
            info!("Audio unlocked");
            let _ = self.event_tx.send(Event::AudioUnlocked);
        }
        first
    }

    /// Runs a whole activation: [`request`](Self::request) followed by
    /// [`fulfil`](Self::fulfil).
    pub async fn activate(&self, item_id: &str) -> Result<Activation, AudioError> {
        match self.request(item_id).await {
            Some(request) => self.fulfil(request).await,
            None => Ok(Activation::Locked),
        }
    }

    /// Claims the selection for `item_id` and starts fading out whatever was
    /// active. Never waits on I/O, so callers can order it against
    /// [`deactivate`](Self::deactivate). `None` while audio is locked.
    pub async fn request(&self, item_id: &str) -> Option<ActivationRequest> {
        if !self.gate.is_unlocked() {
            debug!(item_id, "Ignoring activation, audio is still locked");
            return None;
        }

        let mut session = self.session.lock().await;
        let ticket = session.issue(item_id);

        if session.active.as_deref().is_some_and(|a| a != item_id) {
            if let Some(previous) = session.active.take() {
                debug!(from = %previous, to = item_id, "Switching item");
                if let Some(player) = session.player(&previous) {
                    player.stop(self.switch_fade);
                }
            }
        }

        Some(ActivationRequest { ticket })
    }

    /// Loads the config and media if needed and starts playback, unless the
    /// request was superseded in the meantime.
    pub async fn fulfil(&self, request: ActivationRequest) -> Result<Activation, AudioError> {
        let ticket = request.ticket;
        let item_id = ticket.item_id.as_str();
        let cached = self.session.lock().await.configs.get(item_id).cloned();

        let config = match cached {
            Some(config) => config,
            None => {
                let config = self.loader.load(item_id).await?;
                self.session
                    .lock()
                    .await
                    .configs
                    .insert(item_id.to_string(), config.clone());
                config
            }
        };

        let slot = {
            let mut session = self.session.lock().await;
            if !session.holds(&ticket) {
                debug!(item_id, "Discarding stale activation");
                return Ok(Activation::Superseded);
            }
            session.slot(item_id)
        };

        let player = slot
            .get_or_try_init(|| async {
                let media = self.backend.open(item_id, &config).await?;
                debug!(item_id, "Created media");
                Ok::<_, AudioError>(SegmentPlayer::new(
                    item_id,
                    config.clone(),
                    media,
                    self.event_tx.clone(),
                ))
            })
            .await
            .inspect_err(|e| warn!(item_id, "Failed to open media: {e}"))?
            .clone();

        let mut session = self.session.lock().await;
        player.set_muted(session.muted);
        if !session.holds(&ticket) {
            debug!(item_id, "Discarding stale activation");
            return Ok(Activation::Superseded);
        }
        session.pending = None;

        match player.start() {
            Ok(()) => {
                session.active = Some(item_id.to_string());
                Ok(Activation::Started)
            }
            Err(e) => {
                if session.active.as_deref() == Some(item_id) {
                    session.active = None;
                }
                Err(e)
            }
        }
    }

    pub async fn deactivate(&self, item_id: &str) {
        let mut session = self.session.lock().await;
        if session
            .pending
            .as_ref()
            .is_some_and(|ticket| ticket.item_id == item_id)
        {
            session.pending = None;
        }

        if session.active.as_deref() == Some(item_id) {
            session.active = None;
            if let Some(player) = session.player(item_id) {
                player.stop(self.switch_fade);
            }
        }
    }

    pub async fn toggle_mute(&self) -> bool {
        let mut session = self.session.lock().await;
        session.muted = !session.muted;
        let muted = session.muted;

        for slot in session.players.values() {
            if let Some(player) = slot.get() {
                player.set_muted(muted);
            }
        }

        info!(muted, "Mute toggled");
        let _ = self.event_tx.send(Event::MuteChanged(muted));
        muted
    }

    pub async fn is_muted(&self) -> bool {
        self.session.lock().await.muted
    }

    pub async fn active(&self) -> Option<String> {
        self.session.lock().await.active.clone()
    }

    pub async fn player(&self, item_id: &str) -> Option<SegmentPlayer> {
        self.session.lock().await.player(item_id)
    }

    pub async fn config(&self, item_id: &str) -> Option<AudioConfig> {
        self.session.lock().await.configs.get(item_id).cloned()
    }

    pub async fn is_playing(&self, item_id: &str) -> bool {
        self.player(item_id)
            .await
            .is_some_and(|player| player.is_playing())
    }
}
