use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use flume::Sender;
use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    audio::{
        config::AudioConfig,
        error::AudioError,
        fade::{FADE_TICK, FadeRamp},
        traits::MediaHandle,
    },
    event::events::Event,
};

/// How often the playback position is compared against the window end.
pub const POSITION_TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Playing,
    FadingOut(FadeOutReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeOutReason {
    Boundary,
    Stopped,
}

#[derive(Debug, Clone, Copy)]
enum FadeCompletion {
    Steady,
    Boundary,
    Stop,
}

struct FadeTask {
    generation: u64,
    handle: JoinHandle<()>,
}

struct PlayerState {
    phase: Phase,
    fade: Option<FadeTask>,
    generation: u64,
}

struct PlayerInner {
    item_id: String,
    config: AudioConfig,
    media: Arc<dyn MediaHandle>,
    event_tx: Sender<Event>,
    state: Mutex<PlayerState>,
    monitor: Mutex<Option<JoinHandle<()>>>,
}

/// Plays the configured window of one item's media and owns its fades.
///
/// Clones share the same media and state. At most one volume ramp runs per
/// player; starting another cancels the one in flight.
#[derive(Clone)]
pub struct SegmentPlayer {
    inner: Arc<PlayerInner>,
}

impl SegmentPlayer {
    pub fn new(
        item_id: impl Into<String>,
        config: AudioConfig,
        media: Arc<dyn MediaHandle>,
        event_tx: Sender<Event>,
    ) -> Self {
        media.pause();
        media.set_volume(0.0);
        media.seek(config.start());

        let inner = Arc::new(PlayerInner {
            item_id: item_id.into(),
            config,
            media,
            event_tx,
            state: Mutex::new(PlayerState {
                phase: Phase::Idle,
                fade: None,
                generation: 0,
            }),
            monitor: Mutex::new(None),
        });

        let monitor = spawn_monitor(Arc::downgrade(&inner));
        *inner
            .monitor
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(monitor);

        Self { inner }
    }

    pub fn item_id(&self) -> &str {
        &self.inner.item_id
    }

    pub fn phase(&self) -> Phase {
        self.inner.state().phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase() != Phase::Idle
    }

    pub fn is_fading(&self) -> bool {
        self.inner.state().fade.is_some()
    }

    pub fn set_muted(&self, muted: bool) {
        self.inner.media.set_muted(muted);
    }

    /// Rewinds to the window start and fades in. Any fade in flight,
    /// including a fade-out from an earlier stop, is cancelled.
    pub fn start(&self) -> Result<(), AudioError> {
        let inner = &self.inner;
        let mut state = inner.state();
        let was_playing = state.phase != Phase::Idle;

        inner.cancel_fade(&mut state);
        inner.media.seek(inner.config.start());
        inner.media.set_volume(0.0);

        if let Err(e) = inner.media.play() {
            warn!(item_id = %inner.item_id, "Could not start playback: {e}");
            inner.media.pause();
            state.phase = Phase::Idle;
            drop(state);
            if was_playing {
                inner.notify(Event::PlaybackStopped(inner.item_id.clone()));
            }
            return Err(e);
        }

        state.phase = Phase::Playing;
        inner.fade_to(
            &mut state,
            inner.config.volume,
            inner.config.fade_in(),
            FadeCompletion::Steady,
        );
        drop(state);

        info!(
            item_id = %inner.item_id,
            start = inner.config.start_time,
            end = inner.config.end_time,
            "Playback started"
        );
        inner.notify(Event::PlaybackStarted(inner.item_id.clone()));
        Ok(())
    }

    /// Fades out over `fade` regardless of position, then pauses and rewinds.
    pub fn stop(&self, fade: Duration) {
        let inner = &self.inner;
        let mut state = inner.state();
        if state.phase == Phase::Idle {
            return;
        }

        debug!(item_id = %inner.item_id, fade_ms = fade.as_millis() as u64, "Stopping");
        state.phase = Phase::FadingOut(FadeOutReason::Stopped);
        inner.fade_to(&mut state, 0.0, fade, FadeCompletion::Stop);
    }

    /// Runs one position check. The background monitor calls this every
    /// [`POSITION_TICK`].
    pub fn check_boundary(&self) {
        self.inner.check_boundary();
    }
}

impl PlayerInner {
    fn state(&self) -> MutexGuard<'_, PlayerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, event: Event) {
        let _ = self.event_tx.send(event);
    }

    fn cancel_fade(&self, state: &mut PlayerState) {
        // Bumping the generation also silences a ramp that is already waiting
        // on the lock and can no longer be aborted.
        state.generation += 1;
        if let Some(task) = state.fade.take() {
            task.handle.abort();
        }
    }

    fn fade_to(
        self: &Arc<Self>,
        state: &mut PlayerState,
        target: f32,
        duration: Duration,
        completion: FadeCompletion,
    ) {
        self.cancel_fade(state);
        let generation = state.generation;
        let mut ramp = FadeRamp::new(self.media.volume(), target, duration);
        let inner = Arc::clone(self);

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + FADE_TICK, FADE_TICK);
            loop {
                ticker.tick().await;
                let (volume, done) = ramp.advance();

                let mut state = inner.state();
                if state.generation != generation {
                    return;
                }
                inner.media.set_volume(volume);

                if done {
                    state.fade = None;
                    inner.finish_fade(&mut state, completion);
                    return;
                }
            }
        });

        state.fade = Some(FadeTask { generation, handle });
    }

    fn finish_fade(self: &Arc<Self>, state: &mut PlayerState, completion: FadeCompletion) {
        match completion {
            FadeCompletion::Steady => {}
            FadeCompletion::Boundary if self.config.looping => {
                debug!(item_id = %self.item_id, "Window looped");
                self.media.seek(self.config.start());
                state.phase = Phase::Playing;
                self.fade_to(
                    state,
                    self.config.volume,
                    self.config.fade_in(),
                    FadeCompletion::Steady,
                );
            }
            FadeCompletion::Boundary | FadeCompletion::Stop => {
                self.media.pause();
                self.media.seek(self.config.start());
                state.phase = Phase::Idle;
                info!(item_id = %self.item_id, "Playback stopped");
                self.notify(Event::PlaybackStopped(self.item_id.clone()));
            }
        }
    }

    fn check_boundary(self: &Arc<Self>) {
        let mut state = self.state();
        // A ramp in flight (the fade-in) finishes before the window end is
        // looked at again.
        if state.phase != Phase::Playing || state.fade.is_some() {
            return;
        }

        let position = self.media.position();
        if position >= self.config.fade_out_threshold() {
            debug!(
                item_id = %self.item_id,
                position_ms = position.as_millis() as u64,
                "Reached window end"
            );
            state.phase = Phase::FadingOut(FadeOutReason::Boundary);
            self.fade_to(
                &mut state,
                0.0,
                self.config.fade_out(),
                FadeCompletion::Boundary,
            );
        }
    }
}

impl Drop for PlayerInner {
    fn drop(&mut self) {
        if let Some(monitor) = self
            .monitor
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            monitor.abort();
        }
        if let Some(task) = self
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .fade
            .take()
        {
            task.handle.abort();
        }
    }
}

fn spawn_monitor(player: Weak<PlayerInner>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(POSITION_TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let Some(inner) = player.upgrade() else {
                break;
            };
            inner.check_boundary();
        }
    })
}
