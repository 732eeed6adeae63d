#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // Playback
    PlaybackStarted(String),
    PlaybackStopped(String),

    // Session
    AudioUnlocked,
    MuteChanged(bool),
}
