use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("Audio output device error: {0}")]
    Device(String),

    #[error("Failed to fetch {path}: {reason}")]
    ConfigFetch { path: String, reason: String },

    #[error("Malformed config for {item_id}: {reason}")]
    ConfigParse { item_id: String, reason: String },

    #[error("Invalid config for {item_id}: {reason}")]
    ConfigValidation { item_id: String, reason: String },

    #[error("Could not open media for {item_id}: {reason}")]
    MediaOpen { item_id: String, reason: String },

    #[error("Playback refused for {item_id}: {reason}")]
    PlaybackStart { item_id: String, reason: String },
}
