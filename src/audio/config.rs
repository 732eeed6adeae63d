use std::time::Duration;

use serde::Deserialize;

use crate::audio::error::AudioError;

pub const DEFAULT_VOLUME: f32 = 0.7;
pub const DEFAULT_FADE_IN_MS: u64 = 800;
pub const DEFAULT_FADE_OUT_MS: u64 = 1000;

/// Playback window and fade settings for a single card.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioConfig {
    pub file_name: String,
    pub start_time: f64,
    pub end_time: f64,
    pub volume: f32,
    pub looping: bool,
    pub fade_in_ms: u64,
    pub fade_out_ms: u64,
}

impl AudioConfig {
    pub fn start(&self) -> Duration {
        Duration::from_secs_f64(self.start_time)
    }

    pub fn end(&self) -> Duration {
        Duration::from_secs_f64(self.end_time)
    }

    pub fn fade_in(&self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }

    pub fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }

    /// Position at which the closing fade has to begin so that it ends on the
    /// window boundary. Never earlier than the window start.
    pub fn fade_out_threshold(&self) -> Duration {
        self.end().saturating_sub(self.fade_out()).max(self.start())
    }

}

/// On-disk descriptor: `{ "audios": [ { "nome": ..., "tempo_inicio": ... } ] }`.
#[derive(Debug, Deserialize)]
pub struct ConfigDocument {
    pub audios: Vec<AudioEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AudioEntry {
    #[serde(rename = "nome")]
    pub file_name: String,
    #[serde(rename = "tempo_inicio")]
    pub start_time: f64,
    #[serde(rename = "tempo_fim")]
    pub end_time: f64,
    #[serde(default)]
    pub volume: Option<f32>,
    #[serde(default, rename = "loop")]
    pub looping: Option<bool>,
    #[serde(default, rename = "fadeIn")]
    pub fade_in: Option<f64>,
    #[serde(default, rename = "fadeOut")]
    pub fade_out: Option<f64>,
}

impl ConfigDocument {
    pub fn parse(item_id: &str, bytes: &[u8]) -> Result<Self, AudioError> {
        serde_json::from_slice(bytes).map_err(|e| AudioError::ConfigParse {
            item_id: item_id.to_string(),
            reason: e.to_string(),
        })
    }

    /// Takes the first entry, fills in defaults and checks the window.
    pub fn into_config(self, item_id: &str) -> Result<AudioConfig, AudioError> {
        let entry = self
            .audios
            .into_iter()
            .next()
            .ok_or_else(|| AudioError::ConfigParse {
                item_id: item_id.to_string(),
                reason: "`audios` is empty".to_string(),
            })?;
        entry.into_config(item_id)
    }
}

impl AudioEntry {
    pub fn into_config(self, item_id: &str) -> Result<AudioConfig, AudioError> {
        let invalid = |reason: String| AudioError::ConfigValidation {
            item_id: item_id.to_string(),
            reason,
        };

        if self.file_name.trim().is_empty() {
            return Err(invalid("`nome` is empty".to_string()));
        }
        if !self.start_time.is_finite() || !self.end_time.is_finite() {
            return Err(invalid("window bounds must be finite".to_string()));
        }
        if self.start_time < 0.0 {
            return Err(invalid(format!(
                "tempo_inicio must not be negative (got {})",
                self.start_time
            )));
        }
        for (key, seconds) in [("tempo_inicio", self.start_time), ("tempo_fim", self.end_time)] {
            if Duration::try_from_secs_f64(seconds).is_err() {
                return Err(invalid(format!("{key} is out of range (got {seconds})")));
            }
        }
        if self.end_time <= self.start_time {
            return Err(invalid(format!(
                "tempo_fim ({}) must be greater than tempo_inicio ({})",
                self.end_time, self.start_time
            )));
        }

        // Zero falls back to the default, same as an absent key.
        let volume = match self.volume {
            Some(v) if !v.is_finite() || v < 0.0 => {
                return Err(invalid(format!("volume must be within 0..1 (got {v})")));
            }
            Some(v) if v > 0.0 => v.min(1.0),
            _ => DEFAULT_VOLUME,
        };

        Ok(AudioConfig {
            file_name: self.file_name,
            start_time: self.start_time,
            end_time: self.end_time,
            volume,
            looping: self.looping.unwrap_or(false),
            fade_in_ms: fade_ms(self.fade_in, DEFAULT_FADE_IN_MS),
            fade_out_ms: fade_ms(self.fade_out, DEFAULT_FADE_OUT_MS),
        })
    }
}

fn fade_ms(value: Option<f64>, default: u64) -> u64 {
    match value {
        Some(ms) if ms.is_finite() && ms > 0.0 => ms.round() as u64,
        _ => default,
    }
}
