use std::{env, str::FromStr, sync::Arc, time::Duration};

use tracing::warn;

use crate::audio::{
    loader::{DirSource, HttpSource},
    manager::DEFAULT_SWITCH_FADE,
    traits::AssetSource,
};

/// Terminals at most this many columns wide get tap-to-play.
pub const DEFAULT_TAP_BREAKPOINT: u16 = 96;

#[derive(Debug, Clone, PartialEq)]
pub enum AssetRoot {
    Dir(String),
    Url(String),
}

impl AssetRoot {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Url(value.to_string())
        } else if value.is_empty() {
            Self::Dir(".".to_string())
        } else {
            Self::Dir(value.to_string())
        }
    }

    pub fn source(&self) -> Arc<dyn AssetSource> {
        match self {
            Self::Dir(path) => Arc::new(DirSource::new(path)),
            Self::Url(url) => Arc::new(HttpSource::new(url)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub root: AssetRoot,
    pub items: Vec<String>,
    pub tap_breakpoint: u16,
    pub switch_fade: Duration,
    pub particles: bool,
    pub mute_control: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: AssetRoot::Dir(".".to_string()),
            items: Vec::new(),
            tap_breakpoint: DEFAULT_TAP_BREAKPOINT,
            switch_fade: DEFAULT_SWITCH_FADE,
            particles: true,
            mute_control: true,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let root = lookup("MUSICARDS_ROOT")
            .map(|v| AssetRoot::parse(&v))
            .unwrap_or(defaults.root);

        let items = lookup("MUSICARDS_ITEMS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let tap_breakpoint = parse_or("MUSICARDS_TAP_BREAKPOINT", &lookup, defaults.tap_breakpoint);
        let switch_fade = parse_or::<u64>(
            "MUSICARDS_SWITCH_FADE_MS",
            &lookup,
            defaults.switch_fade.as_millis() as u64,
        );

        Self {
            root,
            items,
            tap_breakpoint,
            switch_fade: Duration::from_millis(switch_fade),
            particles: flag_or("MUSICARDS_PARTICLES", &lookup, defaults.particles),
            mute_control: flag_or("MUSICARDS_MUTE_CONTROL", &lookup, defaults.mute_control),
        }
    }
}

fn parse_or<T: FromStr + Copy>(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {key}={raw:?}");
            default
        }),
        None => default,
    }
}

fn flag_or(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: bool) -> bool {
    match lookup(key).as_deref().map(str::trim) {
        Some("1" | "true" | "on" | "yes") => true,
        Some("0" | "false" | "off" | "no") => false,
        Some(raw) => {
            warn!("Ignoring invalid {key}={raw:?}");
            default
        }
        None => default,
    }
}
