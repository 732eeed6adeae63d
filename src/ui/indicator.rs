//! Playing indicator shown on each card.

/// Pulse frames advance every this many milliseconds.
pub const FRAME_STEP_MS: u128 = 100;
const PULSE: [(&str, f32); 15] = [
    ("·", 0.4),
    ("·", 0.5),
    ("•", 0.6),
    ("•", 0.7),
    ("●", 0.8),
    ("●", 0.9),
    ("●", 1.0),
    ("●", 1.0),
    ("●", 0.9),
    ("●", 0.8),
    ("•", 0.7),
    ("•", 0.6),
    ("·", 0.5),
    ("·", 0.4),
    ("·", 0.4),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indicator {
    pub active: bool,
    pub glyph: &'static str,
    pub opacity: f32,
}

/// Style for a card at `now_ms`. A full pulse lasts 1.5 s.
pub fn indicator(is_playing: bool, now_ms: u128) -> Indicator {
    if !is_playing {
        return Indicator {
            active: false,
            glyph: " ",
            opacity: 0.0,
        };
    }

    let step = (now_ms / FRAME_STEP_MS) as usize % PULSE.len();
    let (glyph, opacity) = PULSE[step];
    Indicator {
        active: true,
        glyph,
        opacity,
    }
}
