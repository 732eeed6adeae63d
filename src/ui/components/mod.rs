pub mod app;
pub mod card;
pub mod mute;
pub mod particles;
