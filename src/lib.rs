pub mod audio;
pub mod event;
pub mod particles;
pub mod settings;
pub mod ui;
pub mod util;
