pub mod app;
pub mod components;
pub mod handler;
pub mod indicator;
pub mod layout;
pub mod state;
pub mod tui;
