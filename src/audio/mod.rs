pub mod config;
pub mod engine;
pub mod error;
pub mod fade;
pub mod loader;
pub mod manager;
pub mod player;
pub mod traits;
