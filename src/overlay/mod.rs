//! Overlay module - always-on-top cheat sheet window with settings dialog and system tray

mod app;
pub mod components;
pub mod key_capture;
pub mod pages;
pub mod state;
pub mod theme;
mod types;

pub use app::run_overlay;
pub use types::{SettingsTab, StatusMessage};
