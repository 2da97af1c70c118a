//! Configuration management
//!
//! Handles the JSON-backed overlay configuration: appearance settings,
//! page navigation hotkeys and the user-editable command groups.

pub mod command_groups;
pub mod hotkey_binding;
pub mod settings;

pub use command_groups::{CommandGroups, GroupError};
pub use hotkey_binding::HotkeyBinding;
pub use settings::{ButtonStyle, Config, Theme};
