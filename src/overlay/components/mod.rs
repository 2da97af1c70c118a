pub mod appearance_settings;
pub mod command_dialog;
pub mod command_settings;
pub mod hotkey_settings;
pub mod settings_dialog;
pub mod tray;
