//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Configuration paths and filenames
pub mod config {
    /// Application directory name under XDG config
    pub const APP_DIR: &str = "cad-cheatsheet";

    /// Configuration filename
    pub const FILENAME: &str = "config.json";

    /// Window geometry must stay unchanged this long before it is written to disk
    pub const GEOMETRY_SAVE_DELAY_MS: u64 = 1000;
}

/// Input constants
pub mod input {
    /// Offset between Linux input key codes and X11 keycodes
    pub const X11_KEYCODE_OFFSET: u16 = 8;

    /// Listener poll timeout; control messages are picked up at this interval
    pub const LISTENER_POLL_TIMEOUT_MS: i32 = 250;
}

/// Overlay window constants
pub mod overlay {
    pub const WINDOW_TITLE: &str = "CAD Cheat Sheet";
    pub const APP_ID: &str = "cad-cheatsheet";

    /// Smallest size the overlay can be resized to
    pub const MIN_WIDTH: u32 = 200;
    pub const MIN_HEIGHT: u32 = 120;

    pub const PADDING: i8 = 10;
    pub const LINE_SPACING: f32 = 2.0;

    /// Dark theme background; `bg_color` only applies to the light theme
    pub const DARK_BACKGROUND: egui::Color32 = egui::Color32::BLACK;

    /// Label color while hovered in the dark theme
    pub const HOVER_COLOR: egui::Color32 = egui::Color32::from_rgb(0x00, 0xFF, 0x00);
}

/// Settings dialog constants (egui)
pub mod settings_ui {
    use egui;

    pub const WINDOW_TITLE: &str = "Settings";
    pub const WINDOW_WIDTH: f32 = 500.0;
    pub const WINDOW_HEIGHT: f32 = 600.0;

    /// Layout spacing
    pub const SECTION_SPACING: f32 = 15.0;
    pub const ITEM_SPACING: f32 = 8.0;

    /// Alert level colors
    pub const COLOR_SUCCESS: egui::Color32 = egui::Color32::from_rgb(100, 200, 100);
    pub const COLOR_WARNING: egui::Color32 = egui::Color32::from_rgb(255, 200, 0);
    pub const COLOR_ERROR: egui::Color32 = egui::Color32::from_rgb(200, 100, 100);

    /// How long a hotkey capture waits for a key before giving up
    pub const CAPTURE_TIMEOUT_SECS: u64 = 30;
}

/// Default configuration values
/// These are used when creating a new config or for missing config fields
pub mod defaults {
    pub mod hotkeys {
        pub const PREV_KEY: &str = "ctrl+left";
        pub const NEXT_KEY: &str = "ctrl+right";
    }

    pub mod appearance {
        pub const OPACITY: f32 = 0.95;
        pub const OPACITY_MIN: f32 = 0.1;
        pub const OPACITY_MAX: f32 = 1.0;

        pub const BG_COLOR: &str = "#2E2E2E";
        pub const TEXT_COLOR: &str = "#FFFFFF";

        pub const FONT_SIZE: u16 = 10;
        pub const FONT_SIZE_MIN: u16 = 8;
        pub const FONT_SIZE_MAX: u16 = 20;

        pub const LINES_PER_PAGE: usize = 5;
        pub const LINES_PER_PAGE_MIN: usize = 3;
        pub const LINES_PER_PAGE_MAX: usize = 10;
    }

    pub mod button {
        pub const BACKGROUND: &str = "#000000";
        pub const FOREGROUND: &str = "#FFFFFF";
        pub const SAVE_FOREGROUND: &str = "#28A745";
        pub const CANCEL_FOREGROUND: &str = "#DC3545";
    }

    pub mod window {
        pub const X: i32 = 100;
        pub const Y: i32 = 100;
        pub const WIDTH: u32 = 350;
        pub const HEIGHT: u32 = 300;
    }
}
