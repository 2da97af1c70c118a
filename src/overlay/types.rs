use crate::common::constants::settings_ui::*;
use eframe::egui;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum SettingsTab {
    #[default]
    Appearance,
    Hotkeys,
    Commands,
}

impl SettingsTab {
    pub const ALL: [SettingsTab; 3] = [
        SettingsTab::Appearance,
        SettingsTab::Hotkeys,
        SettingsTab::Commands,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SettingsTab::Appearance => "Appearance",
            SettingsTab::Hotkeys => "Hotkeys",
            SettingsTab::Commands => "Commands",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub color: egui::Color32,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: COLOR_SUCCESS,
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: COLOR_WARNING,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: COLOR_ERROR,
        }
    }
}
