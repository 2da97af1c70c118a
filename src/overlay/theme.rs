//! Colors derived from the appearance settings

use eframe::egui;

use crate::common::color::{Opacity, hex_to_color32_or, with_opacity};
use crate::common::constants::defaults;
use crate::common::constants::overlay::{DARK_BACKGROUND, HOVER_COLOR};
use crate::config::{ButtonStyle, Config, Theme};

/// Colors used to paint the overlay window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPalette {
    /// Panel fill, alpha already set from the opacity setting
    pub background: egui::Color32,
    pub text: egui::Color32,
    /// Label color under the pointer, dark theme only
    pub hover: Option<egui::Color32>,
}

impl OverlayPalette {
    pub fn from_config(config: &Config) -> Self {
        let opacity = Opacity::from_fraction(config.opacity);
        let text = hex_to_color32_or(&config.text_color, egui::Color32::WHITE);

        match config.theme {
            Theme::Dark => Self {
                background: with_opacity(DARK_BACKGROUND, opacity),
                text,
                hover: Some(HOVER_COLOR),
            },
            Theme::Light => {
                let fallback = hex_to_color32_or(defaults::appearance::BG_COLOR, egui::Color32::GRAY);
                Self {
                    background: with_opacity(hex_to_color32_or(&config.bg_color, fallback), opacity),
                    text,
                    hover: None,
                }
            }
        }
    }

    pub fn label_color(&self, hovered: bool) -> egui::Color32 {
        match (hovered, self.hover) {
            (true, Some(hover)) => hover,
            _ => self.text,
        }
    }
}

/// egui visuals for menus and the settings window
pub fn visuals(theme: Theme) -> egui::Visuals {
    match theme {
        Theme::Dark => egui::Visuals::dark(),
        Theme::Light => egui::Visuals::light(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonRole {
    Normal,
    Save,
    Cancel,
}

/// Button painted with the configured dialog button colors
pub fn styled_button<'a>(label: &str, role: ButtonRole, style: &ButtonStyle) -> egui::Button<'a> {
    let foreground = match role {
        ButtonRole::Normal => &style.foreground,
        ButtonRole::Save => &style.save_foreground,
        ButtonRole::Cancel => &style.cancel_foreground,
    };
    let text = egui::RichText::new(label).color(hex_to_color32_or(foreground, egui::Color32::WHITE));
    egui::Button::new(text).fill(hex_to_color32_or(&style.background, egui::Color32::BLACK))
}
