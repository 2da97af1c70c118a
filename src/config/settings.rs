//! Persisted overlay configuration
//!
//! The config file is a single JSON object. Loading merges whatever the file
//! contains over the built-in defaults key by key, so a partial, outdated or
//! hand-edited file still produces a complete configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::common::color::HexColor;
use crate::common::constants::defaults;
use crate::common::types::{Dimensions, Position};
use crate::config::{CommandGroups, HotkeyBinding};

/// Overlay color scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn label(self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
        }
    }
}

/// Colors used for dialog buttons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonStyle {
    #[serde(default = "default_button_background")]
    pub background: String,
    #[serde(default = "default_button_foreground")]
    pub foreground: String,
    /// Text color of the confirm button in dialogs
    #[serde(default = "default_save_foreground")]
    pub save_foreground: String,
    /// Text color of the cancel button in dialogs
    #[serde(default = "default_cancel_foreground")]
    pub cancel_foreground: String,
}

impl Default for ButtonStyle {
    fn default() -> Self {
        Self {
            background: default_button_background(),
            foreground: default_button_foreground(),
            save_foreground: default_save_foreground(),
            cancel_foreground: default_cancel_foreground(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Global hotkey for the previous page
    #[serde(default = "default_prev_key")]
    pub prev_key: HotkeyBinding,
    /// Global hotkey for the next page
    #[serde(default = "default_next_key")]
    pub next_key: HotkeyBinding,

    /// Window opacity (0.1 - 1.0)
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default = "default_bg_color")]
    pub bg_color: String,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default = "default_font_size")]
    pub font_size: u16,
    #[serde(default = "default_lines_per_page")]
    pub lines_per_page: usize,

    #[serde(default = "default_window_position")]
    pub window_position: Position,
    #[serde(default = "default_window_size")]
    pub window_size: Dimensions,

    #[serde(default = "default_theme")]
    pub theme: Theme,
    #[serde(default)]
    pub button_style: ButtonStyle,

    #[serde(default = "CommandGroups::builtin")]
    pub command_groups: CommandGroups,
}

// Default value functions
fn default_prev_key() -> HotkeyBinding {
    parse_builtin_binding(defaults::hotkeys::PREV_KEY)
}

fn default_next_key() -> HotkeyBinding {
    parse_builtin_binding(defaults::hotkeys::NEXT_KEY)
}

fn parse_builtin_binding(raw: &str) -> HotkeyBinding {
    // Built-in strings are covered by tests; Ctrl+Left keeps the type total
    raw.parse()
        .unwrap_or_else(|_| HotkeyBinding::new(evdev::KeyCode::KEY_LEFT.code(), true, false, false, false))
}

fn default_opacity() -> f32 {
    defaults::appearance::OPACITY
}

fn default_bg_color() -> String {
    defaults::appearance::BG_COLOR.to_string()
}

fn default_text_color() -> String {
    defaults::appearance::TEXT_COLOR.to_string()
}

fn default_font_size() -> u16 {
    defaults::appearance::FONT_SIZE
}

fn default_lines_per_page() -> usize {
    defaults::appearance::LINES_PER_PAGE
}

fn default_window_position() -> Position {
    Position::new(defaults::window::X, defaults::window::Y)
}

fn default_window_size() -> Dimensions {
    Dimensions::new(defaults::window::WIDTH, defaults::window::HEIGHT)
}

fn default_theme() -> Theme {
    Theme::Dark
}

fn default_button_background() -> String {
    defaults::button::BACKGROUND.to_string()
}

fn default_button_foreground() -> String {
    defaults::button::FOREGROUND.to_string()
}

fn default_save_foreground() -> String {
    defaults::button::SAVE_FOREGROUND.to_string()
}

fn default_cancel_foreground() -> String {
    defaults::button::CANCEL_FOREGROUND.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prev_key: default_prev_key(),
            next_key: default_next_key(),
            opacity: default_opacity(),
            bg_color: default_bg_color(),
            text_color: default_text_color(),
            font_size: default_font_size(),
            lines_per_page: default_lines_per_page(),
            window_position: default_window_position(),
            window_size: default_window_size(),
            theme: default_theme(),
            button_style: ButtonStyle::default(),
            command_groups: CommandGroups::builtin(),
        }
    }
}

/// Keys whose saved object replaces the default wholesale instead of being merged field by field
const REPLACED_KEYS: &[&str] = &["command_groups"];

impl Config {
    pub fn path() -> PathBuf {
        #[cfg(not(test))]
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        #[cfg(test)]
        let mut path = std::env::temp_dir().join("cad-cheatsheet-test");

        path.push(crate::common::constants::config::APP_DIR);
        path.push(crate::common::constants::config::FILENAME);
        path
    }

    /// Load configuration, falling back to defaults for anything missing or invalid.
    /// Never fails: an unreadable or malformed file yields the default config.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!(path = ?path, "Config file not found, using defaults");
            return Config::default();
        }

        let saved = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))
            .and_then(|contents| {
                serde_json::from_str::<Value>(&contents)
                    .with_context(|| format!("Failed to parse JSON from {:?}", path))
            });

        let config = match saved {
            Ok(Value::Object(saved)) => Self::merge_over_defaults(saved),
            Ok(other) => {
                warn!(path = ?path, kind = %json_kind(&other), "Config root is not an object, using defaults");
                Config::default()
            }
            Err(e) => {
                warn!(error = ?e, "Could not load config, using defaults");
                Config::default()
            }
        };

        info!(
            path = ?path,
            groups = config.command_groups.len(),
            "Loaded config"
        );
        config
    }

    /// Merge saved top-level keys over the defaults one at a time.
    /// Unknown keys are dropped; a key whose value does not deserialize keeps its default.
    pub fn merge_over_defaults(saved: Map<String, Value>) -> Self {
        let mut merged = match serde_json::to_value(Config::default()) {
            Ok(Value::Object(map)) => map,
            _ => return Config::default(),
        };

        for (key, saved_value) in saved {
            let Some(default_value) = merged.get(&key) else {
                debug!(key = %key, "Ignoring unknown config key");
                continue;
            };

            let value = match (default_value, saved_value) {
                (Value::Object(base), Value::Object(overlay))
                    if !REPLACED_KEYS.contains(&key.as_str()) =>
                {
                    let mut nested = base.clone();
                    nested.extend(overlay);
                    Value::Object(nested)
                }
                (_, value) => value,
            };

            let mut candidate = merged.clone();
            candidate.insert(key.clone(), value);
            match serde_json::from_value::<Config>(Value::Object(candidate.clone())) {
                Ok(_) => merged = candidate,
                Err(e) => warn!(key = %key, error = %e, "Invalid config value, using default"),
            }
        }

        let mut config = serde_json::from_value::<Config>(Value::Object(merged))
            .unwrap_or_default();
        config.sanitize();
        config
    }

    /// Clamp numeric settings into their supported ranges and repair invalid colors
    pub fn sanitize(&mut self) {
        use defaults::appearance as a;

        let opacity = if self.opacity.is_finite() {
            self.opacity
        } else {
            a::OPACITY
        };
        self.opacity = opacity.clamp(a::OPACITY_MIN, a::OPACITY_MAX);
        self.font_size = self.font_size.clamp(a::FONT_SIZE_MIN, a::FONT_SIZE_MAX);
        self.lines_per_page = self
            .lines_per_page
            .clamp(a::LINES_PER_PAGE_MIN, a::LINES_PER_PAGE_MAX);

        let min_size = Dimensions::new(
            crate::common::constants::overlay::MIN_WIDTH,
            crate::common::constants::overlay::MIN_HEIGHT,
        );
        self.window_size = self.window_size.at_least(min_size);

        repair_color(&mut self.bg_color, a::BG_COLOR, "bg_color");
        repair_color(&mut self.text_color, a::TEXT_COLOR, "text_color");

        let style = &mut self.button_style;
        repair_color(&mut style.background, defaults::button::BACKGROUND, "button_style.background");
        repair_color(&mut style.foreground, defaults::button::FOREGROUND, "button_style.foreground");
        repair_color(
            &mut style.save_foreground,
            defaults::button::SAVE_FOREGROUND,
            "button_style.save_foreground",
        );
        repair_color(
            &mut style.cancel_foreground,
            defaults::button::CANCEL_FOREGROUND,
            "button_style.cancel_foreground",
        );
    }

    /// Config keys of color fields that do not hold a valid hex color
    pub fn invalid_colors(&self) -> Vec<&'static str> {
        let style = &self.button_style;
        [
            ("bg_color", &self.bg_color),
            ("text_color", &self.text_color),
            ("button_style.background", &style.background),
            ("button_style.foreground", &style.foreground),
            ("button_style.save_foreground", &style.save_foreground),
            ("button_style.cancel_foreground", &style.cancel_foreground),
        ]
        .into_iter()
        .filter(|(_, value)| HexColor::parse(value).is_none())
        .map(|(key, _)| key)
        .collect()
    }

    /// Save configuration to JSON file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let json_string =
            serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;

        fs::write(path, json_string)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        debug!(path = ?path, "Saved config");
        Ok(())
    }
}

fn repair_color(value: &mut String, fallback: &str, key: &str) {
    if HexColor::parse(value).is_none() {
        warn!(key = %key, value = %value, "Invalid color in config, using default");
        *value = fallback.to_string();
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.json");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();

        assert_eq!(config.prev_key.to_string(), "ctrl+left");
        assert_eq!(config.next_key.to_string(), "ctrl+right");
        assert_eq!(config.opacity, 0.95);
        assert_eq!(config.bg_color, "#2E2E2E");
        assert_eq!(config.text_color, "#FFFFFF");
        assert_eq!(config.font_size, 10);
        assert_eq!(config.lines_per_page, 5);
        assert_eq!(config.window_position, Position::new(100, 100));
        assert_eq!(config.window_size, Dimensions::new(350, 300));
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.button_style, ButtonStyle::default());
        assert_eq!(config.command_groups, CommandGroups::builtin());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "{ this is not json");
        assert_eq!(Config::load_from(&path), Config::default());

        let path = write_config(&dir, "[1, 2, 3]");
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_partial_file_merges_over_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{"theme": "light", "font_size": 14, "window_size": {"width": 500}}"#,
        );

        let config = Config::load_from(&path);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.font_size, 14);
        // Nested objects merge field by field
        assert_eq!(config.window_size, Dimensions::new(500, 300));
        // Everything else is a default
        assert_eq!(config.prev_key, Config::default().prev_key);
        assert_eq!(config.lines_per_page, 5);
        assert_eq!(config.command_groups.len(), 8);
    }

    #[test]
    fn test_invalid_values_fall_back_per_key() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "prev_key": "ctrl+",
                "next_key": "alt+pagedown",
                "opacity": "very",
                "theme": "purple",
                "lines_per_page": 7,
                "some_future_key": true
            }"#,
        );

        let config = Config::load_from(&path);
        assert_eq!(config.prev_key, Config::default().prev_key);
        assert_eq!(config.next_key.to_string(), "alt+pagedown");
        assert_eq!(config.opacity, 0.95);
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.lines_per_page, 7);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let mut saved = Map::new();
        saved.insert("opacity".into(), serde_json::json!(0.0));
        saved.insert("font_size".into(), serde_json::json!(72));
        saved.insert("lines_per_page".into(), serde_json::json!(0));
        saved.insert("bg_color".into(), serde_json::json!("SystemButtonFace"));
        saved.insert("window_size".into(), serde_json::json!({"width": 10, "height": 10}));

        let config = Config::merge_over_defaults(saved);
        assert_eq!(config.opacity, 0.1);
        assert_eq!(config.font_size, 20);
        assert_eq!(config.lines_per_page, 3);
        assert_eq!(config.bg_color, "#2E2E2E");
        assert_eq!(config.window_size, Dimensions::new(200, 120));
    }

    #[test]
    fn test_invalid_colors_lists_offending_keys() {
        let mut config = Config::default();
        assert!(config.invalid_colors().is_empty());

        config.text_color = "#+FFFFF".into();
        config.button_style.cancel_foreground = "red".into();
        assert_eq!(
            config.invalid_colors(),
            vec!["text_color", "button_style.cancel_foreground"]
        );

        config.sanitize();
        assert!(config.invalid_colors().is_empty());
        assert_eq!(config.text_color, "#FFFFFF");
    }

    #[test]
    fn test_command_groups_are_replaced_not_merged() {
        let mut saved = Map::new();
        saved.insert(
            "command_groups".into(),
            serde_json::json!({"Mine": {"active": true, "commands": ["HATCH (H)"]}}),
        );

        let config = Config::merge_over_defaults(saved);
        assert_eq!(config.command_groups.len(), 1);
        assert_eq!(config.command_groups.active_commands(), vec!["HATCH (H)"]);
    }

    #[test]
    fn test_every_default_key_present_after_load() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"opacity": 0.5}"#);
        let config = Config::load_from(&path);

        let value = serde_json::to_value(&config).unwrap();
        let default_value = serde_json::to_value(Config::default()).unwrap();
        let keys = value.as_object().unwrap();
        for key in default_value.as_object().unwrap().keys() {
            assert!(keys.contains_key(key), "missing key {key}");
        }
        assert_eq!(config.opacity, 0.5);
    }

    #[test]
    fn test_save_then_load_preserves_edits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.theme = Theme::Light;
        config.lines_per_page = 8;
        config.next_key = "ctrl+shift+n".parse().unwrap();
        config.command_groups.set_active("Measure", false).unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_saved_file_uses_flat_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        Config::default().save_to(&path).unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["prev_key"], "ctrl+left");
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw["window_position"]["x"], 100);
        assert_eq!(raw["command_groups"]["Drawing"]["active"], true);
    }

    #[test]
    fn test_default_path_is_under_app_dir() {
        let path = Config::path();
        assert!(path.ends_with("cad-cheatsheet/config.json"));
    }
}
