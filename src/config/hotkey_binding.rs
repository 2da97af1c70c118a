//! Hotkey binding configuration and key code mapping
//!
//! Bindings are stored in the config file in the short string form used by the
//! page navigation settings, e.g. `"ctrl+left"` or `"ctrl+shift+f1"`. Internally
//! the main key is a Linux input key code so it can be handed to the X11 grab
//! backend without a keysym lookup.

use evdev::KeyCode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing a hotkey string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HotkeyParseError {
    #[error("hotkey is empty")]
    Empty,

    #[error("hotkey '{0}' has no main key")]
    MissingKey(String),

    #[error("hotkey '{0}' has more than one main key")]
    MultipleKeys(String),

    #[error("unknown key name: {0}")]
    UnknownKey(String),
}

/// A keyboard hotkey binding with modifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HotkeyBinding {
    /// evdev key code (e.g., KEY_LEFT = 105, KEY_F1 = 59)
    pub key_code: u16,

    /// Control key pressed
    pub ctrl: bool,

    /// Shift key pressed
    pub shift: bool,

    /// Alt key pressed
    pub alt: bool,

    /// Super/Windows key pressed
    pub super_key: bool,
}

impl HotkeyBinding {
    /// Create a new hotkey binding
    pub fn new(key_code: u16, ctrl: bool, shift: bool, alt: bool, super_key: bool) -> Self {
        Self {
            key_code,
            ctrl,
            shift,
            alt,
            super_key,
        }
    }

    /// Get human-readable display name for this binding (for UI)
    pub fn display_name(&self) -> String {
        let mut parts = Vec::new();

        if self.ctrl {
            parts.push("Ctrl".to_string());
        }
        if self.shift {
            parts.push("Shift".to_string());
        }
        if self.alt {
            parts.push("Alt".to_string());
        }
        if self.super_key {
            parts.push("Super".to_string());
        }

        parts.push(key_code_to_name(self.key_code));

        parts.join("+")
    }
}

impl fmt::Display for HotkeyBinding {
    /// Canonical config form: lowercase modifiers in fixed order, then the key
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("ctrl+")?;
        }
        if self.shift {
            f.write_str("shift+")?;
        }
        if self.alt {
            f.write_str("alt+")?;
        }
        if self.super_key {
            f.write_str("super+")?;
        }
        f.write_str(&key_token(self.key_code))
    }
}

impl FromStr for HotkeyBinding {
    type Err = HotkeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(HotkeyParseError::Empty);
        }

        let mut ctrl = false;
        let mut shift = false;
        let mut alt = false;
        let mut super_key = false;
        let mut main_key: Option<u16> = None;

        for raw in trimmed.split('+') {
            let token = raw.trim().to_ascii_lowercase();
            match token.as_str() {
                "" => continue,
                "ctrl" | "control" | "ctl" => ctrl = true,
                "shift" => shift = true,
                "alt" | "option" => alt = true,
                "super" | "win" | "windows" | "meta" | "cmd" => super_key = true,
                name => {
                    if main_key.is_some() {
                        return Err(HotkeyParseError::MultipleKeys(trimmed.to_string()));
                    }
                    let code = token_to_key_code(name)
                        .ok_or_else(|| HotkeyParseError::UnknownKey(raw.trim().to_string()))?;
                    main_key = Some(code);
                }
            }
        }

        match main_key {
            Some(code) => Ok(Self::new(code, ctrl, shift, alt, super_key)),
            None => Err(HotkeyParseError::MissingKey(trimmed.to_string())),
        }
    }
}

impl Serialize for HotkeyBinding {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HotkeyBinding {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// True for key codes that only ever act as modifiers
pub fn is_modifier_key(code: u16) -> bool {
    [
        KeyCode::KEY_LEFTCTRL,
        KeyCode::KEY_RIGHTCTRL,
        KeyCode::KEY_LEFTSHIFT,
        KeyCode::KEY_RIGHTSHIFT,
        KeyCode::KEY_LEFTALT,
        KeyCode::KEY_RIGHTALT,
        KeyCode::KEY_LEFTMETA,
        KeyCode::KEY_RIGHTMETA,
    ]
    .iter()
    .any(|k| k.code() == code)
}

/// Resolve a single lowercase key token to a key code.
/// Accepts evdev names without the `KEY_` prefix plus the common aliases
/// produced by Tk keysyms and other hotkey libraries.
fn token_to_key_code(token: &str) -> Option<u16> {
    let canonical = match token {
        "esc" | "escape" => "esc",
        "return" | "enter" => "enter",
        "prior" | "pgup" | "page up" | "page_up" | "pageup" => "pageup",
        "next" | "pgdn" | "page down" | "page_down" | "pagedown" => "pagedown",
        "del" | "delete" => "delete",
        "ins" | "insert" => "insert",
        "space" | "spacebar" => "space",
        "arrowleft" => "left",
        "arrowright" => "right",
        "arrowup" => "up",
        "arrowdown" => "down",
        other => other,
    };

    let code = KeyCode::from_str(&format!("KEY_{}", canonical.to_ascii_uppercase()))
        .ok()?
        .code();

    if is_modifier_key(code) {
        return None;
    }
    Some(code)
}

/// Config-file token for a key code (`KEY_PAGEUP` → `pageup`)
fn key_token(code: u16) -> String {
    let linux_name = format!("{:?}", KeyCode(code));
    linux_name
        .strip_prefix("KEY_")
        .unwrap_or(&linux_name)
        .to_ascii_lowercase()
}

/// Convert evdev key code to human-readable name (for UI display)
pub fn key_code_to_name(code: u16) -> String {
    // Get the Linux key name from evdev (e.g., "KEY_TAB", "KEY_F1")
    let linux_name = format!("{:?}", KeyCode(code));
    let name = linux_name.strip_prefix("KEY_").unwrap_or(&linux_name);

    match name {
        "ESC" => "Esc".to_string(),
        "BACKSPACE" => "Backspace".to_string(),
        "ENTER" => "Enter".to_string(),
        "SPACE" => "Space".to_string(),
        "PAGEUP" => "Page Up".to_string(),
        "PAGEDOWN" => "Page Down".to_string(),
        "INSERT" => "Insert".to_string(),
        "DELETE" => "Delete".to_string(),
        "HOME" => "Home".to_string(),
        "END" => "End".to_string(),
        "LEFT" => "Left".to_string(),
        "RIGHT" => "Right".to_string(),
        "UP" => "Up".to_string(),
        "DOWN" => "Down".to_string(),

        s if s.starts_with("KP") => format!("Numpad {}", &s[2..]),

        // Single letters/numbers and function keys are already clean
        s if s.len() == 1 => s.to_string(),
        s if s.starts_with('F') && s.len() <= 3 => s.to_string(),

        // Everything else - underscores to spaces, title case
        s => s
            .replace('_', " ")
            .split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.as_str().to_lowercase().chars())
                        .collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}
