//! Interactive hotkey capture for the settings dialog
//!
//! Keys are read from the settings viewport's own input while the capture
//! dialog is open. Modifiers give live feedback; the first non-modifier key
//! completes the capture and Escape cancels it.

use std::time::{Duration, Instant};

use eframe::egui;
use evdev::KeyCode;
use tracing::debug;

use crate::common::constants::settings_ui::CAPTURE_TIMEOUT_SECS;
use crate::config::HotkeyBinding;

/// Result of a key capture operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureResult {
    /// Key was successfully captured
    Captured(HotkeyBinding),
    /// User pressed Escape to cancel
    Cancelled,
    /// No key pressed within the timeout period
    Timeout,
}

/// Key capture state for GUI display
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureState {
    /// Currently held modifiers (live feedback)
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    /// The main key that was pressed (None until a non-modifier key is pressed)
    pub key_code: Option<u16>,
    /// Human-readable description of what's being detected
    pub description: String,
    started: Instant,
}

impl CaptureState {
    pub fn new(now: Instant) -> Self {
        Self {
            ctrl: false,
            shift: false,
            alt: false,
            key_code: None,
            description: "Press a key combination...".to_string(),
            started: now,
        }
    }

    /// Update description based on current state
    pub fn update_description(&mut self) {
        if let Some(key_code) = self.key_code {
            let binding = HotkeyBinding::new(key_code, self.ctrl, self.shift, self.alt, false);
            self.description = binding.display_name();
            return;
        }

        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        if self.alt {
            parts.push("Alt");
        }

        self.description = if parts.is_empty() {
            "Press a key combination...".to_string()
        } else {
            format!("{}+?", parts.join("+"))
        };
    }

    /// Feed one frame of input. Returns the outcome once the capture is over.
    pub fn process(
        &mut self,
        modifiers: egui::Modifiers,
        pressed: &[egui::Key],
        now: Instant,
    ) -> Option<CaptureResult> {
        self.ctrl = modifiers.ctrl;
        self.shift = modifiers.shift;
        self.alt = modifiers.alt;

        for key in pressed {
            if *key == egui::Key::Escape {
                debug!("Key capture cancelled");
                return Some(CaptureResult::Cancelled);
            }
            match egui_key_to_code(*key) {
                Some(code) => {
                    self.key_code = Some(code);
                    self.update_description();
                    let binding = HotkeyBinding::new(code, self.ctrl, self.shift, self.alt, false);
                    debug!(binding = %binding.display_name(), "Key captured");
                    return Some(CaptureResult::Captured(binding));
                }
                None => debug!(key = ?key, "Key has no hotkey equivalent, ignoring"),
            }
        }

        self.update_description();

        if now.duration_since(self.started) >= Duration::from_secs(CAPTURE_TIMEOUT_SECS) {
            return Some(CaptureResult::Timeout);
        }
        None
    }
}

/// Map an egui key to its Linux input key code
pub fn egui_key_to_code(key: egui::Key) -> Option<u16> {
    use egui::Key;

    let code = match key {
        Key::ArrowLeft => KeyCode::KEY_LEFT,
        Key::ArrowRight => KeyCode::KEY_RIGHT,
        Key::ArrowUp => KeyCode::KEY_UP,
        Key::ArrowDown => KeyCode::KEY_DOWN,
        Key::PageUp => KeyCode::KEY_PAGEUP,
        Key::PageDown => KeyCode::KEY_PAGEDOWN,
        Key::Home => KeyCode::KEY_HOME,
        Key::End => KeyCode::KEY_END,
        Key::Insert => KeyCode::KEY_INSERT,
        Key::Delete => KeyCode::KEY_DELETE,
        Key::Backspace => KeyCode::KEY_BACKSPACE,
        Key::Enter => KeyCode::KEY_ENTER,
        Key::Space => KeyCode::KEY_SPACE,
        Key::Tab => KeyCode::KEY_TAB,
        Key::Escape => KeyCode::KEY_ESC,

        Key::Minus => KeyCode::KEY_MINUS,
        Key::Equals => KeyCode::KEY_EQUAL,
        Key::Comma => KeyCode::KEY_COMMA,
        Key::Period => KeyCode::KEY_DOT,
        Key::Slash => KeyCode::KEY_SLASH,
        Key::Semicolon => KeyCode::KEY_SEMICOLON,

        Key::Num0 => KeyCode::KEY_0,
        Key::Num1 => KeyCode::KEY_1,
        Key::Num2 => KeyCode::KEY_2,
        Key::Num3 => KeyCode::KEY_3,
        Key::Num4 => KeyCode::KEY_4,
        Key::Num5 => KeyCode::KEY_5,
        Key::Num6 => KeyCode::KEY_6,
        Key::Num7 => KeyCode::KEY_7,
        Key::Num8 => KeyCode::KEY_8,
        Key::Num9 => KeyCode::KEY_9,

        Key::A => KeyCode::KEY_A,
        Key::B => KeyCode::KEY_B,
        Key::C => KeyCode::KEY_C,
        Key::D => KeyCode::KEY_D,
        Key::E => KeyCode::KEY_E,
        Key::F => KeyCode::KEY_F,
        Key::G => KeyCode::KEY_G,
        Key::H => KeyCode::KEY_H,
        Key::I => KeyCode::KEY_I,
        Key::J => KeyCode::KEY_J,
        Key::K => KeyCode::KEY_K,
        Key::L => KeyCode::KEY_L,
        Key::M => KeyCode::KEY_M,
        Key::N => KeyCode::KEY_N,
        Key::O => KeyCode::KEY_O,
        Key::P => KeyCode::KEY_P,
        Key::Q => KeyCode::KEY_Q,
        Key::R => KeyCode::KEY_R,
        Key::S => KeyCode::KEY_S,
        Key::T => KeyCode::KEY_T,
        Key::U => KeyCode::KEY_U,
        Key::V => KeyCode::KEY_V,
        Key::W => KeyCode::KEY_W,
        Key::X => KeyCode::KEY_X,
        Key::Y => KeyCode::KEY_Y,
        Key::Z => KeyCode::KEY_Z,

        Key::F1 => KeyCode::KEY_F1,
        Key::F2 => KeyCode::KEY_F2,
        Key::F3 => KeyCode::KEY_F3,
        Key::F4 => KeyCode::KEY_F4,
        Key::F5 => KeyCode::KEY_F5,
        Key::F6 => KeyCode::KEY_F6,
        Key::F7 => KeyCode::KEY_F7,
        Key::F8 => KeyCode::KEY_F8,
        Key::F9 => KeyCode::KEY_F9,
        Key::F10 => KeyCode::KEY_F10,
        Key::F11 => KeyCode::KEY_F11,
        Key::F12 => KeyCode::KEY_F12,

        _ => return None,
    };
    Some(code.code())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl() -> egui::Modifiers {
        egui::Modifiers {
            ctrl: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_modifiers_give_live_feedback() {
        let now = Instant::now();
        let mut state = CaptureState::new(now);

        assert_eq!(state.process(ctrl(), &[], now), None);
        assert_eq!(state.description, "Ctrl+?");

        let ctrl_shift = egui::Modifiers {
            shift: true,
            ..ctrl()
        };
        assert_eq!(state.process(ctrl_shift, &[], now), None);
        assert_eq!(state.description, "Ctrl+Shift+?");
    }

    #[test]
    fn test_first_key_completes_capture() {
        let now = Instant::now();
        let mut state = CaptureState::new(now);

        let result = state.process(ctrl(), &[egui::Key::PageDown, egui::Key::A], now);
        assert_eq!(
            result,
            Some(CaptureResult::Captured("ctrl+pagedown".parse().unwrap()))
        );
        assert_eq!(state.description, "Ctrl+Page Down");
    }

    #[test]
    fn test_escape_cancels() {
        let now = Instant::now();
        let mut state = CaptureState::new(now);

        let result = state.process(ctrl(), &[egui::Key::Escape], now);
        assert_eq!(result, Some(CaptureResult::Cancelled));
    }

    #[test]
    fn test_times_out_without_key() {
        let now = Instant::now();
        let mut state = CaptureState::new(now);

        let later = now + Duration::from_secs(CAPTURE_TIMEOUT_SECS);
        assert_eq!(
            state.process(egui::Modifiers::NONE, &[], later),
            Some(CaptureResult::Timeout)
        );
    }

    #[test]
    fn test_key_mapping_matches_config_names() {
        for (key, name) in [
            (egui::Key::ArrowLeft, "left"),
            (egui::Key::F5, "f5"),
            (egui::Key::Num7, "7"),
            (egui::Key::Q, "q"),
        ] {
            let parsed: HotkeyBinding = name.parse().unwrap();
            assert_eq!(egui_key_to_code(key), Some(parsed.key_code));
        }
        assert_eq!(egui_key_to_code(egui::Key::F30), None);
    }
}
