//! Hotkey backend abstraction layer
//!
//! Provides a trait-based interface for global hotkey registration.
//! Currently supports:
//! - X11 XGrabKey (default, no permissions required)
//! - Disabled (no display reachable; bindings are accepted but never fire)

use anyhow::Result;
use std::collections::HashSet;
use tracing::info;

use crate::config::HotkeyBinding;
use crate::input::listener::PageCommand;

/// Hotkey backend trait
///
/// A backend owns the platform registrations. Registration state is tracked
/// per binding: registering an already registered binding is a no-op, and
/// unregistering a binding that is not registered reports `false` instead of
/// failing.
pub trait HotkeyBackend: Send {
    /// Register a global key combination that emits `command` when pressed
    fn register(&mut self, binding: &HotkeyBinding, command: PageCommand) -> Result<()>;

    /// Remove a global key combination.
    /// Returns `Ok(false)` if the binding was not registered.
    fn unregister(&mut self, binding: &HotkeyBinding) -> Result<bool>;

    /// Get human-readable backend name
    fn name(&self) -> &'static str;
}

/// Backend used when no hotkey mechanism is available.
/// The overlay keeps working; page changes are only possible from the UI.
#[derive(Debug, Default)]
pub struct DisabledBackend {
    registered: HashSet<HotkeyBinding>,
}

impl DisabledBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HotkeyBackend for DisabledBackend {
    fn register(&mut self, binding: &HotkeyBinding, command: PageCommand) -> Result<()> {
        info!(
            binding = %binding.display_name(),
            command = ?command,
            "Global hotkeys unavailable, binding recorded only"
        );
        self.registered.insert(binding.clone());
        Ok(())
    }

    fn unregister(&mut self, binding: &HotkeyBinding) -> Result<bool> {
        Ok(self.registered.remove(binding))
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
