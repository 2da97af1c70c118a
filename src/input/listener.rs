//! Page navigation hotkeys
//!
//! `HotkeyRegistry` keeps the command → binding table and drives a backend so
//! that rebinding always releases the old combination before grabbing the new
//! one.

use anyhow::{Result, bail};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::config::HotkeyBinding;
use crate::input::backend::HotkeyBackend;

/// Hotkey command sent from input listeners to the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageCommand {
    PreviousPage,
    NextPage,
}

pub struct HotkeyRegistry {
    backend: Box<dyn HotkeyBackend>,
    bindings: HashMap<PageCommand, HotkeyBinding>,
}

impl HotkeyRegistry {
    pub fn new(backend: Box<dyn HotkeyBackend>) -> Self {
        Self {
            backend,
            bindings: HashMap::new(),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn binding(&self, command: PageCommand) -> Option<&HotkeyBinding> {
        self.bindings.get(&command)
    }

    /// Bind each command to its desired combination.
    ///
    /// Unchanged bindings are left alone. Changed ones are first unregistered
    /// (a combination that is not currently registered is skipped), then the
    /// new combinations are registered. Registration failures do not stop the
    /// remaining commands from being bound; the first error is returned.
    pub fn bind_all(&mut self, desired: &[(PageCommand, HotkeyBinding)]) -> Result<()> {
        for (i, (command, binding)) in desired.iter().enumerate() {
            if let Some((other, _)) = desired[..i].iter().find(|(_, b)| b == binding) {
                bail!(
                    "{} is assigned to both {:?} and {:?}",
                    binding.display_name(),
                    other,
                    command
                );
            }
            let held_elsewhere = self.bindings.iter().find(|(cmd, b)| {
                *b == binding && !desired.iter().any(|(wanted, _)| wanted == *cmd)
            });
            if let Some((other, _)) = held_elsewhere {
                bail!("{} is already bound to {:?}", binding.display_name(), other);
            }
        }

        // Release every combination that is about to change
        for (command, binding) in desired {
            if self.bindings.get(command) == Some(binding) {
                continue;
            }
            if let Some(previous) = self.bindings.remove(command) {
                self.release(&previous);
            }
        }

        let mut first_error = None;
        for (command, binding) in desired {
            if self.bindings.get(command) == Some(binding) {
                debug!(command = ?command, binding = %binding.display_name(), "Hotkey unchanged");
                continue;
            }
            match self.backend.register(binding, *command) {
                Ok(()) => {
                    info!(
                        command = ?command,
                        binding = %binding.display_name(),
                        backend = self.backend.name(),
                        "Registered page hotkey"
                    );
                    self.bindings.insert(*command, binding.clone());
                }
                Err(e) => {
                    warn!(command = ?command, binding = %binding.display_name(), error = %e, "Failed to register page hotkey");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Unregister everything (used on shutdown)
    pub fn clear(&mut self) {
        let bindings: Vec<HotkeyBinding> = self.bindings.drain().map(|(_, b)| b).collect();
        for binding in bindings {
            self.release(&binding);
        }
    }

    fn release(&mut self, binding: &HotkeyBinding) {
        if self.bindings.values().any(|b| b == binding) {
            return;
        }
        match self.backend.unregister(binding) {
            Ok(true) => debug!(binding = %binding.display_name(), "Unregistered hotkey"),
            Ok(false) => debug!(binding = %binding.display_name(), "Hotkey was not registered, nothing to remove"),
            Err(e) => warn!(binding = %binding.display_name(), error = %e, "Failed to unregister hotkey"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Register(String, PageCommand),
        Unregister(String, bool),
    }

    #[derive(Clone, Default)]
    struct FakeBackend {
        ops: Arc<Mutex<Vec<Op>>>,
        registered: Arc<Mutex<HashSet<HotkeyBinding>>>,
        reject: Option<String>,
    }

    impl HotkeyBackend for FakeBackend {
        fn register(&mut self, binding: &HotkeyBinding, command: PageCommand) -> Result<()> {
            if self.reject.as_deref() == Some(&binding.to_string()) {
                return Err(anyhow!("grab refused"));
            }
            self.ops
                .lock()
                .unwrap()
                .push(Op::Register(binding.to_string(), command));
            self.registered.lock().unwrap().insert(binding.clone());
            Ok(())
        }

        fn unregister(&mut self, binding: &HotkeyBinding) -> Result<bool> {
            let removed = self.registered.lock().unwrap().remove(binding);
            self.ops
                .lock()
                .unwrap()
                .push(Op::Unregister(binding.to_string(), removed));
            Ok(removed)
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    fn key(s: &str) -> HotkeyBinding {
        s.parse().unwrap()
    }

    fn defaults() -> Vec<(PageCommand, HotkeyBinding)> {
        vec![
            (PageCommand::PreviousPage, key("ctrl+left")),
            (PageCommand::NextPage, key("ctrl+right")),
        ]
    }

    fn registry() -> (HotkeyRegistry, FakeBackend) {
        let backend = FakeBackend::default();
        (HotkeyRegistry::new(Box::new(backend.clone())), backend)
    }

    #[test]
    fn test_initial_bind_registers_both() {
        let (mut registry, backend) = registry();
        registry.bind_all(&defaults()).unwrap();

        assert_eq!(
            *backend.ops.lock().unwrap(),
            vec![
                Op::Register("ctrl+left".into(), PageCommand::PreviousPage),
                Op::Register("ctrl+right".into(), PageCommand::NextPage),
            ]
        );
        assert_eq!(registry.binding(PageCommand::NextPage), Some(&key("ctrl+right")));
    }

    #[test]
    fn test_rebind_unregisters_old_before_registering_new() {
        let (mut registry, backend) = registry();
        registry.bind_all(&defaults()).unwrap();
        backend.ops.lock().unwrap().clear();

        registry
            .bind_all(&[
                (PageCommand::PreviousPage, key("ctrl+left")),
                (PageCommand::NextPage, key("alt+pagedown")),
            ])
            .unwrap();

        assert_eq!(
            *backend.ops.lock().unwrap(),
            vec![
                Op::Unregister("ctrl+right".into(), true),
                Op::Register("alt+pagedown".into(), PageCommand::NextPage),
            ]
        );
    }

    #[test]
    fn test_swapping_bindings() {
        let (mut registry, backend) = registry();
        registry.bind_all(&defaults()).unwrap();
        backend.ops.lock().unwrap().clear();

        registry
            .bind_all(&[
                (PageCommand::PreviousPage, key("ctrl+right")),
                (PageCommand::NextPage, key("ctrl+left")),
            ])
            .unwrap();

        let ops = backend.ops.lock().unwrap().clone();
        assert_eq!(ops.len(), 4);
        assert!(matches!(ops[0], Op::Unregister(_, true)));
        assert!(matches!(ops[1], Op::Unregister(_, true)));
        assert_eq!(ops[2], Op::Register("ctrl+right".into(), PageCommand::PreviousPage));
        assert_eq!(ops[3], Op::Register("ctrl+left".into(), PageCommand::NextPage));
    }

    #[test]
    fn test_unregistering_missing_binding_is_noop() {
        let (mut registry, backend) = registry();
        registry.bind_all(&defaults()).unwrap();

        // Simulate the platform dropping the grab behind our back
        backend.registered.lock().unwrap().clear();
        backend.ops.lock().unwrap().clear();

        registry
            .bind_all(&[
                (PageCommand::PreviousPage, key("ctrl+up")),
                (PageCommand::NextPage, key("ctrl+down")),
            ])
            .unwrap();

        let ops = backend.ops.lock().unwrap().clone();
        assert_eq!(ops[0], Op::Unregister("ctrl+left".into(), false));
        assert_eq!(ops[1], Op::Unregister("ctrl+right".into(), false));
        assert_eq!(registry.binding(PageCommand::PreviousPage), Some(&key("ctrl+up")));
    }

    #[test]
    fn test_unchanged_bindings_are_untouched() {
        let (mut registry, backend) = registry();
        registry.bind_all(&defaults()).unwrap();
        backend.ops.lock().unwrap().clear();

        registry.bind_all(&defaults()).unwrap();
        assert!(backend.ops.lock().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_binding_rejected_without_changes() {
        let (mut registry, backend) = registry();
        registry.bind_all(&defaults()).unwrap();
        backend.ops.lock().unwrap().clear();

        let result = registry.bind_all(&[
            (PageCommand::PreviousPage, key("ctrl+a")),
            (PageCommand::NextPage, key("ctrl+a")),
        ]);
        assert!(result.is_err());
        assert!(backend.ops.lock().unwrap().is_empty());
        assert_eq!(registry.binding(PageCommand::PreviousPage), Some(&key("ctrl+left")));
    }

    #[test]
    fn test_conflict_with_other_command_rejected() {
        let (mut registry, _backend) = registry();
        registry.bind_all(&defaults()).unwrap();

        let result = registry.bind_all(&[(PageCommand::PreviousPage, key("ctrl+right"))]);
        assert!(result.is_err());
    }

    #[test]
    fn test_register_failure_still_binds_remaining() {
        let backend = FakeBackend {
            reject: Some("ctrl+left".into()),
            ..Default::default()
        };
        let mut registry = HotkeyRegistry::new(Box::new(backend.clone()));

        assert!(registry.bind_all(&defaults()).is_err());
        assert_eq!(registry.binding(PageCommand::PreviousPage), None);
        assert_eq!(registry.binding(PageCommand::NextPage), Some(&key("ctrl+right")));
    }

    #[test]
    fn test_clear_unregisters_everything() {
        let (mut registry, backend) = registry();
        registry.bind_all(&defaults()).unwrap();
        registry.clear();

        assert!(backend.registered.lock().unwrap().is_empty());
        assert_eq!(registry.binding(PageCommand::PreviousPage), None);
    }
}
