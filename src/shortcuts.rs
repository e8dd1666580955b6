//! Application-wide key bindings that apply no matter which view has focus.
//!
//! A binding lives exactly as long as the [`ShortcutGuard`] returned when it
//! was registered.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalAction {
    OpenSearch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub const fn ctrl(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
        }
    }

    fn from_event(key: &KeyEvent) -> Self {
        // Shift is folded into the character itself for Char keys.
        let modifiers = match key.code {
            KeyCode::Char(_) => key.modifiers - KeyModifiers::SHIFT,
            _ => key.modifiers,
        };
        Self { code: key.code, modifiers }
    }
}

type Bindings = Rc<RefCell<HashMap<KeyBinding, GlobalAction>>>;

#[derive(Default)]
pub struct Shortcuts {
    bindings: Bindings,
}

impl Shortcuts {
    #[must_use = "the binding is removed as soon as the guard is dropped"]
    pub fn register(&self, binding: KeyBinding, action: GlobalAction) -> ShortcutGuard {
        if let Some(previous) = self.bindings.borrow_mut().insert(binding, action) {
            log::warn!("shortcut {binding:?} rebound from {previous:?} to {action:?}");
        }
        ShortcutGuard {
            bindings: Rc::downgrade(&self.bindings),
            binding,
        }
    }

    pub fn lookup(&self, key: &KeyEvent) -> Option<GlobalAction> {
        self.bindings.borrow().get(&KeyBinding::from_event(key)).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.borrow().len()
    }
}

/// Deregisters its binding on drop.
pub struct ShortcutGuard {
    bindings: Weak<RefCell<HashMap<KeyBinding, GlobalAction>>>,
    binding: KeyBinding,
}

impl Drop for ShortcutGuard {
    fn drop(&mut self) {
        if let Some(bindings) = self.bindings.upgrade() {
            bindings.borrow_mut().remove(&self.binding);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_lives_as_long_as_guard() {
        let shortcuts = Shortcuts::default();
        let ctrl_k = KeyEvent::new(KeyCode::Char('k'), KeyModifiers::CONTROL);
        {
            let _guard = shortcuts.register(KeyBinding::ctrl('k'), GlobalAction::OpenSearch);
            assert_eq!(shortcuts.lookup(&ctrl_k), Some(GlobalAction::OpenSearch));
            assert_eq!(shortcuts.len(), 1);
        }
        assert_eq!(shortcuts.lookup(&ctrl_k), None);
        assert_eq!(shortcuts.len(), 0);
    }

    #[test]
    fn plain_key_does_not_match_ctrl_binding() {
        let shortcuts = Shortcuts::default();
        let _guard = shortcuts.register(KeyBinding::ctrl('k'), GlobalAction::OpenSearch);
        let plain = KeyEvent::new(KeyCode::Char('k'), KeyModifiers::NONE);
        assert_eq!(shortcuts.lookup(&plain), None);
        let shifted = KeyEvent::new(KeyCode::Char('k'), KeyModifiers::CONTROL | KeyModifiers::SHIFT);
        assert_eq!(shortcuts.lookup(&shifted), Some(GlobalAction::OpenSearch));
    }

    #[test]
    fn guard_outliving_registry_is_harmless() {
        let shortcuts = Shortcuts::default();
        let guard = shortcuts.register(KeyBinding::ctrl('k'), GlobalAction::OpenSearch);
        drop(shortcuts);
        drop(guard);
    }
}
