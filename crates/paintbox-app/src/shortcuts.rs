//! Keyboard shortcut registry and documentation.

use paintbox_core::KeyPress;

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Undo,
    Redo,
    /// Drop the stroke in progress.
    CancelStroke,
}

/// A keyboard shortcut definition. `command` means Ctrl, or Cmd on macOS.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub command: bool,
    pub shift: bool,
    pub action: ShortcutAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        command: bool,
        shift: bool,
        action: ShortcutAction,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            command,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Shift+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.command {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    fn matches(&self, press: &KeyPress) -> bool {
        press.key.eq_ignore_ascii_case(self.key)
            && press.modifiers.command() == self.command
            && press.modifiers.shift == self.shift
    }
}

const SHORTCUTS: &[Shortcut] = &[
    Shortcut::new("Z", true, false, ShortcutAction::Undo, "Undo"),
    Shortcut::new("Y", true, false, ShortcutAction::Redo, "Redo"),
    Shortcut::new("Z", true, true, ShortcutAction::Redo, "Redo"),
    Shortcut::new("Escape", false, false, ShortcutAction::CancelStroke, "Cancel current stroke"),
];

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> &'static [Shortcut] {
        SHORTCUTS
    }

    /// Resolve a key press to an action.
    pub fn action_for(press: &KeyPress) -> Option<ShortcutAction> {
        SHORTCUTS.iter().find(|s| s.matches(press)).map(|s| s.action)
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paintbox_core::Modifiers;

    fn press(key: &str, ctrl: bool, meta: bool, shift: bool) -> KeyPress {
        KeyPress::new(
            key,
            Modifiers {
                ctrl,
                meta,
                shift,
                alt: false,
            },
        )
    }

    #[test]
    fn test_undo_redo_bindings() {
        assert_eq!(ShortcutRegistry::action_for(&press("z", true, false, false)), Some(ShortcutAction::Undo));
        assert_eq!(ShortcutRegistry::action_for(&press("y", true, false, false)), Some(ShortcutAction::Redo));
        assert_eq!(ShortcutRegistry::action_for(&press("Z", true, false, true)), Some(ShortcutAction::Redo));
        assert_eq!(
            ShortcutRegistry::action_for(&press("escape", false, false, false)),
            Some(ShortcutAction::CancelStroke)
        );
    }

    #[test]
    fn test_cmd_on_mac() {
        assert_eq!(ShortcutRegistry::action_for(&press("z", false, true, false)), Some(ShortcutAction::Undo));
        assert_eq!(ShortcutRegistry::action_for(&press("z", false, true, true)), Some(ShortcutAction::Redo));
    }

    #[test]
    fn test_unbound_keys() {
        assert_eq!(ShortcutRegistry::action_for(&press("z", false, false, false)), None);
        assert_eq!(ShortcutRegistry::action_for(&press("x", true, false, false)), None);
        assert_eq!(ShortcutRegistry::action_for(&press("y", true, false, true)), None);
    }

    #[test]
    fn test_format() {
        let formatted: Vec<String> = ShortcutRegistry::all().iter().map(Shortcut::format).collect();
        assert_eq!(formatted, vec!["Ctrl+Z", "Ctrl+Y", "Ctrl+Shift+Z", "Escape"]);
    }
}
