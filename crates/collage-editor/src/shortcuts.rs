//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. On macOS
//! `meta` is ⌘; elsewhere `ctrl` plays the same role.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Delete,
    Duplicate,
    ToggleLock,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomToFit,
    ResetZoom,

    // ── Z-order ──
    SendBackward,
    BringForward,

    // ── UI ──
    Deselect,
}

impl ShortcutAction {
    /// True for actions that do nothing without an active object.
    pub fn needs_selection(self) -> bool {
        matches!(
            self,
            ShortcutAction::Delete
                | ShortcutAction::Duplicate
                | ShortcutAction::ToggleLock
                | ShortcutAction::SendBackward
                | ShortcutAction::BringForward
        )
    }
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"d"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;
        if alt {
            return None;
        }

        if cmd {
            return match key {
                "d" | "D" if !shift => Some(ShortcutAction::Duplicate),
                "l" | "L" if !shift => Some(ShortcutAction::ToggleLock),
                // "+" arrives with shift on most layouts
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" | "_" => Some(ShortcutAction::ZoomOut),
                "0" if !shift => Some(ShortcutAction::ZoomToFit),
                "1" if !shift => Some(ShortcutAction::ResetZoom),
                "]" if !shift => Some(ShortcutAction::BringForward),
                "[" if !shift => Some(ShortcutAction::SendBackward),
                _ => None,
            };
        }

        if shift {
            return None;
        }

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}
