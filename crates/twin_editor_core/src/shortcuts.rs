// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyboard shortcuts that drive the editor session.
//!
//! Ctrl and Cmd are treated as the same "primary" modifier, so Ctrl+Z and
//! Cmd+Z both undo.

use std::collections::HashMap;
use std::fmt;

/// A key, independent of any windowing library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Letter or digit, stored lowercase
    Char(char),
    /// Escape key
    Escape,
    /// Delete key
    Delete,
}

impl Key {
    /// Character key, normalized to lowercase
    pub fn char(c: char) -> Self {
        Self::Char(c.to_ascii_lowercase())
    }

    /// Parse a key name
    pub fn parse(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        match lower.as_str() {
            "escape" | "esc" => Some(Self::Escape),
            "delete" | "del" => Some(Self::Delete),
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphanumeric() => Some(Self::Char(c)),
                    _ => None,
                }
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            Self::Escape => write!(f, "Esc"),
            Self::Delete => write!(f, "Del"),
        }
    }
}

/// Modifier keys for shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    /// Control key
    pub ctrl: bool,
    /// Shift key
    pub shift: bool,
    /// Alt key (Option on macOS)
    pub alt: bool,
    /// Command key (macOS)
    pub command: bool,
}

impl Modifiers {
    /// No modifiers
    pub const NONE: Self = Self { ctrl: false, shift: false, alt: false, command: false };
    /// Control only
    pub const CTRL: Self = Self { ctrl: true, shift: false, alt: false, command: false };
    /// Command only
    pub const COMMAND: Self = Self { ctrl: false, shift: false, alt: false, command: true };
    /// Control + Shift
    pub const CTRL_SHIFT: Self = Self { ctrl: true, shift: true, alt: false, command: false };
    /// Command + Shift
    pub const COMMAND_SHIFT: Self = Self { ctrl: false, shift: true, alt: false, command: true };

    /// Ctrl or Cmd held
    pub fn primary(&self) -> bool {
        self.ctrl || self.command
    }
}

/// Action a shortcut triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorAction {
    /// Undo the last edit
    Undo,
    /// Redo the last undone edit
    Redo,
    /// Switch gizmo to translate
    Translate,
    /// Switch gizmo to rotate
    Rotate,
    /// Switch gizmo to scale
    Scale,
    /// Clear the selection
    Deselect,
}

impl EditorAction {
    /// Stable command id
    pub fn id(&self) -> &'static str {
        match self {
            Self::Undo => "edit.undo",
            Self::Redo => "edit.redo",
            Self::Translate => "transform.translate",
            Self::Rotate => "transform.rotate",
            Self::Scale => "transform.scale",
            Self::Deselect => "edit.deselect",
        }
    }
}

/// A keyboard shortcut (key + modifiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shortcut {
    /// The main key
    pub key: Key,
    /// Ctrl or Cmd required
    pub primary: bool,
    /// Shift required
    pub shift: bool,
}

impl Shortcut {
    /// Create a new shortcut with no modifiers
    pub const fn new(key: Key) -> Self {
        Self { key, primary: false, shift: false }
    }

    /// Create a shortcut with the Ctrl/Cmd modifier
    pub const fn primary(key: Key) -> Self {
        Self { key, primary: true, shift: false }
    }

    /// Create a shortcut with Ctrl/Cmd+Shift modifiers
    pub const fn primary_shift(key: Key) -> Self {
        Self { key, primary: true, shift: true }
    }

    /// Shortcut matching a key press; `None` when Alt is held
    pub fn from_input(key: Key, modifiers: Modifiers) -> Option<Self> {
        if modifiers.alt {
            return None;
        }
        let key = match key {
            Key::Char(c) => Key::char(c),
            other => other,
        };
        Some(Self {
            key,
            primary: modifiers.primary(),
            shift: modifiers.shift,
        })
    }

    /// Parse a shortcut from a display string (e.g., "Ctrl+Z", "Cmd+Shift+Z", "W")
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let (key_part, modifier_parts) = parts.split_last()?;

        let mut modifiers = Modifiers::NONE;
        for part in modifier_parts {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "cmd" | "command" | "meta" => modifiers.command = true,
                "shift" => modifiers.shift = true,
                "alt" | "option" => modifiers.alt = true,
                _ => return None,
            }
        }

        Self::from_input(Key::parse(key_part)?, modifiers)
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.primary {
            write!(f, "Ctrl+")?;
        }
        if self.shift {
            write!(f, "Shift+")?;
        }
        write!(f, "{}", self.key)
    }
}

/// Registry of keyboard shortcuts
#[derive(Debug, Clone)]
pub struct ShortcutRegistry {
    bindings: HashMap<Shortcut, EditorAction>,
}

impl ShortcutRegistry {
    /// Create a new registry with default shortcuts
    pub fn new() -> Self {
        let mut registry = Self {
            bindings: HashMap::new(),
        };
        registry.register_defaults();
        registry
    }

    fn register_defaults(&mut self) {
        // Edit commands
        self.register(Shortcut::primary(Key::char('z')), EditorAction::Undo);
        self.register(Shortcut::primary_shift(Key::char('z')), EditorAction::Redo);
        self.register(Shortcut::primary(Key::char('y')), EditorAction::Redo);
        self.register(Shortcut::new(Key::Escape), EditorAction::Deselect);

        // Transform modes
        self.register(Shortcut::new(Key::char('w')), EditorAction::Translate);
        self.register(Shortcut::new(Key::char('e')), EditorAction::Rotate);
        self.register(Shortcut::new(Key::char('r')), EditorAction::Scale);
    }

    /// Bind a shortcut, replacing any previous binding
    pub fn register(&mut self, shortcut: Shortcut, action: EditorAction) {
        self.bindings.insert(shortcut, action);
    }

    /// Remove a binding
    pub fn unregister(&mut self, shortcut: &Shortcut) -> Option<EditorAction> {
        self.bindings.remove(shortcut)
    }

    /// Action bound to a key press, if any
    pub fn action_for(&self, key: Key, modifiers: Modifiers) -> Option<EditorAction> {
        let shortcut = Shortcut::from_input(key, modifiers)?;
        self.bindings.get(&shortcut).copied()
    }

    /// All shortcuts bound to an action
    pub fn shortcuts_for(&self, action: EditorAction) -> Vec<Shortcut> {
        let mut shortcuts: Vec<Shortcut> = self
            .bindings
            .iter()
            .filter(|(_, bound)| **bound == action)
            .map(|(shortcut, _)| *shortcut)
            .collect();
        shortcuts.sort_by_key(ToString::to_string);
        shortcuts
    }
}

impl Default for ShortcutRegistry {
    fn default() -> Self {
        Self::new()
    }
}
