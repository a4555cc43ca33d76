//! Keyboard shortcuts, resize handles and cursors.

use crate::foundation::core::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Character(char),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Delete,
    Backspace,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    /// Cmd on macOS.
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self::new(false, false, false);

    pub const fn new(ctrl: bool, meta: bool, shift: bool) -> Self {
        Self { ctrl, meta, shift }
    }

    pub const fn ctrl() -> Self {
        Self::new(true, false, false)
    }

    pub const fn shift() -> Self {
        Self::new(false, false, true)
    }

    /// Ctrl on Linux/Windows, Cmd on macOS.
    pub const fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Move by one step in `(dx, dy)`; `large` picks the Shift step.
    Nudge { dx: i8, dy: i8, large: bool },
    Delete,
    Duplicate,
    ToggleLock,
    Undo,
    Redo,
    ClearSelection,
}

impl ShortcutAction {
    /// Whether the action edits the selected overlay and so is refused when it is locked.
    pub fn mutates_selection(self) -> bool {
        matches!(self, Self::Nudge { .. } | Self::Delete | Self::Duplicate)
    }
}

pub fn resolve_shortcut(key: Key, modifiers: Modifiers) -> Option<ShortcutAction> {
    let large = modifiers.shift;
    let key = match key {
        Key::Character(c) => Key::Character(c.to_ascii_lowercase()),
        other => other,
    };
    match (key, modifiers.command(), modifiers.shift) {
        (Key::ArrowUp, false, _) => Some(ShortcutAction::Nudge { dx: 0, dy: -1, large }),
        (Key::ArrowDown, false, _) => Some(ShortcutAction::Nudge { dx: 0, dy: 1, large }),
        (Key::ArrowLeft, false, _) => Some(ShortcutAction::Nudge { dx: -1, dy: 0, large }),
        (Key::ArrowRight, false, _) => Some(ShortcutAction::Nudge { dx: 1, dy: 0, large }),
        (Key::Delete, false, false) | (Key::Backspace, false, false) => {
            Some(ShortcutAction::Delete)
        }
        (Key::Character('d'), true, false) => Some(ShortcutAction::Duplicate),
        (Key::Character('l'), true, false) => Some(ShortcutAction::ToggleLock),
        (Key::Character('z'), true, false) => Some(ShortcutAction::Undo),
        (Key::Character('z'), true, true) => Some(ShortcutAction::Redo),
        (Key::Character('y'), true, false) => Some(ShortcutAction::Redo),
        (Key::Escape, false, _) => Some(ShortcutAction::ClearSelection),
        _ => None,
    }
}

/// One of the eight resize handles on a selection box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

impl Handle {
    /// Corners first so they win where they overlap an edge's tolerance.
    pub const ALL: [Self; 8] = [
        Self::NorthWest,
        Self::NorthEast,
        Self::SouthEast,
        Self::SouthWest,
        Self::North,
        Self::East,
        Self::South,
        Self::West,
    ];

    pub fn position(self, r: Rect) -> Point {
        let cx = (r.x0 + r.x1) / 2.0;
        let cy = (r.y0 + r.y1) / 2.0;
        match self {
            Self::NorthWest => Point::new(r.x0, r.y0),
            Self::North => Point::new(cx, r.y0),
            Self::NorthEast => Point::new(r.x1, r.y0),
            Self::East => Point::new(r.x1, cy),
            Self::SouthEast => Point::new(r.x1, r.y1),
            Self::South => Point::new(cx, r.y1),
            Self::SouthWest => Point::new(r.x0, r.y1),
            Self::West => Point::new(r.x0, cy),
        }
    }

    /// Sign applied to a horizontal pointer delta to get the width change; 0 if unaffected.
    pub fn width_sign(self) -> f64 {
        match self {
            Self::East | Self::NorthEast | Self::SouthEast => 1.0,
            Self::West | Self::NorthWest | Self::SouthWest => -1.0,
            Self::North | Self::South => 0.0,
        }
    }

    /// Sign applied to a vertical pointer delta to get the height change; 0 if unaffected.
    pub fn height_sign(self) -> f64 {
        match self {
            Self::South | Self::SouthEast | Self::SouthWest => 1.0,
            Self::North | Self::NorthEast | Self::NorthWest => -1.0,
            Self::East | Self::West => 0.0,
        }
    }

    pub fn is_corner(self) -> bool {
        self.width_sign() != 0.0 && self.height_sign() != 0.0
    }

    pub fn cursor(self) -> Cursor {
        Cursor::Resize(self)
    }
}

/// Handle whose square hit area (half-extent `tolerance`) contains `p`.
pub fn handle_at(r: Rect, p: Point, tolerance: f64) -> Option<Handle> {
    Handle::ALL.into_iter().find(|h| {
        let c = h.position(r);
        (p.x - c.x).abs() <= tolerance && (p.y - c.y).abs() <= tolerance
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Move,
    Resize(Handle),
}

impl Cursor {
    /// CSS cursor keyword.
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Pointer => "pointer",
            Self::Move => "move",
            Self::Resize(Handle::North | Handle::South) => "ns-resize",
            Self::Resize(Handle::East | Handle::West) => "ew-resize",
            Self::Resize(Handle::NorthWest | Handle::SouthEast) => "nwse-resize",
            Self::Resize(Handle::NorthEast | Handle::SouthWest) => "nesw-resize",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/input.rs"]
mod tests;
