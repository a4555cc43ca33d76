use std::collections::VecDeque;

use crate::foundation::core::OverlayKey;
use crate::model::overlay::Overlay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Add,
    Duplicate,
    Move,
    Resize,
    Nudge,
    Edit,
    Delete,
}

/// One undoable change to a single overlay.
///
/// `before == None` records a creation and `after == None` a deletion.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub kind: CommandKind,
    pub key: OverlayKey,
    pub before: Option<Overlay>,
    pub after: Option<Overlay>,
}

impl Command {
    pub fn new(
        kind: CommandKind,
        key: OverlayKey,
        before: Option<Overlay>,
        after: Option<Overlay>,
    ) -> Self {
        Self {
            kind,
            key,
            before,
            after,
        }
    }
}

/// Bounded undo/redo log of overlay snapshots.
///
/// Undo and redo are two-step: read the command with [`History::peek_undo`], apply it, and
/// only then call [`History::commit_undo`]. A command that could not be applied stays put.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    undo_stack: VecDeque<Command>,
    redo_stack: Vec<Command>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record a command; clears the redo side and drops the oldest entry past the limit.
    pub fn push(&mut self, command: Command) {
        if command.before == command.after {
            return;
        }
        self.undo_stack.push_back(command);
        self.redo_stack.clear();
        while self.undo_stack.len() > self.limit {
            self.undo_stack.pop_front();
        }
    }

    pub fn peek_undo(&self) -> Option<&Command> {
        self.undo_stack.back()
    }

    pub fn peek_redo(&self) -> Option<&Command> {
        self.redo_stack.last()
    }

    pub fn commit_undo(&mut self) {
        if let Some(command) = self.undo_stack.pop_back() {
            self.redo_stack.push(command);
        }
    }

    pub fn commit_redo(&mut self) {
        if let Some(command) = self.redo_stack.pop() {
            self.undo_stack.push_back(command);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/history.rs"]
mod tests;
