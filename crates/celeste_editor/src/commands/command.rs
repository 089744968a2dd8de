//! Command pattern for undo/redo

use bevy::prelude::*;

use crate::map::{CellState, EditorMap};

/// A command that can be undone/redone
pub trait Command: Send + Sync {
    /// Execute the command (do/redo)
    fn execute(&self, map: &mut EditorMap);
    /// Undo the command
    fn undo(&self, map: &mut EditorMap);
    /// Get a description of the command
    fn description(&self) -> &str;
}

/// Before and after state of one cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellChange {
    pub row: usize,
    pub col: usize,
    pub before: CellState,
    pub after: CellState,
}

/// Command for cell edits (painting, markup toggles, clearing)
pub struct CellEditCommand {
    pub changes: Vec<CellChange>,
    description: String,
}

impl CellEditCommand {
    /// Keeps only the changes that actually differ
    pub fn new(changes: Vec<CellChange>, description: impl Into<String>) -> Self {
        Self {
            changes: changes
                .into_iter()
                .filter(|c| c.before != c.after)
                .collect(),
            description: description.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl Command for CellEditCommand {
    fn execute(&self, map: &mut EditorMap) {
        for change in &self.changes {
            map.set_cell_state(change.row, change.col, &change.after);
        }
    }

    fn undo(&self, map: &mut EditorMap) {
        for change in self.changes.iter().rev() {
            map.set_cell_state(change.row, change.col, &change.before);
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Stores command history for undo/redo
#[derive(Resource, Default)]
pub struct CommandHistory {
    /// Stack of commands that have been executed
    undo_stack: Vec<Box<dyn Command>>,
    /// Stack of commands that have been undone
    redo_stack: Vec<Box<dyn Command>>,
}

impl CommandHistory {
    /// Execute a command and add it to history
    pub fn execute(&mut self, command: Box<dyn Command>, map: &mut EditorMap) {
        command.execute(map);
        self.undo_stack.push(command);
        self.redo_stack.clear();
    }

    /// Undo the last command; returns its description
    pub fn undo(&mut self, map: &mut EditorMap) -> Option<String> {
        let command = self.undo_stack.pop()?;
        command.undo(map);
        let description = command.description().to_string();
        self.redo_stack.push(command);
        Some(description)
    }

    /// Redo the last undone command; returns its description
    pub fn redo(&mut self, map: &mut EditorMap) -> Option<String> {
        let command = self.redo_stack.pop()?;
        command.execute(map);
        let description = command.description().to_string();
        self.undo_stack.push(command);
        Some(description)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|c| c.description())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.description())
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Push a command whose changes have already been applied
    pub fn push_undo(&mut self, command: Box<dyn Command>) {
        self.undo_stack.push(command);
        self.redo_stack.clear();
    }
}
