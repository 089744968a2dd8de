//! Undo/redo command system

mod command;

pub use command::{CellChange, CellEditCommand, Command, CommandHistory};
