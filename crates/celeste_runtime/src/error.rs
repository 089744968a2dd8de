//! Runtime error types

use celeste_core::CoreError;
use thiserror::Error;

/// Failure while preparing the level for play
#[derive(Debug, Error)]
pub enum LevelLoadError {
    #[error("Failed to load level data: {0}")]
    Core(#[from] CoreError),

    #[error("No tileset palette could be loaded (tried {0})")]
    MissingPalette(String),
}

/// Invalid enemy definition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnemyError {
    #[error("Enemy definition {0} must include an IDLE animation")]
    MissingIdle(String),
}
