//! Celeste-like 2D platformer
//!
//! Re-exports the crates that make up the game:
//! - [`core`] - level blueprints, inspector snapshots, tilesets, config
//! - [`animation`] - sprite sheet clips
//! - [`runtime`] - the simulation and `CelesteGamePlugin` (feature `runtime`)
//!
//! The map editor, the inspector and the tile extractor live in
//! `celeste_editor`.

pub use celeste_animation as animation;
pub use celeste_core as core;

#[cfg(feature = "runtime")]
pub use celeste_runtime as runtime;

pub mod prelude {
    pub use celeste_core::{
        EnemySpawn, GameConfig, InspectorSnapshot, LevelBlueprint, Palette, BLUEPRINT_FILE,
        ENEMY_SPAWNS_FILE, SNAPSHOT_FILE,
    };

    #[cfg(feature = "runtime")]
    pub use celeste_runtime::{CelesteGamePlugin, GameSession, GameState};
}
