//! Core data for the Celeste-like platformer
//!
//! This crate owns everything that lives on disk and is shared between the
//! game, the map editor and the map inspector:
//! - `LevelBlueprint` - the tile grid written by the editor (`editor_blueprint.json`)
//! - `InspectorSnapshot` - solid/water/door/enemy markup (`inspector_snapshot.json`)
//! - `EnemySpawn` - the flat spawn list (`enemy_spawns.json`)
//! - `LevelCollisionMap` - solid and water lookups used by the kinematic controller
//! - `TsxTileset` / `Palette` - TSX descriptors and the sliced tile images
//! - `GameConfig` - camera and player tuning (`assets/game_config.json`)
//! - `journal` - the gameplay event log (`logs/game.log`)
//!
//! Grid cells are addressed as `(row, col)` with row 0 at the top. World space
//! is y-up, so row `r` spans `(rows - r - 1) * tile_size` upwards.

mod collision;
mod config;
mod error;
mod files;
pub mod journal;
mod level;
mod palette;
mod snapshot;
mod spawn;
mod tileset;

pub use collision::LevelCollisionMap;
pub use config::{CameraConfig, GameConfig, PlayerConfig, GAME_CONFIG_PATH};
pub use error::CoreError;
pub use files::{absolute_path, locate_data_dir, locate_data_file, writable_data_path};
pub use level::{LevelBlueprint, TileBlueprint, DEFAULT_COLS, DEFAULT_ROWS};
pub use palette::{Palette, PaletteSource};
pub use snapshot::{parse_tile_refs, DoorRecord, EnemyPlacement, InspectorSnapshot, TileRef};
pub use spawn::{load_enemy_spawns, EnemySpawn};
pub use tileset::{TileRect, TilesetLayout, TsxTileset};

/// Source pixels per tile side
pub const TILE_SIZE: u32 = 8;
/// Upscale factor from source pixels to world units
pub const TILE_SCALE: u32 = 4;
/// World units per tile side
pub const TILE_WORLD_SIZE: f32 = (TILE_SIZE * TILE_SCALE) as f32;

/// Maximum number of animation frames a single cell may cycle through
pub const MAX_TILE_FRAMES: usize = 3;
/// Frame duration used for freshly painted cells
pub const DEFAULT_FRAME_DURATION: f32 = 0.15;

pub const BLUEPRINT_FILE: &str = "editor_blueprint.json";
pub const SNAPSHOT_FILE: &str = "inspector_snapshot.json";
pub const ENEMY_SPAWNS_FILE: &str = "enemy_spawns.json";

/// Tileset descriptor opened when no path is given
pub const DEFAULT_TSX_PATH: &str = "assets/b.tsx";
/// Directory holding loose tile PNGs or a `tilemap.png` atlas
pub const TILESET_FALLBACK_DIR: &str = "assets/newTileSetManara";
