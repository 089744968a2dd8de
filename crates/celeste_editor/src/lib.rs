//! Map editor, map inspector and tileset tools for the Celeste-like platformer
//!
//! - [`MapEditorPlugin`] - paint tiles and mark solid/water/doors/keys/enemies,
//!   saving `editor_blueprint.json`, `inspector_snapshot.json` and `enemy_spawns.json`
//! - [`MapInspectorPlugin`] - click tiles to build `inspector_snapshot.json`
//! - [`extract`] - slice a TSX tileset into one PNG per tile
//!
//! # Usage
//!
//! ```rust,ignore
//! use bevy::prelude::*;
//! use celeste_editor::MapEditorPlugin;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(MapEditorPlugin::new("assets/b.tsx"))
//!         .run();
//! }
//! ```

pub mod canvas;
pub mod commands;
mod data;
pub mod editor;
pub mod extract;
pub mod inspector;
pub mod map;
pub mod preferences;

pub use celeste_core;

pub use data::DataFiles;
pub use editor::{EditorDocument, MapEditorPlugin};
pub use inspector::{InspectorDocument, MapInspectorPlugin};
pub use map::{CellState, EditorMap};
