//! Game simulation and bevy plugin for the Celeste-like platformer
//!
//! The simulation (`Samurai`, `EnemyManager`, `GameSession`) is plain data
//! advanced with an explicit `dt` and an [`InputFrame`]. The bevy side only
//! samples input, draws the level with `bevy_ecs_tilemap`, mirrors the
//! simulation onto sprites and paints the egui HUD.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bevy::prelude::*;
//! use celeste_runtime::CelesteGamePlugin;
//!
//! App::new()
//!     .add_plugins(DefaultPlugins)
//!     .add_plugins(CelesteGamePlugin)
//!     .run();
//! ```

pub mod attack;
pub mod commands;
pub mod controller;
pub mod enemy;
mod error;
pub mod health;
pub mod hud;
pub mod input;
pub mod level;
mod plugin;
pub mod powerup;
pub mod render;
pub mod samurai;
pub mod session;

pub use enemy::{EnemyManager, EnemyRegistry};
pub use error::{EnemyError, LevelLoadError};
pub use level::LoadedLevel;
pub use plugin::{build_session, load_game_config, CelesteGamePlugin};
pub use samurai::Samurai;
pub use session::{GameSession, GameState, InputFrame};
