//! Designer-tunable runtime settings from `assets/game_config.json`

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::CoreError;

pub const GAME_CONFIG_PATH: &str = "assets/game_config.json";

const DEFAULT_TILES_WIDE: f32 = 28.0;
const DEFAULT_TILES_TALL: f32 = 16.0;
const DEFAULT_CAMERA_ZOOM: f32 = 1.0;

const DEFAULT_COLLIDER_WIDTH: f32 = 39.0;
const DEFAULT_COLLIDER_HEIGHT: f32 = 84.0;
const DEFAULT_COLLIDER_OFFSET_X: f32 = 27.0;
const DEFAULT_RENDER_OFFSET_Y: f32 = -20.0;

/// Camera framing in tiles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraConfig {
    pub tiles_wide: f32,
    pub tiles_tall: f32,
    pub zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            tiles_wide: DEFAULT_TILES_WIDE,
            tiles_tall: DEFAULT_TILES_TALL,
            zoom: DEFAULT_CAMERA_ZOOM,
        }
    }
}

/// Player collider and sprite placement, in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerConfig {
    pub collider_width: f32,
    pub collider_height: f32,
    pub collider_offset_x: f32,
    pub collider_offset_y: f32,
    pub render_offset_x: f32,
    pub render_offset_y: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            collider_width: DEFAULT_COLLIDER_WIDTH,
            collider_height: DEFAULT_COLLIDER_HEIGHT,
            collider_offset_x: DEFAULT_COLLIDER_OFFSET_X,
            collider_offset_y: 0.0,
            render_offset_x: 0.0,
            render_offset_y: DEFAULT_RENDER_OFFSET_Y,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(bevy::prelude::Resource))]
#[serde(default)]
pub struct GameConfig {
    pub camera: CameraConfig,
    pub player: PlayerConfig,
}

impl GameConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content)
    }

    pub fn load_from_str(json: &str) -> Result<Self, CoreError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Replace non-positive sizes with their defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.camera.tiles_wide <= 0.0 {
            self.camera.tiles_wide = defaults.camera.tiles_wide;
        }
        if self.camera.tiles_tall <= 0.0 {
            self.camera.tiles_tall = defaults.camera.tiles_tall;
        }
        if self.camera.zoom <= 0.0 {
            self.camera.zoom = defaults.camera.zoom;
        }
        if self.player.collider_width <= 0.0 {
            self.player.collider_width = defaults.player.collider_width;
        }
        if self.player.collider_height <= 0.0 {
            self.player.collider_height = defaults.player.collider_height;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = GameConfig::load_from_str(r#"{"camera":{"tilesWide":20}}"#).unwrap();
        assert_eq!(config.camera.tiles_wide, 20.0);
        assert_eq!(config.camera.tiles_tall, 16.0);
        assert_eq!(config.player, PlayerConfig::default());
    }

    #[test]
    fn test_non_positive_values_fall_back() {
        let json = r#"{
            "camera": {"tilesWide": 0, "tilesTall": -3, "zoom": 0},
            "player": {"colliderWidth": -1, "colliderHeight": 0, "colliderOffsetX": -4, "renderOffsetY": 6}
        }"#;
        let config = GameConfig::load_from_str(json).unwrap();
        assert_eq!(config.camera, CameraConfig::default());
        assert_eq!(config.player.collider_width, 39.0);
        assert_eq!(config.player.collider_height, 84.0);
        // Offsets may be negative
        assert_eq!(config.player.collider_offset_x, -4.0);
        assert_eq!(config.player.render_offset_y, 6.0);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(GameConfig::load_from_str("{camera:").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = GameConfig::load(dir.path().join("game_config.json")).unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
