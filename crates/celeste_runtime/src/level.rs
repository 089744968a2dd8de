//! Level loading and the tilemap that draws it

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy_ecs_tilemap::prelude::*;
use celeste_core::{
    locate_data_dir, locate_data_file, CoreError, InspectorSnapshot, LevelBlueprint,
    LevelCollisionMap, Palette, TileBlueprint, BLUEPRINT_FILE, DEFAULT_TSX_PATH, SNAPSHOT_FILE,
    TILESET_FALLBACK_DIR, TILE_WORLD_SIZE,
};
use std::path::Path;
use std::sync::Arc;

use crate::error::LevelLoadError;
use crate::session::GameSession;

/// Everything read from disk to build the level
#[derive(Resource)]
pub struct LoadedLevel {
    pub blueprint: LevelBlueprint,
    pub snapshot: Option<InspectorSnapshot>,
    pub collision: Arc<LevelCollisionMap>,
    pub palette: Palette,
    pub tile_size: f32,
}

impl LoadedLevel {
    /// Load blueprint, snapshot and palette.
    ///
    /// Missing blueprint or snapshot fall back (with a warning); a missing
    /// palette is an error.
    pub fn load(
        blueprint_path: Option<&Path>,
        snapshot_path: Option<&Path>,
        tsx: Option<&Path>,
        fallback_dir: &Path,
    ) -> Result<(Self, Vec<String>), LevelLoadError> {
        let mut warnings = Vec::new();
        let (blueprint, warning) = LevelBlueprint::load_or_default(blueprint_path);
        warnings.extend(warning);

        let snapshot = match snapshot_path.map(InspectorSnapshot::load) {
            Some(Ok(snapshot)) => Some(snapshot),
            Some(Err(e)) => {
                warnings.push(format!("Failed to load {}: {}", SNAPSHOT_FILE, e));
                None
            }
            None => None,
        };

        let palette = match Palette::load_default(tsx, fallback_dir) {
            Ok((palette, rejected)) => {
                warnings.extend(rejected);
                palette
            }
            Err(CoreError::EmptyPalette) => {
                let tried = match tsx {
                    Some(tsx) => format!("{} and {}", tsx.display(), fallback_dir.display()),
                    None => fallback_dir.display().to_string(),
                };
                return Err(LevelLoadError::MissingPalette(tried));
            }
            Err(e) => return Err(e.into()),
        };

        let tile_size = TILE_WORLD_SIZE;
        let collision = Arc::new(LevelCollisionMap::new(
            &blueprint,
            snapshot.as_ref(),
            tile_size,
        ));
        Ok((
            Self {
                blueprint,
                snapshot,
                collision,
                palette,
                tile_size,
            },
            warnings,
        ))
    }

    /// Load using the standard data file lookup
    pub fn load_default() -> Result<(Self, Vec<String>), LevelLoadError> {
        let blueprint = locate_data_file(BLUEPRINT_FILE);
        let snapshot = locate_data_file(SNAPSHOT_FILE);
        let tsx = locate_data_file(DEFAULT_TSX_PATH);
        let fallback = locate_data_dir(TILESET_FALLBACK_DIR)
            .unwrap_or_else(|| TILESET_FALLBACK_DIR.into());
        Self::load(
            blueprint.as_deref(),
            snapshot.as_deref(),
            tsx.as_deref(),
            &fallback,
        )
    }

    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.collision.world_width(), self.collision.world_height())
    }
}

/// Pack the palette into one texture for the tilemap
pub fn palette_texture(palette: &Palette) -> Image {
    let atlas = palette.atlas_image();
    let (width, height) = atlas.dimensions();
    Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        atlas.into_raw(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}

/// Tile position of a grid cell; tilemap rows count from the bottom
pub fn cell_tile_pos(row: usize, col: usize, rows: usize) -> TilePos {
    TilePos {
        x: col as u32,
        y: (rows - 1 - row) as u32,
    }
}

/// Cell cycling through several palette indices
#[derive(Component, Debug, Clone)]
pub struct AnimatedCell(pub TileBlueprint);

#[derive(Component)]
pub struct LevelTilemap;

/// Spawn the tilemap for the loaded level
pub fn spawn_tilemap(
    mut commands: Commands,
    level: Res<LoadedLevel>,
    mut images: ResMut<Assets<Image>>,
) {
    let blueprint = &level.blueprint;
    let palette = &level.palette;
    let texture = images.add(palette_texture(palette));

    let map_size = TilemapSize {
        x: blueprint.cols as u32,
        y: blueprint.rows as u32,
    };
    let tile_size = TilemapTileSize {
        x: palette.tile_width as f32,
        y: palette.tile_height as f32,
    };
    let grid_size: TilemapGridSize = tile_size.into();
    let scale = Vec3::new(
        level.tile_size / tile_size.x,
        level.tile_size / tile_size.y,
        1.0,
    );

    let tilemap_entity = commands.spawn_empty().id();
    let mut storage = TileStorage::empty(map_size);
    let palette_len = palette.len() as u32;
    let mut skipped = 0;

    for (row, col, cell) in blueprint.filled_cells() {
        let Some(first) = cell.frame_at(0.0).filter(|i| *i < palette_len) else {
            skipped += 1;
            continue;
        };
        let position = cell_tile_pos(row, col, blueprint.rows);
        let mut tile = commands.spawn(TileBundle {
            position,
            tilemap_id: TilemapId(tilemap_entity),
            texture_index: TileTextureIndex(first),
            ..default()
        });
        if cell.is_animated() {
            tile.insert(AnimatedCell(cell.clone()));
        }
        storage.set(&position, tile.id());
    }
    if skipped > 0 {
        warn!("{} cells reference tiles outside the palette", skipped);
    }

    commands.entity(tilemap_entity).insert((
        TilemapBundle {
            grid_size,
            map_type: TilemapType::Square,
            size: map_size,
            storage,
            texture: TilemapTexture::Single(texture),
            tile_size,
            anchor: TilemapAnchor::BottomLeft,
            transform: Transform::from_scale(scale),
            ..default()
        },
        LevelTilemap,
    ));
    info!(
        "Level tilemap {}x{} spawned from {} palette tiles ({})",
        blueprint.rows,
        blueprint.cols,
        palette.len(),
        palette.source
    );
}

/// Cycle animated cells on the session clock
pub fn animate_cells(
    session: Res<GameSession>,
    mut tiles: Query<(&AnimatedCell, &mut TileTextureIndex)>,
) {
    let time = session.elapsed();
    for (cell, mut index) in tiles.iter_mut() {
        if let Some(frame) = cell.0.frame_at(time) {
            if index.0 != frame {
                index.0 = frame;
            }
        }
    }
}
