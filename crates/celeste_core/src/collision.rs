//! Solid and water lookups in world space

use crate::{InspectorSnapshot, LevelBlueprint, TILE_WORLD_SIZE};

/// Per-cell solid and water masks for a level
///
/// Anything outside the grid counts as solid so the player cannot leave the
/// level through its edges.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "bevy", derive(bevy::prelude::Resource))]
pub struct LevelCollisionMap {
    rows: usize,
    cols: usize,
    tile_size: f32,
    solid: Vec<bool>,
    water: Vec<bool>,
    from_snapshot: bool,
}

impl LevelCollisionMap {
    /// Build masks for `blueprint`.
    ///
    /// The snapshot's solid list is used when it has entries; otherwise every
    /// painted cell is solid. Water always comes from the snapshot.
    pub fn new(
        blueprint: &LevelBlueprint,
        snapshot: Option<&InspectorSnapshot>,
        tile_size: f32,
    ) -> Self {
        let rows = blueprint.rows;
        let cols = blueprint.cols;
        let mut map = Self {
            rows,
            cols,
            tile_size: if tile_size > 0.0 {
                tile_size
            } else {
                TILE_WORLD_SIZE
            },
            solid: vec![false; rows * cols],
            water: vec![false; rows * cols],
            from_snapshot: false,
        };

        match snapshot.filter(|s| !s.solid.is_empty()) {
            Some(snapshot) => {
                for tile in &snapshot.solid {
                    map.mark(tile.row, tile.col, true);
                }
                map.from_snapshot = true;
            }
            None => {
                for (row, col, _) in blueprint.filled_cells() {
                    map.mark(row, col, true);
                }
            }
        }
        if let Some(snapshot) = snapshot {
            for tile in &snapshot.water {
                if tile.row < rows && tile.col < cols {
                    map.water[tile.row * cols + tile.col] = true;
                }
            }
        }
        map
    }

    fn mark(&mut self, row: usize, col: usize, solid: bool) {
        if row < self.rows && col < self.cols {
            self.solid[row * self.cols + col] = solid;
        }
    }

    /// Whether the solid mask came from the inspector snapshot
    pub fn from_snapshot(&self) -> bool {
        self.from_snapshot
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Level width in world units
    pub fn world_width(&self) -> f32 {
        self.cols as f32 * self.tile_size
    }

    /// Level height in world units
    pub fn world_height(&self) -> f32 {
        self.rows as f32 * self.tile_size
    }

    pub fn is_solid(&self, row: i32, col: i32) -> bool {
        if row < 0 || col < 0 || row as usize >= self.rows || col as usize >= self.cols {
            return true;
        }
        self.solid[row as usize * self.cols + col as usize]
    }

    pub fn is_water(&self, row: i32, col: i32) -> bool {
        if row < 0 || col < 0 || row as usize >= self.rows || col as usize >= self.cols {
            return false;
        }
        self.water[row as usize * self.cols + col as usize]
    }

    pub fn world_to_col(&self, x: f32) -> i32 {
        (x / self.tile_size).floor() as i32
    }

    pub fn world_to_row(&self, y: f32) -> i32 {
        let from_bottom = (y / self.tile_size).floor() as i32;
        self.rows as i32 - from_bottom - 1
    }

    pub fn col_left(&self, col: i32) -> f32 {
        col as f32 * self.tile_size
    }

    pub fn col_right(&self, col: i32) -> f32 {
        self.col_left(col) + self.tile_size
    }

    pub fn row_bottom(&self, row: i32) -> f32 {
        (self.rows as i32 - row - 1) as f32 * self.tile_size
    }

    pub fn row_top(&self, row: i32) -> f32 {
        self.row_bottom(row) + self.tile_size
    }

    /// True when any water cell intersects the box
    pub fn overlaps_water(&self, left: f32, bottom: f32, right: f32, top: f32) -> bool {
        let (c0, c1) = (self.world_to_col(left), self.world_to_col(right));
        let (r0, r1) = (self.world_to_row(top), self.world_to_row(bottom));
        (r0..=r1).any(|row| (c0..=c1).any(|col| self.is_water(row, col)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TileBlueprint, TileRef};

    fn blueprint() -> LevelBlueprint {
        let mut level = LevelBlueprint::new(4, 5);
        level.set(3, 0, TileBlueprint::single(1));
        level.set(3, 1, TileBlueprint::single(1));
        level
    }

    #[test]
    fn test_outside_grid_is_solid() {
        let map = LevelCollisionMap::new(&blueprint(), None, 32.0);
        assert!(map.is_solid(-1, 0));
        assert!(map.is_solid(0, -1));
        assert!(map.is_solid(4, 0));
        assert!(map.is_solid(0, 5));
        assert!(!map.is_solid(0, 0));
        assert!(!map.is_water(-1, 0));
    }

    #[test]
    fn test_blueprint_fallback() {
        let map = LevelCollisionMap::new(&blueprint(), None, 32.0);
        assert!(!map.from_snapshot());
        assert!(map.is_solid(3, 0));
        assert!(map.is_solid(3, 1));
        assert!(!map.is_solid(3, 2));
    }

    #[test]
    fn test_snapshot_overrides_blueprint() {
        let snapshot = InspectorSnapshot {
            solid: vec![TileRef::new(2, 4), TileRef::new(40, 40)],
            water: vec![TileRef::new(1, 1)],
            ..Default::default()
        };
        let map = LevelCollisionMap::new(&blueprint(), Some(&snapshot), 32.0);
        assert!(map.from_snapshot());
        assert!(map.is_solid(2, 4));
        assert!(!map.is_solid(3, 0));
        assert!(map.is_water(1, 1));
    }

    #[test]
    fn test_world_conversions() {
        let map = LevelCollisionMap::new(&blueprint(), None, 32.0);
        assert_eq!(map.world_to_col(0.0), 0);
        assert_eq!(map.world_to_col(63.9), 1);
        assert_eq!(map.world_to_col(-0.5), -1);
        // Row 3 is the bottom row
        assert_eq!(map.world_to_row(10.0), 3);
        assert_eq!(map.world_to_row(127.0), 0);
        assert_eq!(map.row_bottom(3), 0.0);
        assert_eq!(map.row_top(0), 128.0);
        assert_eq!(map.col_left(2), 64.0);
        assert_eq!(map.world_width(), 160.0);
    }

    #[test]
    fn test_overlaps_water() {
        let snapshot = InspectorSnapshot {
            water: vec![TileRef::new(2, 2)],
            ..Default::default()
        };
        let map = LevelCollisionMap::new(&blueprint(), Some(&snapshot), 32.0);
        // Row 2 spans y 32..64, col 2 spans x 64..96
        assert!(map.overlaps_water(70.0, 40.0, 80.0, 50.0));
        assert!(map.overlaps_water(50.0, 20.0, 70.0, 40.0));
        assert!(!map.overlaps_water(0.0, 0.0, 20.0, 20.0));
    }

    #[test]
    fn test_non_positive_tile_size_defaults() {
        let map = LevelCollisionMap::new(&blueprint(), None, 0.0);
        assert_eq!(map.tile_size(), TILE_WORLD_SIZE);
    }
}
