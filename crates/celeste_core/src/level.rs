//! Tile grid authored in the map editor

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{CoreError, BLUEPRINT_FILE, DEFAULT_FRAME_DURATION, MAX_TILE_FRAMES};

/// Rows of the built-in level used when no blueprint is available
pub const DEFAULT_ROWS: usize = 18;
/// Columns of the built-in level used when no blueprint is available
pub const DEFAULT_COLS: usize = 32;

/// One grid cell: up to three palette indices cycled at `frame_duration`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileBlueprint {
    #[serde(default)]
    pub frames: Vec<u32>,
    #[serde(default = "default_frame_duration")]
    pub frame_duration: f32,
}

fn default_frame_duration() -> f32 {
    DEFAULT_FRAME_DURATION
}

impl Default for TileBlueprint {
    fn default() -> Self {
        Self::air()
    }
}

impl TileBlueprint {
    /// An empty cell
    pub fn air() -> Self {
        Self {
            frames: Vec::new(),
            frame_duration: DEFAULT_FRAME_DURATION,
        }
    }

    /// A single static tile
    pub fn single(index: u32) -> Self {
        Self {
            frames: vec![index],
            frame_duration: DEFAULT_FRAME_DURATION,
        }
    }

    /// `count` consecutive palette indices starting at `start`, capped at three frames
    pub fn contiguous(start: u32, count: usize, frame_duration: f32) -> Self {
        let count = count.clamp(1, MAX_TILE_FRAMES) as u32;
        Self {
            frames: (0..count).map_while(|i| start.checked_add(i)).collect(),
            frame_duration,
        }
    }

    pub fn is_air(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    /// Palette index shown at `time` seconds, `None` for air
    pub fn frame_at(&self, time: f32) -> Option<u32> {
        if self.frames.is_empty() {
            return None;
        }
        let duration = self.frame_duration.max(0.01);
        let step = (time / duration).floor().max(0.0) as usize;
        self.frames.get(step % self.frames.len()).copied()
    }

    /// Append a frame; returns `false` when the cell already cycles three frames
    pub fn push_frame(&mut self, index: u32, frame_duration: f32) -> bool {
        if self.frames.len() >= MAX_TILE_FRAMES {
            return false;
        }
        self.frames.push(index);
        self.frame_duration = frame_duration;
        true
    }
}

/// A `rows x cols` grid of tiles, row 0 at the top
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelBlueprint {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Vec<TileBlueprint>>,
}

impl Default for LevelBlueprint {
    fn default() -> Self {
        let mut level = Self::new(DEFAULT_ROWS, DEFAULT_COLS);
        for row in DEFAULT_ROWS - 2..DEFAULT_ROWS {
            for col in 0..DEFAULT_COLS {
                level.cells[row][col] = TileBlueprint::single(0);
            }
        }
        level
    }
}

impl LevelBlueprint {
    /// All-air grid
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![vec![TileBlueprint::air(); cols]; rows],
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&TileBlueprint> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut TileBlueprint> {
        self.cells.get_mut(row).and_then(|r| r.get_mut(col))
    }

    /// Replace a cell; out-of-range coordinates return `None`
    pub fn set(&mut self, row: usize, col: usize, tile: TileBlueprint) -> Option<TileBlueprint> {
        self.get_mut(row, col)
            .map(|cell| std::mem::replace(cell, tile))
    }

    /// Turn every cell into air
    pub fn clear(&mut self) {
        for row in &mut self.cells {
            row.fill(TileBlueprint::air());
        }
    }

    /// Iterate non-air cells as `(row, col, tile)`
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize, &TileBlueprint)> {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, tile)| !tile.is_air())
                .map(move |(col, tile)| (row, col, tile))
        })
    }

    /// Largest palette index referenced by any cell
    pub fn max_tile_index(&self) -> Option<u32> {
        self.filled_cells()
            .flat_map(|(_, _, tile)| tile.frames.iter().copied())
            .max()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content)
    }

    /// Frame lists longer than [`MAX_TILE_FRAMES`] are cut down
    pub fn load_from_str(json: &str) -> Result<Self, CoreError> {
        let mut level: Self = serde_json::from_str(json)?;
        level.validate()?;
        for tile in level.cells.iter_mut().flatten() {
            tile.frames.truncate(MAX_TILE_FRAMES);
        }
        Ok(level)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load `path`, falling back to the built-in level.
    ///
    /// The second value explains why the fallback was used.
    pub fn load_or_default(path: Option<&Path>) -> (Self, Option<String>) {
        let Some(path) = path else {
            return (
                Self::default(),
                Some(format!("{} not found, using the default level", BLUEPRINT_FILE)),
            );
        };
        match Self::load(path) {
            Ok(level) => (level, None),
            Err(e) => (
                Self::default(),
                Some(format!(
                    "Failed to load {}: {}; using the default level",
                    path.display(),
                    e
                )),
            ),
        }
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(CoreError::InvalidFormat(format!(
                "blueprint must have at least one row and column (got {}x{})",
                self.rows, self.cols
            )));
        }
        if self.cells.len() != self.rows {
            return Err(CoreError::InvalidFormat(format!(
                "expected {} rows of cells, found {}",
                self.rows,
                self.cells.len()
            )));
        }
        if let Some((row, cells)) = self
            .cells
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != self.cols)
        {
            return Err(CoreError::InvalidFormat(format!(
                "row {} has {} cells, expected {}",
                row,
                cells.len(),
                self.cols
            )));
        }
        Ok(())
    }

    /// Plain-text listing of every non-air cell, used by the editor dump key
    pub fn describe(&self) -> String {
        let mut out = format!("LevelBlueprint {}x{}\n", self.rows, self.cols);
        for (row, col, tile) in self.filled_cells() {
            out.push_str(&format!(
                "  ({}, {}) frames={:?} duration={:.2}\n",
                row, col, tile.frames, tile.frame_duration
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_at_cycles() {
        let tile = TileBlueprint::contiguous(4, 3, 0.5);
        assert_eq!(tile.frames, vec![4, 5, 6]);
        assert_eq!(tile.frame_at(0.0), Some(4));
        assert_eq!(tile.frame_at(0.6), Some(5));
        assert_eq!(tile.frame_at(1.2), Some(6));
        assert_eq!(tile.frame_at(1.6), Some(4));
        assert_eq!(TileBlueprint::air().frame_at(3.0), None);
    }

    #[test]
    fn test_frame_duration_floor() {
        let tile = TileBlueprint {
            frames: vec![1, 2],
            frame_duration: 0.0,
        };
        // Clamped to 0.01s per frame
        assert_eq!(tile.frame_at(0.015), Some(2));
    }

    #[test]
    fn test_contiguous_caps_frames() {
        assert_eq!(TileBlueprint::contiguous(0, 9, 0.1).frames.len(), 3);
        assert_eq!(TileBlueprint::contiguous(7, 0, 0.1).frames, vec![7]);
    }

    #[test]
    fn test_contiguous_near_index_limit() {
        assert_eq!(
            TileBlueprint::contiguous(u32::MAX - 1, 3, 0.1).frames,
            vec![u32::MAX - 1, u32::MAX]
        );
        assert_eq!(TileBlueprint::contiguous(u32::MAX, 2, 0.1).frames, vec![u32::MAX]);
    }

    #[test]
    fn test_load_truncates_long_frame_lists() {
        let json = r#"{"rows":1,"cols":1,"cells":[[{"frames":[1,2,3,4,5],"frame_duration":0.2}]]}"#;
        let level = LevelBlueprint::load_from_str(json).unwrap();
        assert_eq!(level.get(0, 0).unwrap().frames, vec![1, 2, 3]);
    }

    #[test]
    fn test_push_frame_limit() {
        let mut tile = TileBlueprint::single(1);
        assert!(tile.push_frame(2, 0.2));
        assert!(tile.push_frame(3, 0.2));
        assert!(!tile.push_frame(4, 0.2));
        assert_eq!(tile.frames, vec![1, 2, 3]);
    }

    #[test]
    fn test_set_out_of_range() {
        let mut level = LevelBlueprint::new(2, 3);
        assert!(level.set(1, 2, TileBlueprint::single(5)).is_some());
        assert!(level.set(2, 0, TileBlueprint::single(5)).is_none());
        assert_eq!(level.get(1, 2).and_then(|t| t.frame_at(0.0)), Some(5));
        assert_eq!(level.max_tile_index(), Some(5));
    }

    #[test]
    fn test_load_rejects_ragged_rows() {
        let json = r#"{"rows":2,"cols":2,"cells":[[{"frames":[]},{"frames":[1]}],[{"frames":[]}]]}"#;
        let err = LevelBlueprint::load_from_str(json).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFormat(_)));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("editor_blueprint.json");

        let mut level = LevelBlueprint::new(3, 4);
        level.set(0, 3, TileBlueprint::contiguous(10, 2, 0.25));
        level.save(&path).unwrap();

        let loaded = LevelBlueprint::load(&path).unwrap();
        assert_eq!(loaded, level);
    }

    #[test]
    fn test_default_level_has_floor() {
        let level = LevelBlueprint::default();
        assert_eq!(level.rows, DEFAULT_ROWS);
        assert!(level.get(DEFAULT_ROWS - 1, 0).is_some_and(|t| !t.is_air()));
        assert!(level.get(0, 0).is_some_and(TileBlueprint::is_air));
    }

    #[test]
    fn test_clear_and_describe() {
        let mut level = LevelBlueprint::default();
        level.clear();
        assert_eq!(level.filled_cells().count(), 0);
        assert_eq!(level.describe(), "LevelBlueprint 18x32\n");
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let (level, warning) = LevelBlueprint::load_or_default(None);
        assert_eq!(level, LevelBlueprint::default());
        assert!(warning.is_some());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor_blueprint.json");
        std::fs::write(&path, "{not json").unwrap();
        let (level, warning) = LevelBlueprint::load_or_default(Some(&path));
        assert_eq!(level.rows, DEFAULT_ROWS);
        assert!(warning.unwrap().contains("default level"));

        LevelBlueprint::new(2, 2).save(&path).unwrap();
        let (level, warning) = LevelBlueprint::load_or_default(Some(&path));
        assert_eq!(level.rows, 2);
        assert!(warning.is_none());
    }
}
