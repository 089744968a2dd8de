//! The level being edited and every edit the editor can make

use bevy::prelude::*;
use celeste_core::{
    EnemySpawn, InspectorSnapshot, LevelBlueprint, Palette, TileBlueprint, TileRef, BLUEPRINT_FILE,
    DEFAULT_FRAME_DURATION, ENEMY_SPAWNS_FILE, MAX_TILE_FRAMES, SNAPSHOT_FILE,
    TILESET_FALLBACK_DIR,
};
use std::path::{Path, PathBuf};

use crate::commands::{CellChange, CellEditCommand, CommandHistory};
use crate::data::DataFiles;
use crate::map::{CellState, EditorMap, MAX_DOOR_CHANNEL};

/// Enemy ids in the order the cycle key walks through them
pub const ENEMY_TYPES: [&str; 3] = ["deathBoss", "redDeon", "skeletonEnemie"];

pub const MIN_FRAME_DURATION: f32 = 0.05;
pub const MAX_FRAME_DURATION: f32 = 0.5;
pub const FRAME_DURATION_STEP: f32 = 0.02;

/// Seconds a status banner stays visible
pub const STATUS_DURATION: f32 = 2.5;

/// Outcome of [`EditorDocument::save_all`], one flag per file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    pub blueprint: bool,
    pub snapshot: bool,
    pub enemies: bool,
}

impl SaveReport {
    pub fn all_ok(&self) -> bool {
        self.blueprint && self.snapshot && self.enemies
    }
}

#[derive(Debug, Clone)]
struct StatusBanner {
    message: String,
    remaining: f32,
}

/// Editor state: the map, its undo history, the palette and the brush
#[derive(Resource)]
pub struct EditorDocument {
    pub map: EditorMap,
    pub history: CommandHistory,
    pub palette: Option<Palette>,
    pub tsx_path: PathBuf,
    pub selected_cell: Option<TileRef>,
    /// `None` paints nothing (air)
    pub selected_tile: Option<u32>,
    pub door_channel: u32,
    pub brush_frames: usize,
    pub frame_duration: f32,
    palette_revision: u64,
    status: Option<StatusBanner>,
    files: DataFiles,
}

impl EditorDocument {
    pub fn new(map: EditorMap, tsx_path: impl Into<PathBuf>, files: DataFiles) -> Self {
        Self {
            map,
            history: CommandHistory::default(),
            palette: None,
            tsx_path: tsx_path.into(),
            selected_cell: None,
            selected_tile: None,
            door_channel: 1,
            brush_frames: 1,
            frame_duration: DEFAULT_FRAME_DURATION,
            palette_revision: 0,
            status: None,
            files,
        }
    }

    /// Load blueprint, snapshot, enemy spawns and tileset, in that order.
    ///
    /// Missing or broken files never fail the editor; the returned warnings
    /// say what was skipped.
    pub fn load(tsx_path: impl Into<PathBuf>, files: DataFiles) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();

        let (blueprint, fallback) =
            LevelBlueprint::load_or_default(files.existing(BLUEPRINT_FILE).as_deref());
        warnings.extend(fallback);
        let mut map = EditorMap::new(blueprint);

        let mut max_channel = 0;
        if let Some(path) = files.existing(SNAPSHOT_FILE) {
            match InspectorSnapshot::load(&path) {
                Ok(snapshot) => max_channel = map.apply_snapshot(&snapshot),
                Err(e) => warnings.push(format!("Failed to parse {}: {}", path.display(), e)),
            }
        }
        if let Some(path) = files.existing(ENEMY_SPAWNS_FILE) {
            match EnemySpawn::load_list(&path) {
                Ok(spawns) => map.apply_spawns(&spawns),
                Err(e) => warnings.push(format!("Failed to parse {}: {}", path.display(), e)),
            }
        }

        let tsx_path = tsx_path.into();
        let mut document = Self::new(map, tsx_path.clone(), files);
        document.door_channel = max_channel.max(1);
        match document.load_tileset(&tsx_path) {
            Ok(rejected) => warnings.extend(rejected),
            Err(e) => warnings.push(format!(
                "Failed to load tileset from {}: {}",
                tsx_path.display(),
                e
            )),
        }
        (document, warnings)
    }

    /// Replace the palette with the one from `tsx`, falling back to the tile directory.
    ///
    /// On error the current palette is kept.
    pub fn load_tileset(&mut self, tsx: &Path) -> Result<Vec<String>, celeste_core::CoreError> {
        let fallback = self.files.directory(TILESET_FALLBACK_DIR);
        let (palette, rejected) = Palette::load_default(Some(tsx), &fallback)?;
        info!(
            "Palette loaded from {} ({} tiles)",
            palette.source,
            palette.len()
        );
        self.palette = Some(palette);
        self.tsx_path = tsx.to_path_buf();
        self.palette_revision += 1;
        if self
            .selected_tile
            .is_some_and(|i| i as usize >= self.palette_len())
        {
            self.selected_tile = None;
        }
        self.brush_frames = self.clamp_frames(self.brush_frames);
        Ok(rejected)
    }

    pub fn palette_len(&self) -> usize {
        self.palette.as_ref().map_or(0, Palette::len)
    }

    /// Bumped whenever the palette is replaced
    pub fn palette_revision(&self) -> u64 {
        self.palette_revision
    }

    /// Select a cell and paint it with the brush when a tile is selected
    pub fn click_map(&mut self, row: usize, col: usize) -> bool {
        if !self.map.in_bounds(row, col) {
            return false;
        }
        self.selected_cell = Some(TileRef::new(row, col));
        info!("Selected map cell row={} col={}", row, col);
        if let Some(index) = self.selected_tile {
            let tile = TileBlueprint::contiguous(
                index,
                self.clamp_frames(self.brush_frames),
                self.frame_duration,
            );
            self.edit_cell(row, col, "Paint tile", |cell| cell.tile = tile);
        }
        true
    }

    pub fn select_palette(&mut self, index: usize) -> bool {
        if index >= self.palette_len() {
            return false;
        }
        self.selected_tile = Some(index as u32);
        self.brush_frames = self.clamp_frames(self.brush_frames);
        info!("Selected palette index={}", index);
        true
    }

    pub fn select_air(&mut self) {
        self.selected_tile = None;
        self.brush_frames = self.clamp_frames(self.brush_frames);
        info!("Selected: air");
    }

    pub fn toggle_solid(&mut self) -> Option<bool> {
        let (row, col) = self.selected()?;
        let after = self.edit_cell(row, col, "Toggle solid", |cell| cell.solid = !cell.solid)?;
        info!("Cell ({},{}) solid={}", row, col, after.solid);
        Some(after.solid)
    }

    pub fn toggle_water(&mut self) -> Option<bool> {
        let (row, col) = self.selected()?;
        let after = self.edit_cell(row, col, "Toggle water", |cell| cell.water = !cell.water)?;
        info!("Cell ({},{}) water={}", row, col, after.water);
        Some(after.water)
    }

    /// Remove the door on the selected cell, or place one on the next channel
    pub fn toggle_door(&mut self) -> Option<Option<u32>> {
        let (row, col) = self.selected()?;
        if self.map.door(row, col).is_some() {
            self.edit_cell(row, col, "Remove door", |cell| cell.door = None)?;
            info!("Removed door at ({},{})", row, col);
            return Some(None);
        }
        self.door_channel = next_channel(self.door_channel);
        let channel = self.door_channel;
        self.edit_cell(row, col, "Place door", |cell| cell.door = Some(channel))?;
        info!("Placed door at ({},{}) channel={}", row, col, channel);
        Some(Some(channel))
    }

    /// Remove the key on the selected cell, or place one on the current channel
    pub fn toggle_key(&mut self) -> Option<Option<u32>> {
        let (row, col) = self.selected()?;
        if self.map.key(row, col).is_some() {
            self.edit_cell(row, col, "Remove key", |cell| cell.key = None)?;
            info!("Removed key at ({},{})", row, col);
            return Some(None);
        }
        let channel = self.door_channel.clamp(1, MAX_DOOR_CHANNEL);
        self.edit_cell(row, col, "Place key", |cell| cell.key = Some(channel))?;
        info!("Placed key at ({},{}) channel={}", row, col, channel);
        Some(Some(channel))
    }

    /// Place the first enemy type, or advance the one already on the selected cell
    pub fn cycle_enemy(&mut self) -> Option<String> {
        let (row, col) = self.selected()?;
        match self.map.enemy(row, col).map(str::to_string) {
            None => {
                let name = ENEMY_TYPES[0].to_string();
                self.edit_cell(row, col, "Place enemy", |cell| {
                    cell.enemy = Some(name.clone())
                })?;
                info!("Placed enemy {} at ({},{})", name, row, col);
                Some(name)
            }
            Some(current) => {
                let index = ENEMY_TYPES.iter().position(|t| *t == current).unwrap_or(0);
                let next = ENEMY_TYPES[(index + 1) % ENEMY_TYPES.len()].to_string();
                self.edit_cell(row, col, "Change enemy", |cell| {
                    cell.enemy = Some(next.clone())
                })?;
                info!("Changed enemy at ({},{}) to {}", row, col, next);
                Some(next)
            }
        }
    }

    /// Drop every marker on the selected cell and turn it into air
    pub fn clear_cell(&mut self) -> bool {
        let Some((row, col)) = self.selected() else {
            return false;
        };
        let cleared = self
            .edit_cell(row, col, "Clear cell", |cell| *cell = CellState::default())
            .is_some();
        info!("Cleared cell ({},{})", row, col);
        cleared
    }

    /// Add the selected palette tile as another frame of the selected cell
    pub fn append_frame(&mut self) -> bool {
        let (Some((row, col)), Some(index)) = (self.selected(), self.selected_tile) else {
            return false;
        };
        let Some(before) = self.map.cell_state(row, col) else {
            return false;
        };
        let mut after = before.clone();
        if !after.tile.push_frame(index, self.frame_duration) {
            info!("Cell already has max frames ({})", MAX_TILE_FRAMES);
            self.set_status(format!("Cell already has max frames ({})", MAX_TILE_FRAMES));
            return false;
        }
        self.apply(
            vec![CellChange {
                row,
                col,
                before,
                after,
            }],
            "Append frame",
        );
        info!("Added frame #{} to cell ({},{})", index, row, col);
        true
    }

    pub fn adjust_frame_count(&mut self, delta: i32) {
        let wanted = (self.brush_frames as i32 + delta).max(1) as usize;
        self.brush_frames = self.clamp_frames(wanted);
    }

    pub fn adjust_frame_duration(&mut self, delta: f32) {
        self.frame_duration =
            (self.frame_duration + delta).clamp(MIN_FRAME_DURATION, MAX_FRAME_DURATION);
    }

    /// Turn every cell into air and drop the collision markup; enemies stay
    pub fn clear_all(&mut self) {
        let mut changes = Vec::new();
        for row in 0..self.map.rows() {
            for col in 0..self.map.cols() {
                let Some(before) = self.map.cell_state(row, col) else {
                    continue;
                };
                let after = CellState {
                    enemy: before.enemy.clone(),
                    ..CellState::default()
                };
                changes.push(CellChange {
                    row,
                    col,
                    before,
                    after,
                });
            }
        }
        self.apply(changes, "Clear map");
        info!("Cleared map (all air)");
        self.set_status("Cleared map (all air)");
    }

    /// Plain-text listing of the blueprint and its enemies
    pub fn dump(&self) -> String {
        let mut out = self.map.blueprint.describe();
        out.push_str("// Enemies: name,row,col\n");
        for spawn in self.map.spawns() {
            out.push_str(&format!("{},{},{}\n", spawn.name, spawn.row, spawn.col));
        }
        out
    }

    /// Write the blueprint, the snapshot and the enemy spawns
    pub fn save_all(&mut self) -> SaveReport {
        let blueprint_path = self.files.writable(BLUEPRINT_FILE);
        let report = SaveReport {
            blueprint: log_save(&blueprint_path, self.map.blueprint.save(&blueprint_path)),
            snapshot: {
                let path = self.files.writable(SNAPSHOT_FILE);
                log_save(&path, self.map.to_snapshot().save(&path))
            },
            enemies: {
                let path = self.files.writable(ENEMY_SPAWNS_FILE);
                log_save(&path, EnemySpawn::save_list(&self.map.spawns(), &path))
            },
        };
        info!(
            "Editor save: blueprint={} snapshot={} enemies={}",
            report.blueprint, report.snapshot, report.enemies
        );
        if report.all_ok() {
            self.set_status(format!("Saved level to {}", blueprint_path.display()));
        } else {
            self.set_status("Save failed (see log)");
        }
        report
    }

    pub fn undo(&mut self) -> Option<String> {
        let description = self.history.undo(&mut self.map)?;
        self.set_status(format!("Undo: {}", description));
        Some(description)
    }

    pub fn redo(&mut self) -> Option<String> {
        let description = self.history.redo(&mut self.map)?;
        self.set_status(format!("Redo: {}", description));
        Some(description)
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(StatusBanner {
            message: message.into(),
            remaining: STATUS_DURATION,
        });
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.message.as_str())
    }

    /// Count down the status banner
    pub fn tick(&mut self, dt: f32) {
        if let Some(status) = &mut self.status {
            status.remaining -= dt;
            if status.remaining <= 0.0 {
                self.status = None;
            }
        }
    }

    /// One-line summary shown above the map
    pub fn status_line(&self) -> String {
        let cell = self
            .selected_cell
            .map_or("none".to_string(), |c| format!("{},{}", c.row, c.col));
        let tile = self
            .selected_tile
            .map_or("none".to_string(), |i| i.to_string());
        format!(
            "TSX: {} | Selected cell: {} | Selected tile index: {} | Door channel: {} | Frames: {} @ {:.2}s",
            self.tsx_path.display(),
            cell,
            tile,
            self.door_channel,
            self.brush_frames,
            self.frame_duration
        )
    }

    fn selected(&self) -> Option<(usize, usize)> {
        self.selected_cell
            .filter(|c| self.map.in_bounds(c.row, c.col))
            .map(|c| (c.row, c.col))
    }

    /// Brush frames limited to the palette tiles left after the selected index
    fn clamp_frames(&self, wanted: usize) -> usize {
        let available = match self.selected_tile {
            Some(index) => self.palette_len().saturating_sub(index as usize),
            None => MAX_TILE_FRAMES,
        };
        wanted.clamp(1, available.clamp(1, MAX_TILE_FRAMES))
    }

    fn edit_cell(
        &mut self,
        row: usize,
        col: usize,
        description: &str,
        change: impl FnOnce(&mut CellState),
    ) -> Option<CellState> {
        let before = self.map.cell_state(row, col)?;
        let mut after = before.clone();
        change(&mut after);
        self.apply(
            vec![CellChange {
                row,
                col,
                before,
                after: after.clone(),
            }],
            description,
        );
        Some(after)
    }

    fn apply(&mut self, changes: Vec<CellChange>, description: &str) {
        let command = CellEditCommand::new(changes, description);
        if command.is_empty() {
            return;
        }
        for change in &command.changes {
            self.map
                .set_cell_state(change.row, change.col, &change.after);
        }
        self.history.push_undo(Box::new(command));
    }
}

fn next_channel(channel: u32) -> u32 {
    if channel >= MAX_DOOR_CHANNEL {
        1
    } else {
        channel + 1
    }
}

fn log_save(path: &Path, result: Result<(), celeste_core::CoreError>) -> bool {
    match result {
        Ok(()) => {
            info!("Saved {}", path.display());
            true
        }
        Err(e) => {
            error!("Failed to save {}: {}", path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use celeste_core::PaletteSource;
    use image::RgbaImage;

    fn palette(tiles: usize) -> Palette {
        Palette {
            tile_width: 8,
            tile_height: 8,
            columns: 4,
            tiles: vec![RgbaImage::new(8, 8); tiles],
            source: PaletteSource::Directory(PathBuf::from("tiles")),
        }
    }

    fn document(rows: usize, cols: usize) -> EditorDocument {
        let mut doc = EditorDocument::new(
            EditorMap::new(LevelBlueprint::new(rows, cols)),
            "assets/b.tsx",
            DataFiles::default(),
        );
        doc.palette = Some(palette(6));
        doc
    }

    #[test]
    fn test_click_selects_and_paints() {
        let mut doc = document(4, 4);
        assert!(doc.click_map(1, 2));
        assert!(doc.map.blueprint.get(1, 2).unwrap().is_air());
        assert!(!doc.click_map(4, 0));

        assert!(doc.select_palette(4));
        doc.adjust_frame_count(2);
        // Only tiles 4 and 5 remain after index 4
        assert_eq!(doc.brush_frames, 2);
        doc.click_map(0, 0);
        assert_eq!(doc.map.blueprint.get(0, 0).unwrap().frames, vec![4, 5]);
        assert_eq!(doc.selected_cell, Some(TileRef::new(0, 0)));
        assert!(!doc.select_palette(6));
    }

    #[test]
    fn test_door_channel_advances_and_wraps() {
        let mut doc = document(2, 2);
        doc.door_channel = 7;
        doc.click_map(0, 0);
        assert_eq!(doc.toggle_door(), Some(Some(8)));
        doc.click_map(0, 1);
        assert_eq!(doc.toggle_door(), Some(Some(1)));
        assert_eq!(doc.toggle_key(), Some(Some(1)));
        assert_eq!(doc.toggle_door(), Some(None));
        assert_eq!(doc.map.door(0, 1), None);
        assert_eq!(doc.map.key(0, 1), Some(1));
    }

    #[test]
    fn test_toggles_need_a_selection() {
        let mut doc = document(2, 2);
        assert_eq!(doc.toggle_solid(), None);
        assert!(!doc.clear_cell());
        doc.click_map(1, 1);
        assert_eq!(doc.toggle_solid(), Some(true));
        assert_eq!(doc.toggle_water(), Some(true));
        assert_eq!(doc.toggle_solid(), Some(false));
    }

    #[test]
    fn test_enemy_cycle() {
        let mut doc = document(2, 2);
        doc.click_map(0, 0);
        assert_eq!(doc.cycle_enemy().as_deref(), Some("deathBoss"));
        assert_eq!(doc.cycle_enemy().as_deref(), Some("redDeon"));
        assert_eq!(doc.cycle_enemy().as_deref(), Some("skeletonEnemie"));
        assert_eq!(doc.cycle_enemy().as_deref(), Some("deathBoss"));

        doc.map.set_enemy(0, 0, Some("ghost".to_string()));
        assert_eq!(doc.cycle_enemy().as_deref(), Some("redDeon"));
    }

    #[test]
    fn test_clear_cell_and_undo() {
        let mut doc = document(2, 2);
        doc.select_palette(1);
        doc.click_map(1, 0);
        doc.toggle_solid();
        doc.cycle_enemy();
        assert!(doc.clear_cell());
        let cleared = doc.map.cell_state(1, 0).unwrap();
        assert_eq!(cleared, CellState::default());

        assert_eq!(doc.undo().as_deref(), Some("Clear cell"));
        let restored = doc.map.cell_state(1, 0).unwrap();
        assert_eq!(restored.tile.frames, vec![1]);
        assert!(restored.solid);
        assert_eq!(restored.enemy.as_deref(), Some("deathBoss"));
        assert_eq!(doc.status(), Some("Undo: Clear cell"));

        doc.redo();
        assert_eq!(doc.map.cell_state(1, 0).unwrap(), CellState::default());
    }

    #[test]
    fn test_append_frame_stops_at_three() {
        let mut doc = document(1, 1);
        doc.select_palette(0);
        doc.click_map(0, 0);
        doc.select_palette(3);
        assert!(doc.append_frame());
        assert!(doc.append_frame());
        assert!(!doc.append_frame());
        assert_eq!(doc.map.blueprint.get(0, 0).unwrap().frames, vec![0, 3, 3]);
    }

    #[test]
    fn test_frame_duration_clamped() {
        let mut doc = document(1, 1);
        for _ in 0..40 {
            doc.adjust_frame_duration(FRAME_DURATION_STEP);
        }
        assert_eq!(doc.frame_duration, MAX_FRAME_DURATION);
        for _ in 0..40 {
            doc.adjust_frame_duration(-FRAME_DURATION_STEP);
        }
        assert_eq!(doc.frame_duration, MIN_FRAME_DURATION);
    }

    #[test]
    fn test_clear_all_keeps_enemies() {
        let mut doc = document(2, 2);
        doc.select_palette(0);
        doc.click_map(0, 0);
        doc.toggle_solid();
        doc.click_map(1, 1);
        doc.cycle_enemy();
        doc.clear_all();
        assert_eq!(doc.map.blueprint.filled_cells().count(), 0);
        assert!(!doc.map.is_solid(0, 0));
        assert_eq!(doc.map.enemy(1, 1), Some("deathBoss"));
        doc.undo();
        assert_eq!(doc.map.blueprint.filled_cells().count(), 2);
    }

    #[test]
    fn test_status_banner_expires() {
        let mut doc = document(1, 1);
        doc.set_status("hello");
        doc.tick(2.0);
        assert_eq!(doc.status(), Some("hello"));
        doc.tick(0.6);
        assert_eq!(doc.status(), None);
    }

    #[test]
    fn test_load_and_save_all() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SNAPSHOT_FILE),
            r#"{"solid":[[17,0]],"doors":[{"channel":5,"door":[[3,3]],"key":[[4,4]]}]}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join(ENEMY_SPAWNS_FILE),
            r#"[{"name":"redDeon","row":10,"col":12}]"#,
        )
        .unwrap();

        let files = DataFiles::in_dir(dir.path());
        let (mut doc, warnings) = EditorDocument::load(dir.path().join("missing.tsx"), files);
        // No blueprint and no tileset
        assert_eq!(warnings.len(), 2);
        assert!(doc.palette.is_none());
        assert_eq!(doc.door_channel, 5);
        assert!(doc.map.is_solid(17, 0));
        assert_eq!(doc.map.enemy(10, 12), Some("redDeon"));

        let report = doc.save_all();
        assert!(report.all_ok());
        let blueprint = LevelBlueprint::load(dir.path().join(BLUEPRINT_FILE)).unwrap();
        assert_eq!(blueprint, LevelBlueprint::default());
        let snapshot = InspectorSnapshot::load(dir.path().join(SNAPSHOT_FILE)).unwrap();
        assert_eq!(snapshot.door_channel_at(TileRef::new(3, 3)), Some(5));
        assert_eq!(snapshot.enemies.len(), 1);
        let spawns = EnemySpawn::load_list(dir.path().join(ENEMY_SPAWNS_FILE)).unwrap();
        assert_eq!(spawns[0].name, "redDeon");
        assert!(doc.status().unwrap().starts_with("Saved level to"));
    }

    #[test]
    fn test_dump_lists_cells_and_enemies() {
        let mut doc = document(2, 2);
        doc.select_palette(2);
        doc.click_map(1, 1);
        doc.cycle_enemy();
        let dump = doc.dump();
        assert!(dump.contains("(1, 1) frames=[2]"));
        assert!(dump.contains("deathBoss,1,1"));
    }
}
