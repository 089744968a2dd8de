//! Everything the editor can change about a level, cell by cell

use celeste_core::{
    DoorRecord, EnemyPlacement, EnemySpawn, InspectorSnapshot, LevelBlueprint, TileBlueprint,
    TileRef,
};
use std::collections::BTreeMap;

/// Highest door channel
pub const MAX_DOOR_CHANNEL: u32 = 8;

/// Full state of one cell, used for undo
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellState {
    pub tile: TileBlueprint,
    pub solid: bool,
    pub water: bool,
    pub door: Option<u32>,
    pub key: Option<u32>,
    pub enemy: Option<String>,
}

/// Blueprint plus the markup stored in the snapshot and spawn files
#[derive(Debug, Clone, PartialEq)]
pub struct EditorMap {
    pub blueprint: LevelBlueprint,
    solid: Vec<Vec<bool>>,
    water: Vec<Vec<bool>>,
    doors: BTreeMap<TileRef, u32>,
    keys: BTreeMap<TileRef, u32>,
    enemies: BTreeMap<TileRef, String>,
}

impl EditorMap {
    pub fn new(blueprint: LevelBlueprint) -> Self {
        let (rows, cols) = (blueprint.rows, blueprint.cols);
        Self {
            blueprint,
            solid: vec![vec![false; cols]; rows],
            water: vec![vec![false; cols]; rows],
            doors: BTreeMap::new(),
            keys: BTreeMap::new(),
            enemies: BTreeMap::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.blueprint.rows
    }

    pub fn cols(&self) -> usize {
        self.blueprint.cols
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows() && col < self.cols()
    }

    /// Merge snapshot markup; returns the highest door or key channel seen
    pub fn apply_snapshot(&mut self, snapshot: &InspectorSnapshot) -> u32 {
        for tile in &snapshot.solid {
            if self.in_bounds(tile.row, tile.col) {
                self.solid[tile.row][tile.col] = true;
            }
        }
        for tile in &snapshot.water {
            if self.in_bounds(tile.row, tile.col) {
                self.water[tile.row][tile.col] = true;
            }
        }
        let mut max_channel = 0;
        for record in &snapshot.doors {
            let door_tiles: Vec<TileRef> = record
                .door
                .iter()
                .copied()
                .filter(|t| self.in_bounds(t.row, t.col))
                .collect();
            for tile in &door_tiles {
                self.doors.insert(*tile, record.channel);
                max_channel = max_channel.max(record.channel);
            }
            let key_tiles: Vec<TileRef> = record
                .key
                .iter()
                .copied()
                .filter(|t| self.in_bounds(t.row, t.col))
                .collect();
            for tile in &key_tiles {
                self.keys.insert(*tile, record.channel);
                max_channel = max_channel.max(record.channel);
            }
        }
        for enemy in &snapshot.enemies {
            self.add_spawn(&enemy.name, enemy.tile());
        }
        max_channel
    }

    /// Add spawns; later entries replace earlier ones on the same cell
    pub fn apply_spawns(&mut self, spawns: &[EnemySpawn]) {
        for spawn in spawns {
            self.add_spawn(&spawn.name, spawn.tile());
        }
    }

    fn add_spawn(&mut self, name: &str, tile: TileRef) {
        if self.in_bounds(tile.row, tile.col) {
            self.enemies.insert(tile, name.to_string());
        }
    }

    pub fn is_solid(&self, row: usize, col: usize) -> bool {
        self.in_bounds(row, col) && self.solid[row][col]
    }

    pub fn is_water(&self, row: usize, col: usize) -> bool {
        self.in_bounds(row, col) && self.water[row][col]
    }

    pub fn door(&self, row: usize, col: usize) -> Option<u32> {
        self.doors.get(&TileRef::new(row, col)).copied()
    }

    pub fn key(&self, row: usize, col: usize) -> Option<u32> {
        self.keys.get(&TileRef::new(row, col)).copied()
    }

    pub fn enemy(&self, row: usize, col: usize) -> Option<&str> {
        self.enemies
            .get(&TileRef::new(row, col))
            .map(String::as_str)
    }

    pub fn set_solid(&mut self, row: usize, col: usize, solid: bool) {
        if self.in_bounds(row, col) {
            self.solid[row][col] = solid;
        }
    }

    pub fn set_water(&mut self, row: usize, col: usize, water: bool) {
        if self.in_bounds(row, col) {
            self.water[row][col] = water;
        }
    }

    pub fn set_door(&mut self, row: usize, col: usize, channel: Option<u32>) {
        set_entry(&mut self.doors, TileRef::new(row, col), channel);
    }

    pub fn set_key(&mut self, row: usize, col: usize, channel: Option<u32>) {
        set_entry(&mut self.keys, TileRef::new(row, col), channel);
    }

    pub fn set_enemy(&mut self, row: usize, col: usize, name: Option<String>) {
        set_entry(&mut self.enemies, TileRef::new(row, col), name);
    }

    pub fn cell_state(&self, row: usize, col: usize) -> Option<CellState> {
        Some(CellState {
            tile: self.blueprint.get(row, col)?.clone(),
            solid: self.is_solid(row, col),
            water: self.is_water(row, col),
            door: self.door(row, col),
            key: self.key(row, col),
            enemy: self.enemy(row, col).map(str::to_string),
        })
    }

    pub fn set_cell_state(&mut self, row: usize, col: usize, state: &CellState) {
        if !self.in_bounds(row, col) {
            return;
        }
        self.blueprint.set(row, col, state.tile.clone());
        self.set_solid(row, col, state.solid);
        self.set_water(row, col, state.water);
        self.set_door(row, col, state.door);
        self.set_key(row, col, state.key);
        self.set_enemy(row, col, state.enemy.clone());
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Markup in the snapshot format; doors and keys are grouped by channel
    pub fn to_snapshot(&self) -> InspectorSnapshot {
        let mut records: BTreeMap<u32, DoorRecord> = BTreeMap::new();
        for (tile, channel) in &self.doors {
            records
                .entry(*channel)
                .or_insert_with(|| DoorRecord::new(*channel))
                .door
                .push(*tile);
        }
        for (tile, channel) in &self.keys {
            records
                .entry(*channel)
                .or_insert_with(|| DoorRecord::new(*channel))
                .key
                .push(*tile);
        }
        InspectorSnapshot {
            solid: mask_refs(&self.solid),
            water: mask_refs(&self.water),
            doors: records.into_values().collect(),
            enemies: self
                .enemies
                .iter()
                .map(|(tile, name)| EnemyPlacement::new(name.clone(), *tile))
                .collect(),
        }
    }

    pub fn spawns(&self) -> Vec<EnemySpawn> {
        self.enemies
            .iter()
            .map(|(tile, name)| EnemySpawn {
                name: name.clone(),
                row: tile.row,
                col: tile.col,
            })
            .collect()
    }
}

fn set_entry<V>(map: &mut BTreeMap<TileRef, V>, tile: TileRef, value: Option<V>) {
    match value {
        Some(value) => {
            map.insert(tile, value);
        }
        None => {
            map.remove(&tile);
        }
    }
}

fn mask_refs(mask: &[Vec<bool>]) -> Vec<TileRef> {
    mask.iter()
        .enumerate()
        .flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, set)| **set)
                .map(move |(col, _)| TileRef::new(row, col))
        })
        .collect()
}
