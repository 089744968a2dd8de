//! Markup lists edited by the inspector

use bevy::prelude::*;
use celeste_core::{
    CoreError, DoorRecord, EnemyPlacement, InspectorSnapshot, LevelBlueprint, Palette, TileRef,
    BLUEPRINT_FILE, DEFAULT_TSX_PATH, SNAPSHOT_FILE, TILESET_FALLBACK_DIR,
};
use std::path::PathBuf;

use crate::data::DataFiles;

/// What a plain click adds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Solid,
    Door,
    Key,
    Water,
}

impl Selection {
    pub fn label(&self) -> &'static str {
        match self {
            Selection::Solid => "Solid ground/wall",
            Selection::Door => "Door",
            Selection::Key => "Door Key",
            Selection::Water => "Water",
        }
    }
}

/// Result of clicking a tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Added,
    Duplicate { list: &'static str, tile: TileRef },
    NoPendingDoor,
    EnemyPlaced { name: String, tile: TileRef },
    EnemyMoved { name: String, tile: TileRef },
    Removed { enemies: Vec<String>, tile: TileRef },
    NothingToRemove(TileRef),
    Ignored,
}

impl ClickOutcome {
    /// Whether the markup changed
    pub fn changed(&self) -> bool {
        matches!(
            self,
            ClickOutcome::Added
                | ClickOutcome::EnemyPlaced { .. }
                | ClickOutcome::EnemyMoved { .. }
                | ClickOutcome::Removed { .. }
        )
    }

    /// Log lines describing the outcome
    pub fn messages(&self) -> Vec<String> {
        match self {
            ClickOutcome::Added | ClickOutcome::Ignored => Vec::new(),
            ClickOutcome::Duplicate { list, tile } => {
                vec![format!("{} already contains {}", list, tile)]
            }
            ClickOutcome::NoPendingDoor => {
                vec!["No pending door to attach this key. Select door (4) first.".to_string()]
            }
            ClickOutcome::EnemyPlaced { name, tile } => {
                vec![format!("Placed enemy '{}' at {}", name, tile)]
            }
            ClickOutcome::EnemyMoved { name, tile } => {
                vec![format!("Moved enemy '{}' to {}", name, tile)]
            }
            ClickOutcome::Removed { enemies, tile } => enemies
                .iter()
                .map(|name| format!("Removed enemy '{}' at {}", name, tile))
                .collect(),
            ClickOutcome::NothingToRemove(tile) => vec![format!("No entry found at {}", tile)],
        }
    }
}

/// Characters accepted in enemy names
pub fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ' ' || c == '-' || c == '_'
}

/// Inspector state: the level being marked up and the pending interactions
#[derive(Resource)]
pub struct InspectorDocument {
    pub blueprint: LevelBlueprint,
    pub palette: Option<Palette>,
    pub selection: Selection,
    solid: Vec<TileRef>,
    water: Vec<TileRef>,
    doors: Vec<DoorRecord>,
    /// Channels of doors still waiting for a key, oldest first
    pending_doors: Vec<u32>,
    enemies: Vec<EnemyPlacement>,
    naming: Option<String>,
    pending_enemy: Option<String>,
    delete_mode: bool,
    files: DataFiles,
}

impl InspectorDocument {
    pub fn new(blueprint: LevelBlueprint, files: DataFiles) -> Self {
        Self {
            blueprint,
            palette: None,
            selection: Selection::default(),
            solid: Vec::new(),
            water: Vec::new(),
            doors: Vec::new(),
            pending_doors: Vec::new(),
            enemies: Vec::new(),
            naming: None,
            pending_enemy: None,
            delete_mode: false,
            files,
        }
    }

    /// Load the blueprint, the palette and the snapshot; returns the warnings
    pub fn load(files: DataFiles) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let (blueprint, fallback) =
            LevelBlueprint::load_or_default(files.existing(BLUEPRINT_FILE).as_deref());
        warnings.extend(fallback);

        let tsx = files
            .existing(DEFAULT_TSX_PATH)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TSX_PATH));
        let fallback_dir = files.directory(TILESET_FALLBACK_DIR);
        let mut document = Self::new(blueprint, files);
        match Palette::load_default(Some(&tsx), &fallback_dir) {
            Ok((palette, _)) => {
                info!(
                    "Palette loaded from {} ({} tiles)",
                    palette.source,
                    palette.len()
                );
                document.palette = Some(palette);
            }
            Err(e) => warnings.push(format!("Unable to load tile palette: {}", e)),
        }

        info!("{}", document.load_snapshot());
        (document, warnings)
    }

    /// Replace the markup with the snapshot on disk
    pub fn load_snapshot(&mut self) -> String {
        let Some(path) = self.files.existing(SNAPSHOT_FILE) else {
            return "No snapshot found; starting fresh.".to_string();
        };
        match InspectorSnapshot::load(&path) {
            Ok(snapshot) => {
                self.apply_snapshot(snapshot);
                format!("Loaded snapshot from {}", path.display())
            }
            Err(e) => format!("Failed to load snapshot {}: {}", path.display(), e),
        }
    }

    pub fn apply_snapshot(&mut self, snapshot: InspectorSnapshot) {
        self.solid = snapshot.solid;
        self.water = snapshot.water;
        self.doors = snapshot.doors;
        self.enemies = snapshot.enemies;
        self.pending_doors.clear();
    }

    pub fn to_snapshot(&self) -> InspectorSnapshot {
        InspectorSnapshot {
            solid: self.solid.clone(),
            water: self.water.clone(),
            doors: self.doors.clone(),
            enemies: self.enemies.clone(),
        }
    }

    /// Write `inspector_snapshot.json`; returns the path written
    pub fn save_snapshot(&self) -> Result<PathBuf, CoreError> {
        let path = self.files.writable(SNAPSHOT_FILE);
        self.to_snapshot().save(&path)?;
        Ok(path)
    }

    pub fn solid(&self) -> &[TileRef] {
        &self.solid
    }

    pub fn water(&self) -> &[TileRef] {
        &self.water
    }

    pub fn doors(&self) -> &[DoorRecord] {
        &self.doors
    }

    pub fn enemies(&self) -> &[EnemyPlacement] {
        &self.enemies
    }

    pub fn set_selection(&mut self, selection: Selection, key: &str) -> String {
        self.selection = selection;
        format!("Active selection: {} (key {})", selection.label(), key)
    }

    pub fn arm_delete(&mut self) -> String {
        self.delete_mode = true;
        "Delete mode active. Click a tile to remove it.".to_string()
    }

    pub fn delete_mode(&self) -> bool {
        self.delete_mode
    }

    pub fn start_naming(&mut self) -> String {
        if self.naming.is_some() {
            return "Already awaiting an enemy name input.".to_string();
        }
        self.naming = Some(String::new());
        "Enter enemy name using keyboard. Press Enter to confirm, Esc to cancel.".to_string()
    }

    pub fn is_naming(&self) -> bool {
        self.naming.is_some()
    }

    /// Name typed so far, while naming
    pub fn name_buffer(&self) -> Option<&str> {
        self.naming.as_deref()
    }

    /// Name waiting for a click
    pub fn pending_enemy(&self) -> Option<&str> {
        self.pending_enemy.as_deref()
    }

    pub fn type_char(&mut self, c: char) -> bool {
        match &mut self.naming {
            Some(buffer) if is_name_char(c) => {
                buffer.push(c);
                true
            }
            _ => false,
        }
    }

    pub fn backspace(&mut self) {
        if let Some(buffer) = &mut self.naming {
            buffer.pop();
        }
    }

    pub fn confirm_name(&mut self) -> String {
        let Some(buffer) = &self.naming else {
            return "Not naming an enemy.".to_string();
        };
        if buffer.trim().is_empty() {
            return "Enemy name is empty. Type characters or press Esc to cancel.".to_string();
        }
        let name = buffer.clone();
        self.naming = None;
        let message = format!("Enemy '{}' pending placement. Click a tile.", name);
        self.pending_enemy = Some(name);
        message
    }

    pub fn cancel_naming(&mut self) -> String {
        self.naming = None;
        "Enemy naming canceled.".to_string()
    }

    /// Apply a click: pending enemy first, then delete mode, then the active selection
    pub fn click(&mut self, tile: TileRef) -> ClickOutcome {
        if tile.row >= self.blueprint.rows || tile.col >= self.blueprint.cols {
            return ClickOutcome::Ignored;
        }
        if let Some(name) = self.pending_enemy.take() {
            return self.place_enemy(name, tile);
        }
        if self.delete_mode {
            self.delete_mode = false;
            return self.remove_tile(tile);
        }
        match self.selection {
            Selection::Solid => add_unique(&mut self.solid, Selection::Solid.label(), tile),
            Selection::Water => add_unique(&mut self.water, Selection::Water.label(), tile),
            Selection::Door => self.add_door_tile(tile),
            Selection::Key => self.add_key_tile(tile),
        }
    }

    fn place_enemy(&mut self, name: String, tile: TileRef) -> ClickOutcome {
        if name.trim().is_empty() {
            return ClickOutcome::Ignored;
        }
        match self
            .enemies
            .iter_mut()
            .find(|e| e.name.eq_ignore_ascii_case(&name))
        {
            Some(existing) => {
                existing.row = tile.row;
                existing.col = tile.col;
                ClickOutcome::EnemyMoved { name, tile }
            }
            None => {
                self.enemies.push(EnemyPlacement::new(name.clone(), tile));
                ClickOutcome::EnemyPlaced { name, tile }
            }
        }
    }

    fn add_door_tile(&mut self, tile: TileRef) -> ClickOutcome {
        let pending = self
            .pending_doors
            .last()
            .and_then(|channel| self.doors.iter().position(|d| d.channel == *channel))
            .filter(|i| self.doors[*i].key.is_empty());
        let index = match pending {
            Some(index) => index,
            None => {
                let channel = self.doors.iter().map(|d| d.channel).max().unwrap_or(0) + 1;
                self.doors.push(DoorRecord::new(channel));
                self.pending_doors.push(channel);
                self.doors.len() - 1
            }
        };
        let door = &mut self.doors[index];
        if door.door.contains(&tile) {
            return ClickOutcome::Duplicate { list: "Door", tile };
        }
        door.door.push(tile);
        ClickOutcome::Added
    }

    fn add_key_tile(&mut self, tile: TileRef) -> ClickOutcome {
        let Some(channel) = self.pending_doors.last().copied() else {
            return ClickOutcome::NoPendingDoor;
        };
        let Some(door) = self.doors.iter_mut().find(|d| d.channel == channel) else {
            self.pending_doors.pop();
            return ClickOutcome::NoPendingDoor;
        };
        if door.key.contains(&tile) {
            return ClickOutcome::Duplicate {
                list: "Key list",
                tile,
            };
        }
        door.key.push(tile);
        self.pending_doors.retain(|c| *c != channel);
        ClickOutcome::Added
    }

    fn remove_tile(&mut self, tile: TileRef) -> ClickOutcome {
        let mut removed = false;
        for list in [&mut self.solid, &mut self.water] {
            let before = list.len();
            list.retain(|t| *t != tile);
            removed |= list.len() != before;
        }
        for door in &mut self.doors {
            let before = door.door.len() + door.key.len();
            door.door.retain(|t| *t != tile);
            door.key.retain(|t| *t != tile);
            removed |= door.door.len() + door.key.len() != before;
        }
        let emptied: Vec<u32> = self
            .doors
            .iter()
            .filter(|d| d.is_empty())
            .map(|d| d.channel)
            .collect();
        self.doors.retain(|d| !d.is_empty());
        self.pending_doors.retain(|c| !emptied.contains(c));

        let enemies: Vec<String> = self
            .enemies
            .iter()
            .filter(|e| e.tile() == tile)
            .map(|e| e.name.clone())
            .collect();
        self.enemies.retain(|e| e.tile() != tile);

        if removed || !enemies.is_empty() {
            ClickOutcome::Removed { enemies, tile }
        } else {
            ClickOutcome::NothingToRemove(tile)
        }
    }

    /// Current markup, one line per category
    pub fn summary_lines(&self) -> Vec<String> {
        let enemies = if self.enemies.is_empty() {
            "enemies []".to_string()
        } else {
            let items: Vec<String> = self
                .enemies
                .iter()
                .enumerate()
                .map(|(i, e)| format!("#{} ({} @ {})", i + 1, e.name, e.tile()))
                .collect();
            format!("enemies [{}]", items.join(", "))
        };
        let doors = if self.doors.is_empty() {
            "door []".to_string()
        } else {
            let items: Vec<String> = self
                .doors
                .iter()
                .enumerate()
                .map(|(i, d)| {
                    format!(
                        "#{}{{door={}, key={}}}",
                        i + 1,
                        numbered(&d.door),
                        numbered(&d.key)
                    )
                })
                .collect();
            format!("door [{}]", items.join(", "))
        };
        vec![
            format!("solid {}", numbered(&self.solid)),
            format!("water {}", numbered(&self.water)),
            enemies,
            doors,
        ]
    }
}

fn add_unique(list: &mut Vec<TileRef>, label: &'static str, tile: TileRef) -> ClickOutcome {
    if list.contains(&tile) {
        return ClickOutcome::Duplicate { list: label, tile };
    }
    list.push(tile);
    ClickOutcome::Added
}

fn numbered(refs: &[TileRef]) -> String {
    let items: Vec<String> = refs
        .iter()
        .enumerate()
        .map(|(i, t)| format!("#{} {}", i + 1, t))
        .collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> InspectorDocument {
        InspectorDocument::new(LevelBlueprint::new(6, 6), DataFiles::default())
    }

    #[test]
    fn test_solid_refs_are_unique() {
        let mut doc = document();
        assert_eq!(doc.click(TileRef::new(1, 2)), ClickOutcome::Added);
        let outcome = doc.click(TileRef::new(1, 2));
        assert_eq!(
            outcome.messages(),
            vec!["Solid ground/wall already contains (r=1,c=2)"]
        );
        assert!(!outcome.changed());
        assert_eq!(doc.summary_lines()[0], "solid [#1 (r=1,c=2)]");
    }

    #[test]
    fn test_door_then_key_closes_the_record() {
        let mut doc = document();
        assert_eq!(
            doc.set_selection(Selection::Key, "5"),
            "Active selection: Door Key (key 5)"
        );
        assert_eq!(doc.click(TileRef::new(0, 0)), ClickOutcome::NoPendingDoor);

        doc.set_selection(Selection::Door, "4");
        doc.click(TileRef::new(2, 2));
        doc.click(TileRef::new(3, 2));
        doc.set_selection(Selection::Key, "5");
        doc.click(TileRef::new(5, 5));
        // The door has a key now, so the next key has nowhere to go
        assert_eq!(doc.click(TileRef::new(5, 4)), ClickOutcome::NoPendingDoor);

        doc.set_selection(Selection::Door, "4");
        doc.click(TileRef::new(1, 1));
        assert_eq!(doc.doors().len(), 2);
        assert_eq!(doc.doors()[1].channel, 2);
        assert_eq!(
            doc.summary_lines()[3],
            "door [#1{door=[#1 (r=2,c=2), #2 (r=3,c=2)], key=[#1 (r=5,c=5)]}, \
             #2{door=[#1 (r=1,c=1)], key=[]}]"
        );
    }

    #[test]
    fn test_enemy_naming_and_moving() {
        let mut doc = document();
        doc.start_naming();
        assert!(doc.is_naming());
        assert_eq!(
            doc.confirm_name(),
            "Enemy name is empty. Type characters or press Esc to cancel."
        );
        for c in "red#Deon".chars() {
            doc.type_char(c);
        }
        assert_eq!(doc.name_buffer(), Some("redDeon"));
        doc.confirm_name();
        assert_eq!(doc.pending_enemy(), Some("redDeon"));

        let outcome = doc.click(TileRef::new(4, 1));
        assert_eq!(
            outcome.messages(),
            vec!["Placed enemy 'redDeon' at (r=4,c=1)"]
        );
        // Placing the pending name does not touch the active selection list
        assert!(doc.solid().is_empty());

        doc.start_naming();
        for c in "REDDEON".chars() {
            doc.type_char(c);
        }
        doc.confirm_name();
        let outcome = doc.click(TileRef::new(0, 3));
        assert_eq!(
            outcome.messages(),
            vec!["Moved enemy 'REDDEON' to (r=0,c=3)"]
        );
        assert_eq!(doc.enemies().len(), 1);
        assert_eq!(doc.summary_lines()[2], "enemies [#1 (redDeon @ (r=0,c=3))]");
    }

    #[test]
    fn test_cancel_naming() {
        let mut doc = document();
        doc.start_naming();
        doc.type_char('a');
        doc.backspace();
        assert_eq!(doc.name_buffer(), Some(""));
        assert_eq!(doc.cancel_naming(), "Enemy naming canceled.");
        assert!(!doc.is_naming());
        assert!(!doc.type_char('b'));
    }

    #[test]
    fn test_delete_mode_is_one_shot() {
        let mut doc = document();
        let tile = TileRef::new(2, 3);
        doc.click(tile);
        doc.set_selection(Selection::Door, "4");
        doc.click(tile);
        doc.start_naming();
        doc.type_char('x');
        doc.confirm_name();
        doc.click(tile);

        doc.arm_delete();
        let outcome = doc.click(tile);
        assert_eq!(outcome.messages(), vec!["Removed enemy 'x' at (r=2,c=3)"]);
        assert!(doc.solid().is_empty());
        assert!(doc.doors().is_empty());
        assert!(doc.enemies().is_empty());
        assert!(!doc.delete_mode());

        doc.arm_delete();
        assert_eq!(
            doc.click(tile).messages(),
            vec!["No entry found at (r=2,c=3)"]
        );
        // Back to adding doors; the emptied record is no longer pending
        doc.click(TileRef::new(0, 0));
        assert_eq!(doc.doors()[0].channel, 1);
    }

    #[test]
    fn test_summary_of_empty_document() {
        let doc = document();
        assert_eq!(
            doc.summary_lines(),
            vec!["solid []", "water []", "enemies []", "door []"]
        );
    }

    #[test]
    fn test_snapshot_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc =
            InspectorDocument::new(LevelBlueprint::new(6, 6), DataFiles::in_dir(dir.path()));
        assert_eq!(doc.load_snapshot(), "No snapshot found; starting fresh.");
        doc.set_selection(Selection::Water, "6");
        doc.click(TileRef::new(5, 0));
        let path = doc.save_snapshot().unwrap();
        assert_eq!(path, dir.path().join(SNAPSHOT_FILE));

        let mut reloaded =
            InspectorDocument::new(LevelBlueprint::new(6, 6), DataFiles::in_dir(dir.path()));
        assert!(reloaded.load_snapshot().starts_with("Loaded snapshot from"));
        assert_eq!(reloaded.water(), &[TileRef::new(5, 0)]);
    }

    #[test]
    fn test_click_outside_grid_is_ignored() {
        let mut doc = document();
        assert_eq!(doc.click(TileRef::new(6, 0)), ClickOutcome::Ignored);
    }
}
