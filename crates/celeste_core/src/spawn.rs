//! Enemy spawn list

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    locate_data_file, CoreError, EnemyPlacement, InspectorSnapshot, TileRef, ENEMY_SPAWNS_FILE,
    SNAPSHOT_FILE,
};

/// Entry of `enemy_spawns.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemySpawn {
    /// Registry id, e.g. `redDeon`
    pub name: String,
    pub row: usize,
    pub col: usize,
}

impl EnemySpawn {
    pub fn tile(&self) -> TileRef {
        TileRef::new(self.row, self.col)
    }

    pub fn load_list(path: impl AsRef<Path>) -> Result<Vec<Self>, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::list_from_str(&content)
    }

    pub fn list_from_str(json: &str) -> Result<Vec<Self>, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save_list(spawns: &[Self], path: impl AsRef<Path>) -> Result<(), CoreError> {
        std::fs::write(path, serde_json::to_string_pretty(spawns)?)?;
        Ok(())
    }
}

impl From<&EnemyPlacement> for EnemySpawn {
    fn from(placement: &EnemyPlacement) -> Self {
        Self {
            name: placement.name.clone(),
            row: placement.row,
            col: placement.col,
        }
    }
}

/// Resolve the spawns the game should use.
///
/// A snapshot with enemies wins; otherwise `enemy_spawns.json` is read.
/// Files are looked up with [`locate_data_file`]. The returned warnings
/// describe files that existed but could not be parsed.
pub fn load_enemy_spawns() -> (Vec<EnemySpawn>, Vec<String>) {
    load_enemy_spawns_from(
        locate_data_file(SNAPSHOT_FILE).as_deref(),
        locate_data_file(ENEMY_SPAWNS_FILE).as_deref(),
    )
}

pub(crate) fn load_enemy_spawns_from(
    snapshot: Option<&Path>,
    spawns: Option<&Path>,
) -> (Vec<EnemySpawn>, Vec<String>) {
    let mut warnings = Vec::new();
    if let Some(path) = snapshot {
        match InspectorSnapshot::load(path) {
            Ok(snapshot) if !snapshot.enemies.is_empty() => {
                return (
                    snapshot.enemies.iter().map(EnemySpawn::from).collect(),
                    warnings,
                );
            }
            Ok(_) => {}
            Err(e) => warnings.push(format!("Failed to read {}: {}", path.display(), e)),
        }
    }
    if let Some(path) = spawns {
        match EnemySpawn::load_list(path) {
            Ok(list) => return (list, warnings),
            Err(e) => warnings.push(format!("Failed to read {}: {}", path.display(), e)),
        }
    }
    (Vec::new(), warnings)
}
