//! Inspector markup: which cells are solid, water, doors, keys and enemy spawns
//!
//! The snapshot is read leniently. Tile references may be written as
//! `[row, col]`, `{"row": r, "col": c}` or as a flat run of numbers, and door
//! records written by older editor builds (`{"row","col","channel"}` entries
//! plus a separate `keys` array) are merged into channel-keyed records.

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::path::Path;

use crate::CoreError;

/// A `(row, col)` grid address, row 0 at the top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileRef {
    pub row: usize,
    pub col: usize,
}

impl TileRef {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Parse a single `[row, col]` or `{"row", "col"}` entry
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) if items.len() >= 2 => {
                Some(Self::new(as_index(&items[0])?, as_index(&items[1])?))
            }
            Value::Object(map) => Some(Self::new(
                as_index(map.get("row")?)?,
                as_index(map.get("col")?)?,
            )),
            _ => None,
        }
    }
}

impl fmt::Display for TileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(r={},c={})", self.row, self.col)
    }
}

impl Serialize for TileRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.row)?;
        seq.serialize_element(&self.col)?;
        seq.end()
    }
}

fn as_index(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(|v| v as usize)
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as usize)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse a JSON array of tile references, skipping entries it cannot read.
///
/// Bare numbers are consumed in `row, col` pairs. A number that is not
/// followed by another number ends parsing.
pub fn parse_tile_refs(value: &Value) -> Vec<TileRef> {
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };
    let mut refs = Vec::new();
    let mut i = 0;
    while i < entries.len() {
        let entry = &entries[i];
        if entry.is_number() {
            let Some(next) = entries.get(i + 1).filter(|next| next.is_number()) else {
                break;
            };
            if let (Some(row), Some(col)) = (as_index(entry), as_index(next)) {
                refs.push(TileRef::new(row, col));
            }
            i += 2;
            continue;
        }
        if let Some(tile) = TileRef::from_value(entry) {
            refs.push(tile);
        }
        i += 1;
    }
    refs
}

/// A door and the keys that open it, linked by a channel number
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoorRecord {
    pub channel: u32,
    pub door: Vec<TileRef>,
    pub key: Vec<TileRef>,
}

impl DoorRecord {
    pub fn new(channel: u32) -> Self {
        Self {
            channel,
            door: Vec::new(),
            key: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.door.is_empty() && self.key.is_empty()
    }

    pub fn contains(&self, tile: TileRef) -> bool {
        self.door.contains(&tile) || self.key.contains(&tile)
    }
}

/// An enemy spawn marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyPlacement {
    pub name: String,
    pub row: usize,
    pub col: usize,
}

impl EnemyPlacement {
    pub fn new(name: impl Into<String>, tile: TileRef) -> Self {
        Self {
            name: name.into(),
            row: tile.row,
            col: tile.col,
        }
    }

    pub fn tile(&self) -> TileRef {
        TileRef::new(self.row, self.col)
    }

    fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let name = map.get("name")?.as_str()?.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            row: as_index(map.get("row")?)?,
            col: as_index(map.get("col")?)?,
        })
    }
}

/// Contents of `inspector_snapshot.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InspectorSnapshot {
    pub solid: Vec<TileRef>,
    pub water: Vec<TileRef>,
    pub doors: Vec<DoorRecord>,
    pub enemies: Vec<EnemyPlacement>,
}

impl InspectorSnapshot {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content)
    }

    pub fn load_from_str(json: &str) -> Result<Self, CoreError> {
        let root: Value = serde_json::from_str(json)?;
        if !root.is_object() {
            return Err(CoreError::InvalidFormat(
                "snapshot root must be a JSON object".to_string(),
            ));
        }
        let mut snapshot = Self {
            solid: parse_tile_refs(&root["solid"]),
            water: parse_tile_refs(&root["water"]),
            doors: Vec::new(),
            enemies: root["enemies"]
                .as_array()
                .map(|list| list.iter().filter_map(EnemyPlacement::from_value).collect())
                .unwrap_or_default(),
        };

        for entry in root["doors"].as_array().into_iter().flatten() {
            if entry.get("door").is_some() || entry.get("key").is_some() {
                let channel = entry
                    .get("channel")
                    .and_then(as_index)
                    .map(|c| c as u32)
                    .unwrap_or(snapshot.doors.len() as u32 + 1);
                snapshot.doors.push(DoorRecord {
                    channel,
                    door: parse_tile_refs(&entry["door"]),
                    key: parse_tile_refs(&entry["key"]),
                });
            } else if let Some(tile) = TileRef::from_value(entry) {
                snapshot.legacy_record(entry).door.push(tile);
            }
        }
        for entry in root["keys"].as_array().into_iter().flatten() {
            if let Some(tile) = TileRef::from_value(entry) {
                snapshot.legacy_record(entry).key.push(tile);
            }
        }
        Ok(snapshot)
    }

    fn legacy_record(&mut self, entry: &Value) -> &mut DoorRecord {
        let channel = entry
            .get("channel")
            .and_then(as_index)
            .map(|c| c as u32)
            .unwrap_or(1);
        let idx = match self.doors.iter().position(|d| d.channel == channel) {
            Some(idx) => idx,
            None => {
                self.doors.push(DoorRecord::new(channel));
                self.doors.len() - 1
            }
        };
        &mut self.doors[idx]
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.solid.is_empty()
            && self.water.is_empty()
            && self.doors.is_empty()
            && self.enemies.is_empty()
    }

    /// Channel of the door occupying `tile`, if any
    pub fn door_channel_at(&self, tile: TileRef) -> Option<u32> {
        self.doors
            .iter()
            .find(|d| d.door.contains(&tile))
            .map(|d| d.channel)
    }

    /// Channel of the key occupying `tile`, if any
    pub fn key_channel_at(&self, tile: TileRef) -> Option<u32> {
        self.doors
            .iter()
            .find(|d| d.key.contains(&tile))
            .map(|d| d.channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_mixed_refs() {
        let value = json!([[1, 2], {"row": 3, "col": 4}, 5, 6, "junk", [7], 8]);
        let refs = parse_tile_refs(&value);
        assert_eq!(
            refs,
            vec![TileRef::new(1, 2), TileRef::new(3, 4), TileRef::new(5, 6)]
        );
    }

    #[test]
    fn test_unpaired_number_stops_parsing() {
        let value = json!([[0, 1], 2, "3", [4, 5]]);
        assert_eq!(parse_tile_refs(&value), vec![TileRef::new(0, 1)]);
    }

    #[test]
    fn test_parse_refs_not_array() {
        assert!(parse_tile_refs(&json!({"row": 1})).is_empty());
        assert!(parse_tile_refs(&Value::Null).is_empty());
    }

    #[test]
    fn test_tile_ref_display() {
        assert_eq!(TileRef::new(4, 11).to_string(), "(r=4,c=11)");
    }

    #[test]
    fn test_canonical_snapshot() {
        let json = r#"{
            "solid": [[0, 0], [0, 1]],
            "water": [{"row": 5, "col": 5}],
            "doors": [{"door": [[2, 2]], "key": [[9, 9]]}, {"channel": 7, "door": [[3, 3]], "key": []}],
            "enemies": [{"name": "redDeon", "row": 4, "col": 6}, {"row": 1, "col": 1}]
        }"#;
        let snapshot = InspectorSnapshot::load_from_str(json).unwrap();
        assert_eq!(snapshot.solid.len(), 2);
        assert_eq!(snapshot.water, vec![TileRef::new(5, 5)]);
        assert_eq!(snapshot.doors[0].channel, 1);
        assert_eq!(snapshot.doors[1].channel, 7);
        assert_eq!(snapshot.key_channel_at(TileRef::new(9, 9)), Some(1));
        assert_eq!(snapshot.door_channel_at(TileRef::new(3, 3)), Some(7));
        assert_eq!(snapshot.enemies.len(), 1);
        assert_eq!(snapshot.enemies[0].tile(), TileRef::new(4, 6));
    }

    #[test]
    fn test_legacy_doors_merge_by_channel() {
        let json = r#"{
            "doors": [{"row": 1, "col": 1, "channel": 2}, {"row": 1, "col": 2, "channel": 2}],
            "keys": [{"row": 8, "col": 3, "channel": 2}, {"row": 8, "col": 4, "channel": 5}]
        }"#;
        let snapshot = InspectorSnapshot::load_from_str(json).unwrap();
        assert_eq!(snapshot.doors.len(), 2);
        assert_eq!(snapshot.doors[0].channel, 2);
        assert_eq!(snapshot.doors[0].door.len(), 2);
        assert_eq!(snapshot.doors[0].key, vec![TileRef::new(8, 3)]);
        assert_eq!(snapshot.doors[1].channel, 5);
        assert!(snapshot.doors[1].door.is_empty());
    }

    #[test]
    fn test_rejects_non_object_root() {
        assert!(InspectorSnapshot::load_from_str("[1, 2]").is_err());
    }

    #[test]
    fn test_save_canonical_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inspector_snapshot.json");
        let mut snapshot = InspectorSnapshot::default();
        snapshot.solid.push(TileRef::new(1, 2));
        let mut door = DoorRecord::new(3);
        door.door.push(TileRef::new(4, 5));
        snapshot.doors.push(door);
        snapshot
            .enemies
            .push(EnemyPlacement::new("redDeon", TileRef::new(6, 7)));
        snapshot.save(&path).unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["solid"], json!([[1, 2]]));
        assert_eq!(raw["doors"], json!([{"channel": 3, "door": [[4, 5]], "key": []}]));
        assert_eq!(raw["enemies"], json!([{"name": "redDeon", "row": 6, "col": 7}]));

        assert_eq!(InspectorSnapshot::load(&path).unwrap(), snapshot);
    }
}
