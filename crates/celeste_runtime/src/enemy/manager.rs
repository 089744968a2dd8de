//! Spawning and driving every enemy in the level

use bevy::log::{info, warn};
use bevy::math::{Rect, Vec2};
use celeste_core::{absolute_path, locate_data_dir, EnemySpawn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::definition::EnemyRegistry;
use super::instance::{EnemyClips, EnemyInstance, EnemyState, HealthBar};
use super::node::{EnemyNode, MeleeHit};
use crate::samurai::Samurai;

/// Reach added to an enemy's contact radius for the samurai's sword
pub const MELEE_RANGE: f32 = 96.0;
/// Sword point relative to the samurai's position when facing right
pub const ATTACK_POINT_RIGHT: Vec2 = Vec2::new(70.0, 40.0);
/// Sword point relative to the samurai's position when facing left
pub const ATTACK_POINT_LEFT: Vec2 = Vec2::new(-20.0, 40.0);

/// What the renderer needs to draw one enemy
#[derive(Debug, Clone)]
pub struct EnemyView {
    pub uid: u64,
    pub id: String,
    pub state: EnemyState,
    pub position: Vec2,
    pub size: Vec2,
    pub sheet: PathBuf,
    pub rect: Rect,
    pub render_scale: f32,
    pub render_origin: Vec2,
    pub health_bar: Option<HealthBar>,
}

pub struct EnemyManager {
    registry: EnemyRegistry,
    asset_base: PathBuf,
    clips: HashMap<String, Arc<EnemyClips>>,
    root: EnemyNode,
    next_uid: u64,
    spawned: usize,
}

impl Default for EnemyManager {
    fn default() -> Self {
        Self::new(EnemyRegistry::with_defaults(), ".")
    }
}

impl EnemyManager {
    /// Asset roots of the registered definitions are resolved against `asset_base`
    pub fn new(registry: EnemyRegistry, asset_base: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            asset_base: asset_base.into(),
            clips: HashMap::new(),
            root: EnemyNode::group("enemies"),
            next_uid: 1,
            spawned: 0,
        }
    }

    pub fn registry(&self) -> &EnemyRegistry {
        &self.registry
    }

    /// Provide clips for a variant instead of reading its sheets from disk
    pub fn set_clips(&mut self, id: impl Into<String>, clips: EnemyClips) {
        self.clips.insert(id.into(), Arc::new(clips));
    }

    fn clips_for(&mut self, id: &str) -> Option<Arc<EnemyClips>> {
        if let Some(clips) = self.clips.get(id) {
            return Some(clips.clone());
        }
        let root = self.asset_root(id)?;
        let definition = self.registry.definition(id)?;
        let (clips, problems) = EnemyClips::probe_all(&root, definition.animations.iter().cloned());
        for problem in problems {
            warn!("{}", problem);
        }
        let clips = Arc::new(clips);
        self.clips.insert(id.to_string(), clips.clone());
        Some(clips)
    }

    /// World position of a spawn cell's bottom-left corner
    pub fn spawn_position(spawn: &EnemySpawn, rows: usize, tile_size: f32) -> Vec2 {
        let row_from_bottom = rows as f32 - spawn.row as f32 - 1.0;
        Vec2::new(spawn.col as f32 * tile_size, row_from_bottom * tile_size)
    }

    /// Spawn every known enemy; unknown ids are skipped. Returns how many spawned.
    pub fn spawn_all(&mut self, spawns: &[EnemySpawn], rows: usize, tile_size: f32) -> usize {
        let mut count = 0;
        for spawn in spawns {
            let Some(definition) = self.registry.definition(&spawn.name) else {
                warn!("Unknown enemy id '{}', skipping spawn", spawn.name);
                continue;
            };
            let Some(clips) = self.clips_for(&spawn.name) else {
                continue;
            };
            let position = Self::spawn_position(spawn, rows, tile_size);
            match EnemyInstance::new(self.next_uid, definition, clips, position) {
                Ok(instance) => {
                    self.next_uid += 1;
                    self.root.add(EnemyNode::Leaf(instance));
                    count += 1;
                }
                Err(e) => warn!("{}", e),
            }
        }
        self.spawned += count;
        info!("Spawned {} of {} enemies", count, spawns.len());
        count
    }

    pub fn update(&mut self, dt: f32, player: Option<Vec2>) {
        self.root.update(dt, player);
    }

    pub fn check_attacks(&mut self, samurai: &mut Samurai) {
        self.root.check_attacks(samurai);
    }

    /// Where the samurai's sword lands this swing
    pub fn attack_point(samurai: &Samurai) -> Vec2 {
        let offset = if samurai.is_facing_right() {
            ATTACK_POINT_RIGHT
        } else {
            ATTACK_POINT_LEFT
        };
        samurai.position() + offset
    }

    pub fn apply_melee_damage(&mut self, samurai: &Samurai, damage: i32) -> Option<MeleeHit> {
        if damage <= 0 || self.root.is_empty() {
            return None;
        }
        self.root
            .apply_melee_damage(Self::attack_point(samurai), MELEE_RANGE, damage)
    }

    /// Remove every enemy and spawn the list again
    pub fn respawn(&mut self, spawns: &[EnemySpawn], rows: usize, tile_size: f32) -> usize {
        self.clear();
        if spawns.is_empty() {
            return 0;
        }
        self.spawn_all(spawns, rows, tile_size)
    }

    pub fn clear(&mut self) {
        self.root.clear();
        self.spawned = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn len(&self) -> usize {
        self.root.count()
    }

    /// Enemies spawned since the last clear
    pub fn spawned(&self) -> usize {
        self.spawned
    }

    pub fn views(&self) -> Vec<EnemyView> {
        let mut views = Vec::new();
        self.root.for_each(&mut |enemy| {
            let Some((animation, rect)) = enemy.current_frame() else {
                return;
            };
            let definition = enemy.definition();
            views.push(EnemyView {
                uid: enemy.uid(),
                id: enemy.id().to_string(),
                state: enemy.state(),
                position: enemy.position(),
                size: enemy.size(),
                sheet: animation.sheet.path.clone(),
                rect,
                render_scale: definition.render_scale,
                render_origin: definition.render_origin,
                health_bar: enemy.health_bar(),
            });
        });
        views
    }

    pub fn asset_base(&self) -> &Path {
        &self.asset_base
    }

    /// Absolute sheet directory of a variant, found like the other data dirs
    pub fn asset_root(&self, id: &str) -> Option<PathBuf> {
        let root = self.asset_base.join(&self.registry.definition(id)?.asset_root);
        Some(locate_data_dir(&root).unwrap_or_else(|| absolute_path(root)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::definition::EnemyAnimationKey;
    use crate::enemy::instance::tests::{sheet, test_definition};
    use crate::samurai::SamuraiClips;
    use celeste_animation::LoopMode;
    use celeste_core::PlayerConfig;

    fn manager() -> EnemyManager {
        let mut registry = EnemyRegistry::default();
        registry.register((*test_definition()).clone());
        let mut manager = EnemyManager::new(registry, ".");
        let mut clips = EnemyClips::default();
        clips.insert(EnemyAnimationKey::Idle, sheet(4, 0.1, LoopMode::Loop));
        manager.set_clips("redDeon", clips);
        manager
    }

    fn spawn(name: &str, row: usize, col: usize) -> EnemySpawn {
        EnemySpawn {
            name: name.to_string(),
            row,
            col,
        }
    }

    fn samurai_at(x: f32, y: f32) -> Samurai {
        let mut samurai = Samurai::new(SamuraiClips::default(), &PlayerConfig::default());
        samurai.place_at(x, y);
        samurai
    }

    #[test]
    fn test_spawn_positions_and_unknown_ids() {
        let mut manager = manager();
        let count = manager.spawn_all(
            &[spawn("redDeon", 15, 3), spawn("deathBoss", 1, 1)],
            18,
            32.0,
        );
        assert_eq!(count, 1);
        assert_eq!(manager.spawned(), 1);
        let views = manager.views();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].position, Vec2::new(96.0, 64.0));
        assert_eq!(views[0].sheet, PathBuf::from("enemy.png"));
    }

    #[test]
    fn test_asset_root_is_absolute() {
        let manager = manager();
        let root = manager.asset_root("redDeon").unwrap();
        let declared = &manager.registry().definition("redDeon").unwrap().asset_root;
        assert!(root.is_absolute());
        assert!(root.ends_with(declared));
        assert_eq!(manager.asset_root("nobody"), None);

        let dir = tempfile::tempdir().unwrap();
        let pinned = EnemyManager::new(EnemyRegistry::with_defaults(), dir.path());
        assert!(pinned.asset_root("redDeon").unwrap().starts_with(dir.path()));
    }

    #[test]
    fn test_missing_sheets_skip_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = EnemyManager::new(EnemyRegistry::with_defaults(), dir.path());
        assert_eq!(manager.spawn_all(&[spawn("redDeon", 0, 0)], 4, 32.0), 0);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_melee_uses_facing_attack_point() {
        let mut manager = manager();
        // Enemy center lands at (40, 30)
        manager.spawn_all(&[spawn("redDeon", 3, 0)], 4, 32.0);

        let samurai = samurai_at(-30.0, -10.0);
        assert_eq!(EnemyManager::attack_point(&samurai), Vec2::new(40.0, 30.0));
        assert_eq!(manager.apply_melee_damage(&samurai, 0), None);
        assert_eq!(manager.apply_melee_damage(&samurai, 12), Some(MeleeHit::Hit));
        assert_eq!(
            manager.apply_melee_damage(&samurai, 30),
            Some(MeleeHit::Defeated {
                id: "redDeon".to_string()
            })
        );

        let far = samurai_at(2000.0, 0.0);
        assert_eq!(manager.apply_melee_damage(&far, 10), None);
    }

    #[test]
    fn test_defeated_enemy_is_removed() {
        let mut manager = manager();
        manager.spawn_all(&[spawn("redDeon", 3, 0)], 4, 32.0);
        manager.apply_melee_damage(&samurai_at(-30.0, -10.0), 100);
        manager.update(0.1, None);
        assert!(manager.is_empty());
        assert_eq!(manager.spawned(), 1);
    }

    #[test]
    fn test_respawn_resets() {
        let mut manager = manager();
        manager.spawn_all(&[spawn("redDeon", 0, 0), spawn("redDeon", 0, 2)], 4, 32.0);
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.respawn(&[spawn("redDeon", 1, 1)], 4, 32.0), 1);
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.spawned(), 1);
        assert_eq!(manager.respawn(&[], 4, 32.0), 0);
        assert!(manager.is_empty());
    }
}
