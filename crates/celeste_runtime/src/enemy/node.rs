//! Enemies arranged as a tree of groups and single instances

use bevy::math::Vec2;

use super::instance::EnemyInstance;
use crate::samurai::Samurai;

/// Share of the player's max health taken by one enemy strike
pub const STRIKE_DAMAGE_FRACTION: f32 = 0.1;

/// Result of a melee swing that connected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeleeHit {
    Hit,
    Defeated { id: String },
}

#[derive(Debug)]
pub enum EnemyNode {
    Leaf(EnemyInstance),
    Group {
        name: String,
        children: Vec<EnemyNode>,
    },
}

impl EnemyNode {
    pub fn group(name: impl Into<String>) -> Self {
        EnemyNode::Group {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Append a child; leaves ignore this
    pub fn add(&mut self, node: EnemyNode) {
        if let EnemyNode::Group { children, .. } = self {
            children.push(node);
        }
    }

    /// Advance every enemy and drop the ones that are gone
    pub fn update(&mut self, dt: f32, player: Option<Vec2>) {
        match self {
            EnemyNode::Leaf(instance) => instance.update(dt, player),
            EnemyNode::Group { children, .. } => {
                for child in children.iter_mut() {
                    child.update(dt, player);
                }
                children.retain(|child| {
                    let empty = child.is_empty();
                    if empty {
                        child.dispose();
                    }
                    !empty
                });
            }
        }
    }

    /// Damage the first enemy within reach of `point`
    pub fn apply_melee_damage(&mut self, point: Vec2, reach: f32, damage: i32) -> Option<MeleeHit> {
        match self {
            EnemyNode::Leaf(instance) => {
                if instance.is_defeated() || !instance.within_reach(point, reach) {
                    return None;
                }
                if instance.apply_damage(damage) {
                    Some(MeleeHit::Defeated {
                        id: instance.id().to_string(),
                    })
                } else {
                    Some(MeleeHit::Hit)
                }
            }
            EnemyNode::Group { children, .. } => children
                .iter_mut()
                .find_map(|child| child.apply_melee_damage(point, reach, damage)),
        }
    }

    /// Let attacking enemies in range strike the samurai
    pub fn check_attacks(&mut self, samurai: &mut Samurai) {
        match self {
            EnemyNode::Leaf(instance) => {
                if instance.is_defeated() || samurai.is_dead() {
                    return;
                }
                let target = samurai.controller().collider_center();
                if !instance.in_attack_range(target) || !instance.take_strike() {
                    return;
                }
                // The swing still lands against a raised guard, it just does nothing
                if !samurai.is_defending() {
                    let max = samurai.health().max();
                    let damage = ((max as f32 * STRIKE_DAMAGE_FRACTION).ceil() as i32).max(1);
                    samurai.apply_damage(damage);
                }
            }
            EnemyNode::Group { children, .. } => {
                for child in children.iter_mut() {
                    child.check_attacks(samurai);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            EnemyNode::Leaf(instance) => instance.is_dead(),
            EnemyNode::Group { children, .. } => children.is_empty(),
        }
    }

    /// Log destruction of every enemy under this node
    pub fn dispose(&self) {
        self.for_each(&mut |instance| instance.dispose());
    }

    /// Remove every child of a group, disposing them
    pub fn clear(&mut self) {
        if let EnemyNode::Group { children, .. } = self {
            for child in children.iter() {
                child.dispose();
            }
            children.clear();
        }
    }

    pub fn for_each<'a>(&'a self, f: &mut dyn FnMut(&'a EnemyInstance)) {
        match self {
            EnemyNode::Leaf(instance) => f(instance),
            EnemyNode::Group { children, .. } => {
                for child in children {
                    child.for_each(f);
                }
            }
        }
    }

    /// Number of enemies under this node
    pub fn count(&self) -> usize {
        let mut count = 0;
        self.for_each(&mut |_| count += 1);
        count
    }

    pub fn name(&self) -> &str {
        match self {
            EnemyNode::Leaf(instance) => instance.id(),
            EnemyNode::Group { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::instance::tests::{test_clips, test_definition};
    use crate::samurai::SamuraiClips;
    use celeste_core::PlayerConfig;

    fn leaf(uid: u64, x: f32) -> EnemyNode {
        EnemyNode::Leaf(
            EnemyInstance::new(uid, test_definition(), test_clips(), Vec2::new(x, 0.0)).unwrap(),
        )
    }

    fn tree() -> EnemyNode {
        let mut root = EnemyNode::group("root");
        let mut wave = EnemyNode::group("wave");
        wave.add(leaf(1, 0.0));
        wave.add(leaf(2, 0.0));
        root.add(wave);
        root.add(leaf(3, 1000.0));
        root
    }

    #[test]
    fn test_melee_stops_at_first_hit() {
        let mut root = tree();
        assert_eq!(root.count(), 3);
        let hit = root.apply_melee_damage(Vec2::new(40.0, 30.0), 10.0, 5);
        assert_eq!(hit, Some(MeleeHit::Hit));

        let mut damaged = Vec::new();
        root.for_each(&mut |e| damaged.push(e.health().current()));
        assert_eq!(damaged, vec![25, 30, 30]);
    }

    #[test]
    fn test_defeat_reported_and_purged() {
        let mut root = tree();
        let hit = root.apply_melee_damage(Vec2::new(1040.0, 30.0), 10.0, 100);
        assert_eq!(
            hit,
            Some(MeleeHit::Defeated {
                id: "redDeon".to_string()
            })
        );
        assert_eq!(root.apply_melee_damage(Vec2::new(1040.0, 30.0), 10.0, 100), None);
        root.update(1.0, None);
        assert_eq!(root.count(), 2);
    }

    #[test]
    fn test_empty_group_is_purged() {
        let mut root = EnemyNode::group("root");
        let mut wave = EnemyNode::group("wave");
        wave.add(leaf(1, 0.0));
        root.add(wave);
        root.apply_melee_damage(Vec2::new(40.0, 30.0), 10.0, 100);
        root.update(1.0, None);
        assert!(root.is_empty());
    }

    #[test]
    fn test_attack_damages_undefended_player() {
        let mut samurai = Samurai::new(SamuraiClips::default(), &PlayerConfig::default());
        samurai.configure_physics(-1800.0, 0.0);
        samurai.place_at(0.0, 0.0);
        samurai.update(1.0 / 60.0);

        let mut root = EnemyNode::group("root");
        root.add(leaf(1, 20.0));
        let center = samurai.controller().collider_center();
        root.update(0.01, Some(center));
        root.check_attacks(&mut samurai);
        assert_eq!(samurai.health().current(), 90);

        // One strike per cycle
        root.check_attacks(&mut samurai);
        assert_eq!(samurai.health().current(), 90);
    }

    #[test]
    fn test_defending_player_takes_nothing() {
        let mut samurai = Samurai::new(SamuraiClips::default(), &PlayerConfig::default());
        samurai.configure_physics(-1800.0, 0.0);
        samurai.place_at(0.0, 0.0);
        samurai.update(1.0 / 60.0);
        assert!(samurai.start_defend());

        let mut root = EnemyNode::group("root");
        root.add(leaf(1, 20.0));
        root.update(0.01, Some(samurai.controller().collider_center()));
        root.check_attacks(&mut samurai);
        assert_eq!(samurai.health().current(), 100);
    }
}
