//! Melee attack strategies and ground combo chaining

/// Seconds after an attack during which the next one continues the combo
pub const COMBO_RESET_TIME: f32 = 0.6;

/// Base damage of a melee swing before power-ups
pub const BASE_ATTACK_DAMAGE: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackKind {
    Ground1,
    Ground2,
    Ground3,
    Air,
}

impl AttackKind {
    pub fn name(&self) -> &'static str {
        match self {
            AttackKind::Ground1 => "ATTACK_1",
            AttackKind::Ground2 => "ATTACK_2",
            AttackKind::Ground3 => "ATTACK_3",
            AttackKind::Air => "AIR_ATTACK",
        }
    }

    /// Combo position of a ground attack, `None` for air attacks
    pub fn combo_index(&self) -> Option<u8> {
        match self {
            AttackKind::Ground1 => Some(1),
            AttackKind::Ground2 => Some(2),
            AttackKind::Ground3 => Some(3),
            AttackKind::Air => None,
        }
    }

    fn from_combo_index(index: u8) -> Self {
        match index {
            2 => AttackKind::Ground2,
            3 => AttackKind::Ground3,
            _ => AttackKind::Ground1,
        }
    }

    /// Damage before attribute scaling
    pub fn base_damage(&self) -> i32 {
        match self {
            AttackKind::Ground3 => 15,
            _ => BASE_ATTACK_DAMAGE,
        }
    }

    /// Ground swings plant the samurai in place
    pub fn roots_in_place(&self) -> bool {
        !matches!(self, AttackKind::Air)
    }
}

/// Picks the next attack of the ground combo
#[derive(Debug, Clone, Default)]
pub struct AttackCoordinator {
    last_index: u8,
    timer: f32,
}

impl AttackCoordinator {
    pub fn request(&mut self, grounded: bool) -> AttackKind {
        if !grounded {
            self.reset();
            return AttackKind::Air;
        }
        let next = if self.timer <= 0.0 || self.last_index == 0 || self.last_index >= 3 {
            1
        } else {
            self.last_index + 1
        };
        AttackKind::from_combo_index(next)
    }

    pub fn on_attack_started(&mut self, kind: AttackKind, grounded: bool) {
        match kind.combo_index() {
            Some(index) if grounded => {
                self.last_index = index;
                self.timer = COMBO_RESET_TIME;
            }
            _ => self.reset(),
        }
    }

    pub fn on_attack_complete(&mut self, grounded: bool) {
        if !grounded {
            self.reset();
        }
    }

    /// Count the combo window down; frozen while an attack is playing
    pub fn tick(&mut self, dt: f32, frozen: bool) {
        if frozen || self.timer <= 0.0 {
            return;
        }
        self.timer -= dt;
        if self.timer <= 0.0 {
            self.timer = 0.0;
            self.last_index = 0;
        }
    }

    pub fn reset(&mut self) {
        self.last_index = 0;
        self.timer = 0.0;
    }

    pub fn last_index(&self) -> u8 {
        self.last_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swing(coordinator: &mut AttackCoordinator) -> AttackKind {
        let kind = coordinator.request(true);
        coordinator.on_attack_started(kind, true);
        kind
    }

    #[test]
    fn test_combo_chain_wraps() {
        let mut c = AttackCoordinator::default();
        assert_eq!(swing(&mut c), AttackKind::Ground1);
        assert_eq!(swing(&mut c), AttackKind::Ground2);
        assert_eq!(swing(&mut c), AttackKind::Ground3);
        assert_eq!(swing(&mut c), AttackKind::Ground1);
    }

    #[test]
    fn test_combo_window_expires() {
        let mut c = AttackCoordinator::default();
        swing(&mut c);
        c.tick(0.3, false);
        assert_eq!(c.request(true), AttackKind::Ground2);
        c.tick(0.31, false);
        assert_eq!(c.last_index(), 0);
        assert_eq!(c.request(true), AttackKind::Ground1);
    }

    #[test]
    fn test_frozen_tick_keeps_window() {
        let mut c = AttackCoordinator::default();
        swing(&mut c);
        c.tick(5.0, true);
        assert_eq!(c.request(true), AttackKind::Ground2);
    }

    #[test]
    fn test_air_attack_resets_combo() {
        let mut c = AttackCoordinator::default();
        swing(&mut c);
        assert_eq!(c.request(false), AttackKind::Air);
        assert_eq!(c.request(true), AttackKind::Ground1);
    }

    #[test]
    fn test_complete_airborne_resets() {
        let mut c = AttackCoordinator::default();
        swing(&mut c);
        c.on_attack_complete(true);
        assert_eq!(c.last_index(), 1);
        c.on_attack_complete(false);
        assert_eq!(c.last_index(), 0);
    }

    #[test]
    fn test_damage_table() {
        assert_eq!(AttackKind::Ground1.base_damage(), 10);
        assert_eq!(AttackKind::Ground3.base_damage(), 15);
        assert!(!AttackKind::Air.roots_in_place());
    }
}
