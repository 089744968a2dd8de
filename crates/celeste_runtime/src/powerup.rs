//! Timed power-ups layered over the samurai's base attributes

use celeste_core::journal;

/// Combat and movement multipliers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamuraiAttributes {
    pub attack_multiplier: f32,
    pub attack_bonus: i32,
    pub defense_multiplier: f32,
    pub speed_multiplier: f32,
}

impl Default for SamuraiAttributes {
    fn default() -> Self {
        Self {
            attack_multiplier: 1.0,
            attack_bonus: 0,
            defense_multiplier: 1.0,
            speed_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpType {
    Shield,
    Speed,
    Weapon,
}

impl PowerUpType {
    pub fn display_name(&self) -> &'static str {
        match self {
            PowerUpType::Shield => "Aegis Shield",
            PowerUpType::Speed => "Windrunner Boots",
            PowerUpType::Weapon => "Crimson Blade",
        }
    }

    /// Seconds the effect lasts
    pub fn duration(&self) -> f32 {
        match self {
            PowerUpType::Shield => 15.0,
            PowerUpType::Speed => 12.0,
            PowerUpType::Weapon => 10.0,
        }
    }

    pub fn all() -> &'static [PowerUpType] {
        &[PowerUpType::Shield, PowerUpType::Speed, PowerUpType::Weapon]
    }

    /// Wrap `base` with this power-up's effect
    pub fn decorate(&self, base: SamuraiAttributes) -> SamuraiAttributes {
        match self {
            PowerUpType::Shield => SamuraiAttributes {
                defense_multiplier: (base.defense_multiplier * 0.6).max(0.1),
                ..base
            },
            PowerUpType::Speed => SamuraiAttributes {
                speed_multiplier: base.speed_multiplier * 1.35,
                ..base
            },
            PowerUpType::Weapon => SamuraiAttributes {
                attack_multiplier: base.attack_multiplier * 1.4,
                attack_bonus: base.attack_bonus + 6,
                ..base
            },
        }
    }
}

/// Entry shown in the HUD
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUpSnapshot {
    pub kind: PowerUpType,
    pub remaining: f32,
}

impl PowerUpSnapshot {
    pub fn label(&self) -> String {
        format!("{} ({:.1}s)", self.kind.display_name(), self.remaining)
    }
}

/// Active power-ups in grant order
#[derive(Debug, Clone, Default)]
pub struct PowerUps {
    active: Vec<PowerUpSnapshot>,
}

impl PowerUps {
    /// Grant a power-up, or refresh its timer when already active
    pub fn grant(&mut self, kind: PowerUpType, target: &str) {
        match self.active.iter_mut().find(|p| p.kind == kind) {
            Some(existing) => existing.remaining = kind.duration(),
            None => self.active.push(PowerUpSnapshot {
                kind,
                remaining: kind.duration(),
            }),
        }
        journal::decorator_applied(kind.display_name(), target, Some(kind.duration()));
    }

    /// Count timers down; returns the power-ups that ran out
    pub fn tick(&mut self, dt: f32, target: &str) -> Vec<PowerUpType> {
        let mut expired = Vec::new();
        self.active.retain_mut(|p| {
            p.remaining -= dt;
            if p.remaining <= 0.0 {
                expired.push(p.kind);
                false
            } else {
                true
            }
        });
        for kind in &expired {
            journal::decorator_removed(kind.display_name(), target);
        }
        expired
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn is_active(&self, kind: PowerUpType) -> bool {
        self.active.iter().any(|p| p.kind == kind)
    }

    pub fn snapshots(&self) -> &[PowerUpSnapshot] {
        &self.active
    }

    /// Base attributes with every active effect applied in grant order
    pub fn attributes(&self) -> SamuraiAttributes {
        self.active
            .iter()
            .fold(SamuraiAttributes::default(), |attrs, p| p.kind.decorate(attrs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decorators_stack() {
        let mut power_ups = PowerUps::default();
        power_ups.grant(PowerUpType::Weapon, "Samurai");
        power_ups.grant(PowerUpType::Shield, "Samurai");
        let attrs = power_ups.attributes();
        assert!((attrs.attack_multiplier - 1.4).abs() < 1e-6);
        assert_eq!(attrs.attack_bonus, 6);
        assert!((attrs.defense_multiplier - 0.6).abs() < 1e-6);
        assert_eq!(attrs.speed_multiplier, 1.0);
    }

    #[test]
    fn test_shield_floor() {
        let mut attrs = SamuraiAttributes::default();
        for _ in 0..10 {
            attrs = PowerUpType::Shield.decorate(attrs);
        }
        assert!((attrs.defense_multiplier - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_regrant_refreshes() {
        let mut power_ups = PowerUps::default();
        power_ups.grant(PowerUpType::Speed, "Samurai");
        power_ups.tick(5.0, "Samurai");
        power_ups.grant(PowerUpType::Speed, "Samurai");
        assert_eq!(power_ups.snapshots().len(), 1);
        assert_eq!(power_ups.snapshots()[0].remaining, 12.0);
    }

    #[test]
    fn test_expiry() {
        let mut power_ups = PowerUps::default();
        power_ups.grant(PowerUpType::Weapon, "Samurai");
        power_ups.grant(PowerUpType::Shield, "Samurai");
        assert!(power_ups.tick(9.5, "Samurai").is_empty());
        assert_eq!(power_ups.tick(1.0, "Samurai"), vec![PowerUpType::Weapon]);
        assert!(!power_ups.is_active(PowerUpType::Weapon));
        assert!(power_ups.is_active(PowerUpType::Shield));
    }

    #[test]
    fn test_snapshot_label() {
        let snapshot = PowerUpSnapshot {
            kind: PowerUpType::Speed,
            remaining: 11.96,
        };
        assert_eq!(snapshot.label(), "Windrunner Boots (12.0s)");
    }
}
