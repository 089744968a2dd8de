//! A single spawned enemy

use bevy::math::{Rect, Vec2};
use celeste_animation::{AnimationSet, SheetAnimation};
use celeste_core::journal;
use std::sync::Arc;

use super::definition::{EnemyAnimationKey, EnemyDefinition};
use crate::error::EnemyError;
use crate::health::{HealthComponent, HealthEvent};

pub type EnemyClips = AnimationSet<EnemyAnimationKey>;

pub const HURT_TIME: f32 = 0.3;
pub const HEALTH_BAR_HEIGHT: f32 = 6.0;
pub const HEALTH_BAR_GAP: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyState {
    Idle,
    Hurt,
    Attack,
    Death,
}

impl EnemyState {
    fn animation_key(&self) -> EnemyAnimationKey {
        match self {
            EnemyState::Idle => EnemyAnimationKey::Idle,
            EnemyState::Hurt => EnemyAnimationKey::Hurt,
            EnemyState::Attack => EnemyAnimationKey::Attack,
            EnemyState::Death => EnemyAnimationKey::Death,
        }
    }
}

/// Geometry of the bar drawn above a living enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthBar {
    /// Bottom-left corner in world space
    pub origin: Vec2,
    pub width: f32,
    pub height: f32,
    pub fraction: f32,
    /// One segment per ten hit points
    pub segments: u32,
}

#[derive(Debug, Clone)]
pub struct EnemyInstance {
    uid: u64,
    definition: Arc<EnemyDefinition>,
    clips: Arc<EnemyClips>,
    position: Vec2,
    size: Vec2,
    state: EnemyState,
    state_time: f32,
    hurt_timer: f32,
    cooldown: f32,
    strike_pending: bool,
    health: HealthComponent,
}

impl EnemyInstance {
    /// Spawn with its bottom-left corner at `position`.
    ///
    /// Fails when the IDLE sheet could not be loaded.
    pub fn new(
        uid: u64,
        definition: Arc<EnemyDefinition>,
        clips: Arc<EnemyClips>,
        position: Vec2,
    ) -> Result<Self, EnemyError> {
        let idle = clips
            .get(EnemyAnimationKey::Idle)
            .ok_or_else(|| EnemyError::MissingIdle(definition.id.clone()))?;
        let size = idle.sheet.frame_size();
        let health = HealthComponent::new(definition.stats.max_health);
        journal::entity_created("Enemy", &definition.id);
        Ok(Self {
            uid,
            definition,
            clips,
            position,
            size,
            state: EnemyState::Idle,
            state_time: 0.0,
            hurt_timer: 0.0,
            cooldown: 0.0,
            strike_pending: false,
            health,
        })
    }

    pub fn update(&mut self, dt: f32, player: Option<Vec2>) {
        if self.health.is_dead() {
            let death = self.clips.duration(EnemyAnimationKey::Death);
            self.state_time = (self.state_time + dt).min(death);
            return;
        }
        self.state_time += dt;
        self.cooldown = (self.cooldown - dt).max(0.0);

        if self.hurt_timer > 0.0 {
            self.hurt_timer -= dt;
            if self.hurt_timer <= 0.0 {
                self.change_state(EnemyState::Idle);
            }
            return;
        }

        let in_range = player.is_some_and(|p| self.in_attack_range(p));
        let ready = in_range && self.cooldown <= 0.0;
        match self.state {
            EnemyState::Attack => {
                if self.state_time >= self.attack_cycle() {
                    if ready {
                        self.start_attack();
                    } else {
                        self.change_state(EnemyState::Idle);
                    }
                }
            }
            _ => {
                if ready {
                    self.start_attack();
                }
            }
        }
    }

    fn attack_cycle(&self) -> f32 {
        let clip = self.clips.duration(EnemyAnimationKey::Attack);
        if clip > 0.0 {
            clip
        } else {
            self.definition.stats.attack_cooldown.max(0.1)
        }
    }

    fn start_attack(&mut self) {
        self.change_state(EnemyState::Attack);
        self.strike_pending = true;
        self.cooldown = self.definition.stats.attack_cooldown;
    }

    fn change_state(&mut self, state: EnemyState) {
        self.state = state;
        self.state_time = 0.0;
    }

    pub fn in_attack_range(&self, point: Vec2) -> bool {
        self.center().distance(point) <= self.definition.stats.attack_range
    }

    /// Whether a melee swing centred on `point` with `reach` connects
    pub fn within_reach(&self, point: Vec2, reach: f32) -> bool {
        let radius = self.definition.stats.contact_radius + reach;
        self.center().distance_squared(point) <= radius * radius
    }

    /// Consume this attack cycle's strike; true once per cycle
    pub fn take_strike(&mut self) -> bool {
        if self.state != EnemyState::Attack || !self.strike_pending || self.health.is_dead() {
            return false;
        }
        self.strike_pending = false;
        true
    }

    /// Returns true when this hit defeated the enemy
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        if self.health.is_dead() {
            return false;
        }
        let events = self.health.damage(amount);
        if events.is_empty() {
            return false;
        }
        journal::info(&format!(
            "{} took {} dmg (hp={}/{})",
            self.definition.id,
            amount,
            self.health.current(),
            self.health.max()
        ));
        if events.contains(&HealthEvent::Died) {
            self.strike_pending = false;
            self.hurt_timer = 0.0;
            self.change_state(EnemyState::Death);
            true
        } else {
            self.hurt_timer = HURT_TIME;
            self.change_state(EnemyState::Hurt);
            false
        }
    }

    /// Defeated and the death clip has played out
    pub fn is_dead(&self) -> bool {
        if !self.health.is_dead() {
            return false;
        }
        match self.clips.clip(EnemyAnimationKey::Death) {
            Some(death) => death.is_finished(self.state_time),
            None => true,
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.health.is_dead()
    }

    pub fn dispose(&self) {
        journal::entity_destroyed("Enemy", &self.definition.id);
    }

    pub fn health_bar(&self) -> Option<HealthBar> {
        if self.health.is_dead() {
            return None;
        }
        let max = self.health.max();
        Some(HealthBar {
            origin: Vec2::new(self.position.x, self.position.y + self.size.y + HEALTH_BAR_GAP),
            width: self.size.x,
            height: HEALTH_BAR_HEIGHT,
            fraction: self.health.fraction().max(0.0),
            segments: ((max as f32 / 10.0).ceil() as u32).max(1),
        })
    }

    /// Sheet and time of the clip to draw; falls back to IDLE
    pub fn current_frame(&self) -> Option<(&SheetAnimation, Rect)> {
        let key = self.state.animation_key();
        let (animation, time) = match self.clips.get(key) {
            Some(animation) => (animation, self.state_time),
            None => (self.clips.get(EnemyAnimationKey::Idle)?, self.state_time),
        };
        Some((animation, animation.rect_at(time)))
    }

    pub fn uid(&self) -> u64 {
        self.uid
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn definition(&self) -> &EnemyDefinition {
        &self.definition
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    pub fn health(&self) -> &HealthComponent {
        &self.health
    }
}
