//! Enemy variants: stats, animation sheets and the registry of known ids

use bevy::math::Vec2;
use celeste_animation::ClipSpec;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::EnemyError;

pub const DEFAULT_ATTACK_RANGE: f32 = 80.0;
pub const DEFAULT_ATTACK_COOLDOWN: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyAnimationKey {
    Idle,
    Hurt,
    Attack,
    Death,
    Fly,
}

impl EnemyAnimationKey {
    pub fn name(&self) -> &'static str {
        match self {
            EnemyAnimationKey::Idle => "IDLE",
            EnemyAnimationKey::Hurt => "HURT",
            EnemyAnimationKey::Attack => "ATTACK",
            EnemyAnimationKey::Death => "DEATH",
            EnemyAnimationKey::Fly => "FLY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub max_health: i32,
    pub contact_radius: f32,
    /// Distance from the enemy's center at which it starts swinging
    pub attack_range: f32,
    /// Seconds between attack cycles
    pub attack_cooldown: f32,
}

impl EnemyStats {
    pub fn new(max_health: i32, contact_radius: f32) -> Self {
        Self {
            max_health: max_health.max(1),
            contact_radius,
            attack_range: DEFAULT_ATTACK_RANGE,
            attack_cooldown: DEFAULT_ATTACK_COOLDOWN,
        }
    }

    pub fn with_attack(mut self, range: f32, cooldown: f32) -> Self {
        self.attack_range = range;
        self.attack_cooldown = cooldown.max(0.0);
        self
    }
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self::new(50, 48.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemyDefinition {
    pub id: String,
    pub asset_root: PathBuf,
    pub stats: EnemyStats,
    pub animations: Vec<(EnemyAnimationKey, ClipSpec)>,
    pub render_scale: f32,
    /// Pixel origin inside the frame, measured from the bottom-left
    pub render_origin: Vec2,
}

impl EnemyDefinition {
    pub fn builder(id: impl Into<String>, asset_root: impl Into<PathBuf>) -> EnemyDefinitionBuilder {
        EnemyDefinitionBuilder {
            id: id.into(),
            asset_root: asset_root.into(),
            stats: EnemyStats::default(),
            animations: Vec::new(),
            render_scale: 1.0,
            render_origin: Vec2::ZERO,
        }
    }

    pub fn spec(&self, key: EnemyAnimationKey) -> Option<&ClipSpec> {
        self.animations
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, spec)| spec)
    }
}

pub struct EnemyDefinitionBuilder {
    id: String,
    asset_root: PathBuf,
    stats: EnemyStats,
    animations: Vec<(EnemyAnimationKey, ClipSpec)>,
    render_scale: f32,
    render_origin: Vec2,
}

impl EnemyDefinitionBuilder {
    pub fn stats(mut self, stats: EnemyStats) -> Self {
        self.stats = stats;
        self
    }

    /// Add or replace the clip for `key`
    pub fn animation(mut self, key: EnemyAnimationKey, spec: ClipSpec) -> Self {
        self.animations.retain(|(k, _)| *k != key);
        self.animations.push((key, spec));
        self
    }

    pub fn render_scale(mut self, scale: f32) -> Self {
        self.render_scale = scale;
        self
    }

    pub fn render_origin(mut self, x: f32, y: f32) -> Self {
        self.render_origin = Vec2::new(x, y);
        self
    }

    pub fn build(self) -> Result<EnemyDefinition, EnemyError> {
        if !self.animations.iter().any(|(k, _)| *k == EnemyAnimationKey::Idle) {
            return Err(EnemyError::MissingIdle(self.id));
        }
        Ok(EnemyDefinition {
            id: self.id,
            asset_root: self.asset_root,
            stats: self.stats,
            animations: self.animations,
            render_scale: self.render_scale,
            render_origin: self.render_origin,
        })
    }
}

/// Lookup table of enemy variants by id
#[derive(Debug, Clone, Default)]
pub struct EnemyRegistry {
    definitions: HashMap<String, Arc<EnemyDefinition>>,
}

impl EnemyRegistry {
    /// Registry holding the built-in variants
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.register(red_deon());
        registry
    }

    pub fn register(&mut self, definition: EnemyDefinition) {
        self.definitions
            .insert(definition.id.clone(), Arc::new(definition));
    }

    pub fn definition(&self, id: &str) -> Option<Arc<EnemyDefinition>> {
        self.definitions.get(id).cloned()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }
}

fn red_deon() -> EnemyDefinition {
    let (w, h) = (79, 69);
    EnemyDefinition {
        id: "redDeon".to_string(),
        asset_root: PathBuf::from("assets/emenies/redDeon"),
        stats: EnemyStats::new(150, 60.0),
        animations: vec![
            (EnemyAnimationKey::Idle, ClipSpec::looping("IDLE.png", w, h, 0.1)),
            (EnemyAnimationKey::Hurt, ClipSpec::once("HURT.png", w, h, 0.08)),
            (EnemyAnimationKey::Attack, ClipSpec::looping("ATTACK.png", w, h, 0.08)),
            (EnemyAnimationKey::Death, ClipSpec::once("DEATH.png", w, h, 0.12)),
            (EnemyAnimationKey::Fly, ClipSpec::looping("FLYING.png", w, h, 0.08)),
        ],
        render_scale: 1.0,
        render_origin: Vec2::ZERO,
    }
}
