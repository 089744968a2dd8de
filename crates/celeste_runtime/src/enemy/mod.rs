//! Enemy variants, instances and the manager that spawns them

mod definition;
mod instance;
mod manager;
mod node;

pub use definition::{
    EnemyAnimationKey, EnemyDefinition, EnemyDefinitionBuilder, EnemyRegistry, EnemyStats,
    DEFAULT_ATTACK_COOLDOWN, DEFAULT_ATTACK_RANGE,
};
pub use instance::{EnemyClips, EnemyInstance, EnemyState, HealthBar, HURT_TIME};
pub use manager::{EnemyManager, EnemyView, ATTACK_POINT_LEFT, ATTACK_POINT_RIGHT, MELEE_RANGE};
pub use node::{EnemyNode, MeleeHit, STRIKE_DAMAGE_FRACTION};
