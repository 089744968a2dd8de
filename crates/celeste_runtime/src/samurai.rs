//! The player character: movement, combat and its state machine
//!
//! `Samurai` is plain data driven by [`Samurai::update`]. Things the rest of
//! the game must react to (a sword swing landing, the death animation ending)
//! are queued as [`SamuraiEvent`]s and collected with
//! [`Samurai::drain_events`].

use bevy::log::{debug, info};
use bevy::math::Vec2;
use celeste_animation::{AnimationSet, ClipSpec};
use celeste_core::{journal, LevelCollisionMap, PlayerConfig};
use std::sync::Arc;

use crate::attack::{AttackCoordinator, AttackKind};
use crate::controller::KinematicController;
use crate::health::{HealthComponent, HealthEvent};
use crate::powerup::{PowerUpSnapshot, PowerUpType, PowerUps, SamuraiAttributes};

pub const SAMURAI_SPRITE_DIR: &str = "assets/FULL_Samurai 2D Pixel Art v1.2/Sprites";
pub const SAMURAI_FRAME_SIZE: u32 = 96;

pub const RUN_SPEED: f32 = 220.0;
pub const JUMP_SPEED: f32 = 620.0;
pub const DASH_SPEED: f32 = 700.0;
pub const DASH_DURATION: f32 = 0.25;
pub const DASH_MAX_FRAMES: usize = 5;
pub const MAX_HEALTH: i32 = 100;
pub const HURT_TIME: f32 = 0.35;
pub const WALL_SLIDE_MAX_FALL: f32 = 120.0;
pub const WALL_JUMP_KICK: f32 = 260.0;
pub const WALL_JUMP_LOCK: f32 = 0.18;
pub const WATER_SPEED_FACTOR: f32 = 0.6;
pub const WATER_MAX_FALL: f32 = 200.0;
pub const SPECIAL_ATTACK_DAMAGE: i32 = 25;

const JOURNAL_NAME: &str = "Samurai";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamuraiAnimationKey {
    Idle,
    Run,
    Attack1,
    Attack2,
    Attack3,
    AirAttack,
    Jump,
    JumpTransition,
    JumpFall,
    Dash,
    WallContact,
    WallSlide,
    WallJump,
    Hurt,
    Death,
    Defend,
    SpecialAttack,
}

impl SamuraiAnimationKey {
    /// Sheet file and timing for every key
    pub fn clip_specs() -> Vec<(Self, ClipSpec)> {
        let size = SAMURAI_FRAME_SIZE;
        vec![
            (Self::Idle, ClipSpec::looping("IDLE.png", size, size, 0.08)),
            (Self::Run, ClipSpec::looping("RUN.png", size, size, 0.05)),
            (Self::Jump, ClipSpec::once("JUMP-START.png", size, size, 0.05)),
            (Self::JumpTransition, ClipSpec::once("JUMP-TRANSITION.png", size, size, 0.05)),
            (Self::JumpFall, ClipSpec::once("JUMP-FALL.png", size, size, 0.06)),
            (
                Self::Dash,
                ClipSpec::looping("DASH.png", size, size, 0.04).with_max_frames(DASH_MAX_FRAMES),
            ),
            (Self::Attack1, ClipSpec::once("ATTACK 1.png", size, size, 0.06)),
            (Self::Attack2, ClipSpec::once("ATTACK 2.png", size, size, 0.06)),
            (Self::Attack3, ClipSpec::once("ATTACK 3.png", size, size, 0.06)),
            (Self::AirAttack, ClipSpec::once("AIR ATTACK.png", size, size, 0.06)),
            (Self::Hurt, ClipSpec::once("HURT.png", size, size, 0.07)),
            (Self::Death, ClipSpec::once("DEATH.png", size, size, 0.1)),
            (Self::Defend, ClipSpec::looping("DEFEND.png", size, size, 0.08)),
            (Self::SpecialAttack, ClipSpec::once("SPECIAL ATTACK.png", size, size, 0.06)),
            (Self::WallContact, ClipSpec::once("WALL CONTACT.png", size, size, 0.08)),
            (Self::WallSlide, ClipSpec::looping("WALL SLIDE.png", size, size, 0.08)),
            (Self::WallJump, ClipSpec::once("WALL JUMP.png", size, size, 0.06)),
        ]
    }
}

impl From<AttackKind> for SamuraiAnimationKey {
    fn from(kind: AttackKind) -> Self {
        match kind {
            AttackKind::Ground1 => Self::Attack1,
            AttackKind::Ground2 => Self::Attack2,
            AttackKind::Ground3 => Self::Attack3,
            AttackKind::Air => Self::AirAttack,
        }
    }
}

pub type SamuraiClips = AnimationSet<SamuraiAnimationKey>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpPhase {
    Start,
    Transition,
    Fall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalIntent {
    None,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamuraiState {
    Idle,
    Run,
    Jump,
    Dash,
    Attack(AttackKind),
    Defend,
    SpecialAttack,
    Hurt,
    Death,
    WallContact,
    WallSlide,
    WallJump,
}

impl SamuraiState {
    pub fn name(&self) -> &'static str {
        match self {
            SamuraiState::Idle => "IDLE",
            SamuraiState::Run => "RUN",
            SamuraiState::Jump => "JUMP",
            SamuraiState::Dash => "DASH",
            SamuraiState::Attack(_) => "ATTACK",
            SamuraiState::Defend => "DEFEND",
            SamuraiState::SpecialAttack => "SPECIAL_ATTACK",
            SamuraiState::Hurt => "HURT",
            SamuraiState::Death => "DEATH",
            SamuraiState::WallContact => "WALL_CONTACT",
            SamuraiState::WallSlide => "WALL_SLIDE",
            SamuraiState::WallJump => "WALL_JUMP",
        }
    }

    fn is_wall(&self) -> bool {
        matches!(
            self,
            SamuraiState::WallContact | SamuraiState::WallSlide | SamuraiState::WallJump
        )
    }

    /// States that hold the samurai in place and block new actions
    fn is_rooted(&self) -> bool {
        match self {
            SamuraiState::Attack(kind) => kind.roots_in_place(),
            SamuraiState::Defend
            | SamuraiState::SpecialAttack
            | SamuraiState::Hurt
            | SamuraiState::Death => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamuraiEvent {
    /// A swing started; enemies in reach take `damage`
    AttackImpact { damage: i32, special: bool },
    /// The death animation has played out
    DeathFinished,
}

#[derive(Debug, Clone)]
pub struct Samurai {
    controller: KinematicController,
    state: SamuraiState,
    state_time: f32,
    jump_phase: JumpPhase,
    jump_phase_time: f32,
    facing_right: bool,
    move_intent: i8,
    vertical_intent: VerticalIntent,
    jump_available: bool,
    dash_available: bool,
    dashing: bool,
    dash_timer: f32,
    hurt_timer: f32,
    wall_jump_timer: f32,
    death_reported: bool,
    health: HealthComponent,
    power_ups: PowerUps,
    coordinator: AttackCoordinator,
    clips: SamuraiClips,
    render_offset: Vec2,
    events: Vec<SamuraiEvent>,
}

impl Samurai {
    pub fn new(clips: SamuraiClips, config: &PlayerConfig) -> Self {
        let mut controller = KinematicController::default();
        controller.configure_collider(
            config.collider_width,
            config.collider_height,
            config.collider_offset_x,
            config.collider_offset_y,
        );
        Self {
            controller,
            state: SamuraiState::Idle,
            state_time: 0.0,
            jump_phase: JumpPhase::Fall,
            jump_phase_time: 0.0,
            facing_right: true,
            move_intent: 0,
            vertical_intent: VerticalIntent::None,
            jump_available: true,
            dash_available: true,
            dashing: false,
            dash_timer: 0.0,
            hurt_timer: 0.0,
            wall_jump_timer: 0.0,
            death_reported: false,
            health: HealthComponent::new(MAX_HEALTH),
            power_ups: PowerUps::default(),
            coordinator: AttackCoordinator::default(),
            clips,
            render_offset: Vec2::new(config.render_offset_x, config.render_offset_y),
            events: Vec::new(),
        }
    }

    pub fn configure_physics(&mut self, gravity: f32, ground_y: f32) {
        self.controller.set_gravity(gravity);
        self.controller.set_ground_y(ground_y);
    }

    pub fn attach_collision_map(&mut self, map: Option<Arc<LevelCollisionMap>>) {
        self.controller.set_collision_map(map);
    }

    pub fn place_at(&mut self, x: f32, y: f32) {
        self.controller.place(x, y);
        info!("Samurai placed at ({}, {})", x, y);
    }

    /// Full reset for a new run
    pub fn revive_at(&mut self, x: f32, y: f32) {
        self.health.reset();
        self.power_ups.clear();
        self.coordinator.reset();
        self.events.clear();
        self.dashing = false;
        self.dash_timer = 0.0;
        self.hurt_timer = 0.0;
        self.wall_jump_timer = 0.0;
        self.death_reported = false;
        self.jump_available = true;
        self.dash_available = true;
        self.move_intent = 0;
        self.vertical_intent = VerticalIntent::None;
        self.facing_right = true;
        self.place_at(x, y);
        self.switch_state(SamuraiState::Idle);
    }

    fn switch_state(&mut self, next: SamuraiState) {
        debug!("Switching state from {} to {}", self.state.name(), next.name());
        self.state = next;
        self.state_time = 0.0;
        if next.is_rooted() {
            self.controller.stop_horizontal();
        }
    }

    fn enter_fall(&mut self) {
        self.jump_phase = JumpPhase::Fall;
        self.jump_phase_time = 0.0;
        self.switch_state(SamuraiState::Jump);
    }

    fn settle(&mut self) {
        if self.controller.is_grounded() {
            self.switch_state(SamuraiState::Idle);
        } else {
            self.enter_fall();
        }
    }

    fn attributes(&self) -> SamuraiAttributes {
        self.power_ups.attributes()
    }

    fn horizontal_speed(&self) -> f32 {
        let water = if self.controller.is_in_water() {
            WATER_SPEED_FACTOR
        } else {
            1.0
        };
        RUN_SPEED * self.attributes().speed_multiplier * water
    }

    /// Melee damage after power-ups
    pub fn attack_damage(&self, base: i32) -> i32 {
        let attrs = self.attributes();
        (base as f32 * attrs.attack_multiplier).round() as i32 + attrs.attack_bonus
    }

    fn clip_done(&self, key: SamuraiAnimationKey, time: f32) -> bool {
        self.clips.clip(key).map_or(true, |clip| time >= clip.duration())
    }

    pub fn update(&mut self, dt: f32) {
        self.state_time += dt;
        self.power_ups.tick(dt, JOURNAL_NAME);
        self.limit_fall_speed();
        self.controller.update(dt);
        self.tick_dash(dt);
        self.handle_grounding();
        self.update_wall_state();
        self.update_state(dt);
        self.update_jump_phase(dt);
        self.coordinator
            .tick(dt, matches!(self.state, SamuraiState::Attack(_)));
    }

    fn limit_fall_speed(&mut self) {
        let vy = self.controller.velocity().y;
        let mut cap = f32::INFINITY;
        if self.state == SamuraiState::WallSlide {
            cap = cap.min(WALL_SLIDE_MAX_FALL);
        }
        if self.controller.is_in_water() {
            cap = cap.min(WATER_MAX_FALL);
        }
        if vy < -cap {
            self.controller.set_vertical_velocity(-cap);
        }
    }

    fn tick_dash(&mut self, dt: f32) {
        if !self.dashing {
            return;
        }
        self.dash_timer -= dt;
        if self.dash_timer <= 0.0 {
            self.end_dash();
        }
    }

    fn end_dash(&mut self) {
        self.dashing = false;
        self.dash_timer = 0.0;
        self.controller.stop_horizontal();
        if self.controller.is_grounded() {
            self.dash_available = true;
        }
        if self.state == SamuraiState::Dash {
            self.settle();
        }
    }

    fn handle_grounding(&mut self) {
        if self.state == SamuraiState::Death {
            return;
        }
        if self.controller.is_grounded() {
            self.jump_available = true;
            if !self.dashing {
                self.dash_available = true;
                if self.state == SamuraiState::Jump || self.state.is_wall() {
                    self.switch_state(SamuraiState::Idle);
                }
            }
        } else if matches!(self.state, SamuraiState::Idle | SamuraiState::Run)
            && self.controller.velocity().y < 0.0
        {
            self.enter_fall();
        }
    }

    fn update_wall_state(&mut self) {
        if self.dashing || self.controller.is_grounded() {
            return;
        }
        if !matches!(
            self.state,
            SamuraiState::Jump | SamuraiState::WallContact | SamuraiState::WallSlide
        ) {
            return;
        }
        let pushing = (self.move_intent < 0 && self.controller.is_touching_wall_left())
            || (self.move_intent > 0 && self.controller.is_touching_wall_right());
        if pushing {
            let next = if self.controller.velocity().y >= 0.0 {
                SamuraiState::WallContact
            } else {
                SamuraiState::WallSlide
            };
            if self.state != next {
                self.switch_state(next);
            }
        } else if self.state.is_wall() {
            self.enter_fall();
        }
    }

    fn update_state(&mut self, dt: f32) {
        match self.state {
            SamuraiState::Attack(kind) => {
                if self.clip_done(kind.into(), self.state_time) {
                    self.coordinator
                        .on_attack_complete(self.controller.is_grounded());
                    self.settle();
                }
            }
            SamuraiState::SpecialAttack => {
                if self.clip_done(SamuraiAnimationKey::SpecialAttack, self.state_time) {
                    self.settle();
                }
            }
            SamuraiState::Hurt => {
                self.hurt_timer -= dt;
                if self.hurt_timer <= 0.0 {
                    self.settle();
                }
            }
            SamuraiState::Death => {
                if !self.death_reported
                    && self.clip_done(SamuraiAnimationKey::Death, self.state_time)
                {
                    self.death_reported = true;
                    self.events.push(SamuraiEvent::DeathFinished);
                }
            }
            SamuraiState::WallJump => {
                self.wall_jump_timer -= dt;
                if self.wall_jump_timer <= 0.0 {
                    self.enter_fall();
                }
            }
            _ => {}
        }
    }

    fn update_jump_phase(&mut self, dt: f32) {
        if self.state != SamuraiState::Jump {
            return;
        }
        self.jump_phase_time += dt;
        match self.jump_phase {
            JumpPhase::Start => {
                if self.jump_phase_time >= self.clips.duration(SamuraiAnimationKey::Jump) {
                    self.jump_phase = JumpPhase::Transition;
                    self.jump_phase_time = 0.0;
                }
            }
            JumpPhase::Transition => {
                if self.jump_phase_time
                    >= self.clips.duration(SamuraiAnimationKey::JumpTransition)
                {
                    self.jump_phase = JumpPhase::Fall;
                    self.jump_phase_time = 0.0;
                }
            }
            JumpPhase::Fall => {}
        }
    }

    fn can_act(&self) -> bool {
        !self.health.is_dead() && !matches!(self.state, SamuraiState::Hurt | SamuraiState::Death)
    }

    fn set_facing(&mut self, direction: f32) {
        if direction > 0.0 {
            self.facing_right = true;
        } else if direction < 0.0 {
            self.facing_right = false;
        }
    }

    pub fn move_left(&mut self) {
        self.move_horizontal(-1);
    }

    pub fn move_right(&mut self) {
        self.move_horizontal(1);
    }

    fn move_horizontal(&mut self, direction: i8) {
        self.move_intent = direction;
        if self.dashing || !self.can_act() || self.state.is_rooted() || self.wall_jump_timer > 0.0 {
            return;
        }
        let speed = self.horizontal_speed() * direction as f32;
        self.controller.set_horizontal_speed(speed);
        self.set_facing(speed);
        if self.controller.is_grounded() && self.state == SamuraiState::Idle {
            self.switch_state(SamuraiState::Run);
        }
    }

    pub fn stop_horizontal_movement(&mut self) {
        self.move_intent = 0;
        if self.dashing || self.wall_jump_timer > 0.0 {
            return;
        }
        self.controller.stop_horizontal();
        if self.state == SamuraiState::Run {
            self.switch_state(SamuraiState::Idle);
        }
    }

    pub fn aim_up(&mut self) {
        self.vertical_intent = VerticalIntent::Up;
    }

    pub fn aim_down(&mut self) {
        self.vertical_intent = VerticalIntent::Down;
    }

    pub fn clear_vertical_aim(&mut self) {
        self.vertical_intent = VerticalIntent::None;
    }

    /// Ground jump; returns whether it happened
    pub fn jump(&mut self) -> bool {
        if !self.can_act()
            || self.dashing
            || self.state.is_rooted()
            || !self.jump_available
            || !self.controller.is_grounded()
        {
            return false;
        }
        let speed = JUMP_SPEED * self.attributes().speed_multiplier;
        self.controller.set_vertical_velocity(speed);
        self.jump_available = false;
        self.jump_phase = JumpPhase::Start;
        self.jump_phase_time = 0.0;
        self.switch_state(SamuraiState::Jump);
        true
    }

    /// Kick off the wall being touched; returns whether it happened
    pub fn wall_jump(&mut self) -> bool {
        if !self.can_act() || self.dashing || self.controller.is_grounded() {
            return false;
        }
        let direction = if self.controller.is_touching_wall_left() {
            1.0
        } else if self.controller.is_touching_wall_right() {
            -1.0
        } else {
            return false;
        };
        let speed = self.attributes().speed_multiplier;
        self.controller
            .set_horizontal_speed(direction * WALL_JUMP_KICK * speed);
        self.controller.set_vertical_velocity(JUMP_SPEED * speed);
        self.set_facing(direction);
        self.wall_jump_timer = WALL_JUMP_LOCK;
        self.switch_state(SamuraiState::WallJump);
        true
    }

    /// Dash along `direction`; a zero vector dashes the way the samurai faces
    pub fn dash(&mut self, direction: Vec2) -> bool {
        if !self.dash_available || self.dashing || !self.can_act() || self.state.is_rooted() {
            return false;
        }
        let direction = if direction.length_squared() <= f32::EPSILON {
            Vec2::new(if self.facing_right { 1.0 } else { -1.0 }, 0.0)
        } else {
            direction.normalize()
        };
        let velocity = direction * DASH_SPEED * self.attributes().speed_multiplier;
        self.controller.set_horizontal_speed(velocity.x);
        self.controller.set_vertical_velocity(velocity.y);
        self.set_facing(direction.x);
        self.dashing = true;
        self.dash_available = false;
        self.dash_timer = DASH_DURATION;
        self.wall_jump_timer = 0.0;
        self.switch_state(SamuraiState::Dash);
        true
    }

    pub fn attack(&mut self) -> bool {
        if !self.can_act()
            || self.dashing
            || matches!(
                self.state,
                SamuraiState::Attack(_) | SamuraiState::SpecialAttack | SamuraiState::Defend
            )
        {
            return false;
        }
        let grounded = self.controller.is_grounded();
        let kind = self.coordinator.request(grounded);
        self.coordinator.on_attack_started(kind, grounded);
        self.switch_state(SamuraiState::Attack(kind));
        self.events.push(SamuraiEvent::AttackImpact {
            damage: self.attack_damage(kind.base_damage()),
            special: false,
        });
        true
    }

    pub fn special_attack(&mut self) -> bool {
        if !self.can_act()
            || self.dashing
            || matches!(
                self.state,
                SamuraiState::Attack(_) | SamuraiState::SpecialAttack | SamuraiState::Defend
            )
        {
            return false;
        }
        self.switch_state(SamuraiState::SpecialAttack);
        self.events.push(SamuraiEvent::AttackImpact {
            damage: self.attack_damage(SPECIAL_ATTACK_DAMAGE),
            special: true,
        });
        true
    }

    pub fn start_defend(&mut self) -> bool {
        if self.state == SamuraiState::Defend {
            return true;
        }
        if !self.can_act()
            || self.dashing
            || !self.controller.is_grounded()
            || matches!(self.state, SamuraiState::Attack(_) | SamuraiState::SpecialAttack)
        {
            return false;
        }
        self.switch_state(SamuraiState::Defend);
        true
    }

    pub fn stop_defend(&mut self) {
        if self.state == SamuraiState::Defend {
            self.settle();
        }
    }

    pub fn is_defending(&self) -> bool {
        self.state == SamuraiState::Defend
    }

    /// Take a hit; returns the damage actually applied
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        if amount <= 0 || self.health.is_dead() || self.is_defending() {
            return 0;
        }
        let scaled = ((amount as f32 * self.attributes().defense_multiplier).ceil() as i32).max(1);
        let events = self.health.damage(scaled);
        if events.contains(&HealthEvent::Died) {
            self.dashing = false;
            self.switch_state(SamuraiState::Death);
        } else if !events.is_empty() {
            self.dashing = false;
            self.hurt_timer = HURT_TIME;
            self.switch_state(SamuraiState::Hurt);
        }
        scaled
    }

    pub fn grant_power_up(&mut self, kind: PowerUpType) {
        self.power_ups.grant(kind, JOURNAL_NAME);
        info!("{} granted", kind.display_name());
    }

    pub fn active_power_ups(&self) -> &[PowerUpSnapshot] {
        self.power_ups.snapshots()
    }

    pub fn drain_events(&mut self) -> Vec<SamuraiEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn journal_name(&self) -> &'static str {
        JOURNAL_NAME
    }

    pub fn entity_created(&self) {
        journal::entity_created(JOURNAL_NAME, "player");
    }

    pub fn state(&self) -> SamuraiState {
        self.state
    }

    pub fn state_time(&self) -> f32 {
        self.state_time
    }

    pub fn jump_phase(&self) -> JumpPhase {
        self.jump_phase
    }

    pub fn vertical_intent(&self) -> VerticalIntent {
        self.vertical_intent
    }

    pub fn position(&self) -> Vec2 {
        self.controller.position()
    }

    pub fn velocity(&self) -> Vec2 {
        self.controller.velocity()
    }

    pub fn controller(&self) -> &KinematicController {
        &self.controller
    }

    pub fn is_facing_right(&self) -> bool {
        self.facing_right
    }

    pub fn is_dashing(&self) -> bool {
        self.dashing
    }

    pub fn is_dead(&self) -> bool {
        self.health.is_dead()
    }

    pub fn health(&self) -> &HealthComponent {
        &self.health
    }

    pub fn clips(&self) -> &SamuraiClips {
        &self.clips
    }

    /// Clip to show and how far into it
    pub fn current_animation(&self) -> (SamuraiAnimationKey, f32) {
        let key = match self.state {
            SamuraiState::Idle => SamuraiAnimationKey::Idle,
            SamuraiState::Run => SamuraiAnimationKey::Run,
            SamuraiState::Jump => match self.jump_phase {
                JumpPhase::Start => SamuraiAnimationKey::Jump,
                JumpPhase::Transition => SamuraiAnimationKey::JumpTransition,
                JumpPhase::Fall => SamuraiAnimationKey::JumpFall,
            },
            SamuraiState::Dash => SamuraiAnimationKey::Dash,
            SamuraiState::Attack(kind) => kind.into(),
            SamuraiState::Defend => SamuraiAnimationKey::Defend,
            SamuraiState::SpecialAttack => SamuraiAnimationKey::SpecialAttack,
            SamuraiState::Hurt => SamuraiAnimationKey::Hurt,
            SamuraiState::Death => SamuraiAnimationKey::Death,
            SamuraiState::WallContact => SamuraiAnimationKey::WallContact,
            SamuraiState::WallSlide => SamuraiAnimationKey::WallSlide,
            SamuraiState::WallJump => SamuraiAnimationKey::WallJump,
        };
        let time = if self.state == SamuraiState::Jump {
            self.jump_phase_time
        } else {
            self.state_time
        };
        if self.clips.contains(key) {
            (key, time)
        } else {
            (SamuraiAnimationKey::Idle, self.state_time)
        }
    }

    /// Bottom-left corner of the sprite in world space
    pub fn render_origin(&self) -> Vec2 {
        self.controller.position() + self.render_offset
    }
}
