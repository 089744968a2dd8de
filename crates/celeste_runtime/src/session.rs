//! Game flow: menu, runs, pause, score and the win/lose rules
//!
//! [`GameSession`] owns the samurai and the enemies and is advanced once per
//! frame with the frame's [`InputFrame`]. It knows nothing about windows or
//! rendering, so the whole flow can be driven from tests.

use bevy::log::info;
use bevy::math::Vec2;
use bevy::prelude::Resource;
use celeste_core::{journal, EnemySpawn};

use crate::commands::{SamuraiCommand, SamuraiCommands};
use crate::enemy::{EnemyManager, MeleeHit};
use crate::powerup::PowerUpType;
use crate::samurai::{Samurai, SamuraiEvent};

pub const SCORE_PER_ENEMY: u32 = 100;
/// Samurai spawn, in tiles from the bottom-left of the level
pub const SPAWN_TILE: Vec2 = Vec2::new(1.0, 2.0);
pub const GRAVITY: f32 = -1800.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    Menu,
    Playing,
    Paused,
    GameOver,
    Victory,
}

impl GameState {
    pub fn name(&self) -> &'static str {
        match self {
            GameState::Menu => "MENU",
            GameState::Playing => "PLAYING",
            GameState::Paused => "PAUSED",
            GameState::GameOver => "GAME_OVER",
            GameState::Victory => "VICTORY",
        }
    }

    /// Title and subtitle drawn over the level, `None` while playing
    pub fn overlay(&self) -> Option<(&'static str, &'static str)> {
        match self {
            GameState::Menu => Some((
                "Press ENTER to begin",
                "Controls: WASD move, SPACE jump, J attack, E special, RMB defend",
            )),
            GameState::Paused => Some(("Paused", "Press ESC to resume or M for menu")),
            GameState::GameOver => Some(("Game Over", "Press ENTER to retry or M for menu")),
            GameState::Victory => Some(("Victory!", "Press ENTER for another run")),
            GameState::Playing => None,
        }
    }
}

/// Inputs sampled for one frame.
///
/// Directions, `defend` are held states; everything else is "just pressed".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub defend: bool,
    pub jump: bool,
    pub attack: bool,
    pub special: bool,
    pub dash: bool,
    pub pause: bool,
    pub confirm: bool,
    pub retry: bool,
    pub menu: bool,
    pub power_up: Option<PowerUpType>,
}

/// `MM:SS` of whole elapsed seconds
pub fn format_clock(seconds: f32) -> String {
    let total = seconds.max(0.0) as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[derive(Resource)]
pub struct GameSession {
    state: GameState,
    samurai: Samurai,
    enemies: EnemyManager,
    commands: SamuraiCommands,
    spawns: Vec<EnemySpawn>,
    rows: usize,
    tile_size: f32,
    spawn_point: Vec2,
    score: u32,
    play_timer: f32,
    elapsed: f32,
    enemies_were_spawned: bool,
}

impl GameSession {
    /// Place the samurai, spawn the enemies and open the menu
    pub fn new(
        mut samurai: Samurai,
        mut enemies: EnemyManager,
        spawns: Vec<EnemySpawn>,
        rows: usize,
        tile_size: f32,
    ) -> Self {
        journal::info("Game started");
        let spawn_point = SPAWN_TILE * tile_size;
        samurai.place_at(spawn_point.x, spawn_point.y);
        samurai.configure_physics(GRAVITY, 0.0);
        info!("Samurai initialized at ({}, {})", spawn_point.x, spawn_point.y);
        samurai.entity_created();
        if !spawns.is_empty() {
            enemies.spawn_all(&spawns, rows, tile_size);
        }
        Self {
            state: GameState::Menu,
            samurai,
            enemies,
            commands: SamuraiCommands::default(),
            spawns,
            rows,
            tile_size,
            spawn_point,
            score: 0,
            play_timer: 0.0,
            elapsed: 0.0,
            enemies_were_spawned: false,
        }
    }

    /// Change state; returns false when already there
    pub fn transition(&mut self, next: GameState) -> bool {
        if next == self.state {
            return false;
        }
        journal::state_transition("Game", self.state.name(), next.name());
        info!("Game state {} -> {}", self.state.name(), next.name());
        self.state = next;
        true
    }

    pub fn start_new_run(&mut self) {
        self.score = 0;
        self.play_timer = 0.0;
        self.commands.release_all(&mut self.samurai);
        self.samurai
            .revive_at(self.spawn_point.x, self.spawn_point.y);
        self.samurai.entity_created();
        self.enemies
            .respawn(&self.spawns, self.rows, self.tile_size);
        self.enemies_were_spawned = !self.enemies.is_empty();
        self.transition(GameState::Playing);
    }

    /// Handle input, then advance the world by `dt` (frozen outside play)
    pub fn frame(&mut self, input: &InputFrame, dt: f32) {
        self.elapsed += dt;
        self.handle_input(input, dt);
        let simulation_dt = if self.state == GameState::Playing {
            dt
        } else {
            0.0
        };
        self.update_world(simulation_dt);
        if self.state == GameState::Playing {
            self.play_timer += dt;
        }
    }

    pub fn handle_input(&mut self, input: &InputFrame, dt: f32) {
        match self.state {
            GameState::Menu => {
                if input.confirm {
                    self.start_new_run();
                }
            }
            GameState::Playing => self.handle_playing_input(input, dt),
            GameState::Paused => {
                if input.pause {
                    self.transition(GameState::Playing);
                } else if input.menu {
                    self.transition(GameState::Menu);
                }
            }
            GameState::GameOver => {
                if input.confirm || input.retry {
                    self.start_new_run();
                } else if input.menu {
                    self.transition(GameState::Menu);
                }
            }
            GameState::Victory => {
                if input.confirm {
                    self.start_new_run();
                } else if input.menu {
                    self.transition(GameState::Menu);
                }
            }
        }
    }

    fn handle_playing_input(&mut self, input: &InputFrame, dt: f32) {
        let samurai = &mut self.samurai;
        let commands = &mut self.commands;

        if input.left && !input.right {
            commands.move_left.execute(samurai, dt);
            commands.move_right.release(samurai);
        } else if input.right && !input.left {
            commands.move_right.execute(samurai, dt);
            commands.move_left.release(samurai);
        } else {
            commands.move_left.release(samurai);
            commands.move_right.release(samurai);
        }

        if input.up && !input.down {
            commands.move_up.execute(samurai, dt);
            commands.move_down.release(samurai);
        } else if input.down && !input.up {
            commands.move_down.execute(samurai, dt);
            commands.move_up.release(samurai);
        } else {
            commands.move_up.release(samurai);
            commands.move_down.release(samurai);
        }

        if input.jump {
            commands.jump.execute(samurai, dt);
        }
        if input.attack {
            commands.attack.execute(samurai, dt);
        }
        if input.special {
            commands.special_attack.execute(samurai, dt);
        }
        if input.defend {
            commands.defend.execute(samurai, dt);
        } else {
            commands.defend.release(samurai);
        }
        if input.dash {
            let x = input.right as i8 - input.left as i8;
            let y = input.up as i8 - input.down as i8;
            commands.dash.set_direction(x as f32, y as f32);
            commands.dash.execute(samurai, dt);
        }
        if let Some(kind) = input.power_up {
            samurai.grant_power_up(kind);
        }
        if input.pause {
            self.transition(GameState::Paused);
        }
    }

    fn update_world(&mut self, dt: f32) {
        self.samurai.update(dt);
        for event in self.samurai.drain_events() {
            match event {
                SamuraiEvent::AttackImpact { damage, .. } => {
                    if let Some(MeleeHit::Defeated { id }) =
                        self.enemies.apply_melee_damage(&self.samurai, damage)
                    {
                        self.on_enemy_defeated(&id);
                    }
                }
                SamuraiEvent::DeathFinished => self.on_samurai_death(),
            }
        }

        if self.samurai.is_dead() {
            self.enemies.update(dt, None);
        } else {
            let target = self.samurai.controller().collider_center();
            self.enemies.update(dt, Some(target));
            self.enemies.check_attacks(&mut self.samurai);
        }

        if dt > 0.0
            && self.state == GameState::Playing
            && self.enemies_were_spawned
            && self.enemies.is_empty()
        {
            self.transition(GameState::Victory);
        }
    }

    fn on_samurai_death(&mut self) {
        journal::entity_destroyed("Samurai", "player");
        self.transition(GameState::GameOver);
    }

    fn on_enemy_defeated(&mut self, id: &str) {
        self.score += SCORE_PER_ENEMY;
        journal::info(&format!("Enemy defeated: {} (score={})", id, self.score));
    }

    /// Shut down: the run counts as lost
    pub fn exit(&mut self) {
        if self.state != GameState::GameOver {
            self.transition(GameState::GameOver);
        }
        self.enemies.clear();
        journal::info("Game terminated");
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn samurai(&self) -> &Samurai {
        &self.samurai
    }

    pub fn samurai_mut(&mut self) -> &mut Samurai {
        &mut self.samurai
    }

    pub fn enemies(&self) -> &EnemyManager {
        &self.enemies
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn play_time(&self) -> f32 {
        self.play_timer
    }

    pub fn clock(&self) -> String {
        format_clock(self.play_timer)
    }

    /// Seconds since the session started, for tile animation
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::{EnemyAnimationKey, EnemyClips, EnemyDefinition, EnemyRegistry, EnemyStats};
    use crate::samurai::SamuraiClips;
    use celeste_animation::{AnimationClip, ClipSpec, LoopMode, SheetAnimation, SpriteSheet};
    use celeste_core::PlayerConfig;

    const DT: f32 = 1.0 / 60.0;

    fn idle_sheet() -> SheetAnimation {
        let mut sheet = SpriteSheet::new("IDLE.png", 40, 40);
        sheet.update_from_image_size(160, 40);
        SheetAnimation {
            sheet,
            clip: AnimationClip::new(4, 0.1, LoopMode::Loop),
        }
    }

    /// Flat level of 4 rows at 32 units per tile; the spawn list has one dummy
    fn session(spawns: Vec<EnemySpawn>) -> GameSession {
        let mut registry = EnemyRegistry::default();
        registry.register(
            EnemyDefinition::builder("dummy", "assets/dummy")
                .stats(EnemyStats::new(20, 30.0).with_attack(0.0, 5.0))
                .animation(EnemyAnimationKey::Idle, ClipSpec::looping("IDLE.png", 40, 40, 0.1))
                .build()
                .unwrap(),
        );
        let mut enemies = EnemyManager::new(registry, ".");
        let mut clips = EnemyClips::default();
        clips.insert(EnemyAnimationKey::Idle, idle_sheet());
        enemies.set_clips("dummy", clips);

        let samurai = Samurai::new(SamuraiClips::default(), &PlayerConfig::default());
        GameSession::new(samurai, enemies, spawns, 4, 32.0)
    }

    fn dummy_at(row: usize, col: usize) -> EnemySpawn {
        EnemySpawn {
            name: "dummy".to_string(),
            row,
            col,
        }
    }

    fn press(f: impl FnOnce(&mut InputFrame)) -> InputFrame {
        let mut input = InputFrame::default();
        f(&mut input);
        input
    }

    #[test]
    fn test_clock_format() {
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(61.9), "01:01");
        assert_eq!(format_clock(-3.0), "00:00");
        assert_eq!(format_clock(3600.0), "60:00");
    }

    #[test]
    fn test_menu_is_frozen() {
        let mut session = session(Vec::new());
        assert_eq!(session.state(), GameState::Menu);
        let start = session.samurai().position();
        session.frame(&InputFrame::default(), 0.5);
        assert_eq!(session.samurai().position(), start);
        assert_eq!(session.play_time(), 0.0);
        assert_eq!(session.elapsed(), 0.5);
    }

    #[test]
    fn test_same_state_transition_ignored() {
        let mut session = session(Vec::new());
        assert!(!session.transition(GameState::Menu));
        assert!(session.transition(GameState::Paused));
    }

    #[test]
    fn test_pause_and_resume() {
        let mut session = session(Vec::new());
        session.frame(&press(|i| i.confirm = true), DT);
        assert_eq!(session.state(), GameState::Playing);
        session.frame(&InputFrame::default(), 1.0);
        assert_eq!(session.clock(), "00:01");

        session.frame(&press(|i| i.pause = true), DT);
        assert_eq!(session.state(), GameState::Paused);
        let frozen = session.play_time();
        session.frame(&InputFrame::default(), 5.0);
        assert_eq!(session.play_time(), frozen);

        session.frame(&press(|i| i.pause = true), DT);
        assert_eq!(session.state(), GameState::Playing);
        session.frame(&press(|i| i.pause = true), DT);
        session.frame(&press(|i| i.menu = true), DT);
        assert_eq!(session.state(), GameState::Menu);
    }

    #[test]
    fn test_no_victory_without_enemies() {
        let mut session = session(Vec::new());
        session.frame(&press(|i| i.confirm = true), DT);
        for _ in 0..10 {
            session.frame(&InputFrame::default(), DT);
        }
        assert_eq!(session.state(), GameState::Playing);
    }

    #[test]
    fn test_defeating_all_enemies_wins() {
        // Enemy on the spawn row right in front of the sword
        let mut session = session(vec![dummy_at(1, 2)]);
        session.frame(&press(|i| i.confirm = true), DT);
        for _ in 0..30 {
            session.frame(&InputFrame::default(), DT);
        }
        assert_eq!(session.enemies().len(), 1);

        session.samurai_mut().grant_power_up(PowerUpType::Weapon);
        session.frame(&press(|i| i.attack = true), DT);
        assert_eq!(session.score(), SCORE_PER_ENEMY);
        assert_eq!(session.state(), GameState::Victory);

        session.frame(&press(|i| i.confirm = true), DT);
        assert_eq!(session.state(), GameState::Playing);
        assert_eq!(session.score(), 0);
        assert_eq!(session.enemies().len(), 1);
    }

    #[test]
    fn test_death_ends_run_and_retry_revives() {
        let mut session = session(Vec::new());
        session.frame(&press(|i| i.confirm = true), DT);
        session.samurai_mut().apply_damage(1000);
        // No death clip, so the run ends on the next frame
        session.frame(&InputFrame::default(), DT);
        assert_eq!(session.state(), GameState::GameOver);

        session.frame(&press(|i| i.retry = true), DT);
        assert_eq!(session.state(), GameState::Playing);
        assert!(!session.samurai().is_dead());
    }

    #[test]
    fn test_power_up_key() {
        let mut session = session(Vec::new());
        session.frame(&press(|i| i.confirm = true), DT);
        session.frame(&press(|i| i.power_up = Some(PowerUpType::Speed)), DT);
        assert_eq!(session.samurai().active_power_ups().len(), 1);
    }

    #[test]
    fn test_exit_marks_game_over() {
        let mut session = session(vec![dummy_at(1, 10)]);
        session.exit();
        assert_eq!(session.state(), GameState::GameOver);
        assert!(session.enemies().is_empty());
    }

    #[test]
    fn test_overlay_text() {
        assert_eq!(GameState::Playing.overlay(), None);
        assert_eq!(GameState::Victory.overlay().unwrap().0, "Victory!");
    }
}
