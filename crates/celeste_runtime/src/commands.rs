//! Input commands that drive the samurai
//!
//! Held inputs call [`SamuraiCommand::execute`] every frame they are down and
//! [`SamuraiCommand::release`] once when let go. One-shot inputs only execute.

use bevy::log::{debug, info};
use bevy::math::Vec2;

use crate::samurai::Samurai;

pub trait SamuraiCommand: Send + Sync {
    fn execute(&mut self, samurai: &mut Samurai, dt: f32);
    fn release(&mut self, _samurai: &mut Samurai) {}
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldAction {
    Right,
    Left,
    Up,
    Down,
}

/// Directional input held down over several frames
#[derive(Debug)]
pub struct MoveCommand {
    action: HoldAction,
    active: bool,
}

impl MoveCommand {
    fn new(action: HoldAction) -> Self {
        Self {
            action,
            active: false,
        }
    }

    pub fn right() -> Self {
        Self::new(HoldAction::Right)
    }

    pub fn left() -> Self {
        Self::new(HoldAction::Left)
    }

    pub fn up() -> Self {
        Self::new(HoldAction::Up)
    }

    pub fn down() -> Self {
        Self::new(HoldAction::Down)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl SamuraiCommand for MoveCommand {
    fn execute(&mut self, samurai: &mut Samurai, _dt: f32) {
        match self.action {
            HoldAction::Right => samurai.move_right(),
            HoldAction::Left => samurai.move_left(),
            HoldAction::Up => samurai.aim_up(),
            HoldAction::Down => samurai.aim_down(),
        }
        if !self.active {
            debug!("{} engaged", self.name());
            self.active = true;
        }
    }

    fn release(&mut self, samurai: &mut Samurai) {
        if !self.active {
            return;
        }
        match self.action {
            HoldAction::Right | HoldAction::Left => samurai.stop_horizontal_movement(),
            HoldAction::Up | HoldAction::Down => samurai.clear_vertical_aim(),
        }
        debug!("{} released", self.name());
        self.active = false;
    }

    fn name(&self) -> &'static str {
        match self.action {
            HoldAction::Right => "MoveRightCommand",
            HoldAction::Left => "MoveLeftCommand",
            HoldAction::Up => "MoveUpCommand",
            HoldAction::Down => "MoveDownCommand",
        }
    }
}

/// Ground jump, falling back to a wall jump
#[derive(Debug, Default)]
pub struct JumpCommand;

impl SamuraiCommand for JumpCommand {
    fn execute(&mut self, samurai: &mut Samurai, _dt: f32) {
        if samurai.jump() {
            info!("Jump command executed successfully");
        } else if samurai.wall_jump() {
            info!("Wall jump executed");
        } else {
            debug!("Jump command ignored (no available jump)");
        }
    }

    fn name(&self) -> &'static str {
        "JumpCommand"
    }
}

/// Dash burst; the caller sets the direction before executing
#[derive(Debug, Default)]
pub struct DashCommand {
    direction: Vec2,
}

impl DashCommand {
    pub fn set_direction(&mut self, x: f32, y: f32) {
        self.direction = Vec2::new(x, y);
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }
}

impl SamuraiCommand for DashCommand {
    fn execute(&mut self, samurai: &mut Samurai, _dt: f32) {
        if samurai.dash(self.direction) {
            info!("Dash command executed successfully");
        } else {
            debug!("Dash command ignored (dash unavailable)");
        }
    }

    fn name(&self) -> &'static str {
        "DashCommand"
    }
}

#[derive(Debug, Default)]
pub struct AttackCommand;

impl SamuraiCommand for AttackCommand {
    fn execute(&mut self, samurai: &mut Samurai, _dt: f32) {
        if !samurai.attack() {
            debug!("Attack command ignored");
        }
    }

    fn name(&self) -> &'static str {
        "AttackCommand"
    }
}

#[derive(Debug, Default)]
pub struct SpecialAttackCommand;

impl SamuraiCommand for SpecialAttackCommand {
    fn execute(&mut self, samurai: &mut Samurai, _dt: f32) {
        if !samurai.special_attack() {
            debug!("Special attack command ignored");
        }
    }

    fn name(&self) -> &'static str {
        "SpecialAttackCommand"
    }
}

/// Defensive stance held while the input is down
#[derive(Debug, Default)]
pub struct DefendCommand;

impl SamuraiCommand for DefendCommand {
    fn execute(&mut self, samurai: &mut Samurai, _dt: f32) {
        samurai.start_defend();
    }

    fn release(&mut self, samurai: &mut Samurai) {
        samurai.stop_defend();
    }

    fn name(&self) -> &'static str {
        "DefendCommand"
    }
}

/// The full set of commands bound to the keyboard and mouse
#[derive(Debug)]
pub struct SamuraiCommands {
    pub move_right: MoveCommand,
    pub move_left: MoveCommand,
    pub move_up: MoveCommand,
    pub move_down: MoveCommand,
    pub jump: JumpCommand,
    pub dash: DashCommand,
    pub attack: AttackCommand,
    pub special_attack: SpecialAttackCommand,
    pub defend: DefendCommand,
}

impl Default for SamuraiCommands {
    fn default() -> Self {
        Self {
            move_right: MoveCommand::right(),
            move_left: MoveCommand::left(),
            move_up: MoveCommand::up(),
            move_down: MoveCommand::down(),
            jump: JumpCommand,
            dash: DashCommand::default(),
            attack: AttackCommand,
            special_attack: SpecialAttackCommand,
            defend: DefendCommand,
        }
    }
}

impl SamuraiCommands {
    /// Release every held command
    pub fn release_all(&mut self, samurai: &mut Samurai) {
        self.move_right.release(samurai);
        self.move_left.release(samurai);
        self.move_up.release(samurai);
        self.move_down.release(samurai);
        self.defend.release(samurai);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samurai::{SamuraiClips, SamuraiState};
    use celeste_core::PlayerConfig;

    fn samurai() -> Samurai {
        let mut samurai = Samurai::new(SamuraiClips::default(), &PlayerConfig::default());
        samurai.configure_physics(-1800.0, 0.0);
        samurai.place_at(0.0, 0.0);
        samurai.update(1.0 / 60.0);
        samurai
    }

    #[test]
    fn test_move_releases_once() {
        let mut samurai = samurai();
        let mut right = MoveCommand::right();
        right.release(&mut samurai);
        assert!(!right.is_active());

        right.execute(&mut samurai, 0.016);
        assert!(right.is_active());
        assert_eq!(samurai.state(), SamuraiState::Run);
        right.release(&mut samurai);
        assert!(!right.is_active());
        assert_eq!(samurai.velocity().x, 0.0);
    }

    #[test]
    fn test_jump_command() {
        let mut samurai = samurai();
        JumpCommand.execute(&mut samurai, 0.016);
        assert_eq!(samurai.state(), SamuraiState::Jump);
        assert!(samurai.velocity().y > 0.0);
    }

    #[test]
    fn test_dash_direction() {
        let mut samurai = samurai();
        let mut dash = DashCommand::default();
        dash.set_direction(-1.0, 0.0);
        dash.execute(&mut samurai, 0.016);
        assert!(samurai.is_dashing());
        assert!(samurai.velocity().x < 0.0);
    }

    #[test]
    fn test_defend_hold_and_release() {
        let mut samurai = samurai();
        let mut commands = SamuraiCommands::default();
        commands.defend.execute(&mut samurai, 0.016);
        assert!(samurai.is_defending());
        commands.release_all(&mut samurai);
        assert!(!samurai.is_defending());
    }
}
