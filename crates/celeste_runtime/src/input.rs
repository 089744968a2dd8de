//! Keyboard and mouse sampling into an [`InputFrame`]

use bevy::prelude::*;

use crate::powerup::PowerUpType;
use crate::session::{GameSession, InputFrame};

/// Build this frame's input from the pressed keys and buttons
pub fn sample_input(keys: &ButtonInput<KeyCode>, mouse: &ButtonInput<MouseButton>) -> InputFrame {
    let held = |codes: &[KeyCode]| keys.any_pressed(codes.iter().copied());
    let pressed = |codes: &[KeyCode]| keys.any_just_pressed(codes.iter().copied());

    let power_up = if keys.just_pressed(KeyCode::Digit1) {
        Some(PowerUpType::Shield)
    } else if keys.just_pressed(KeyCode::Digit2) {
        Some(PowerUpType::Speed)
    } else if keys.just_pressed(KeyCode::Digit3) {
        Some(PowerUpType::Weapon)
    } else {
        None
    };

    InputFrame {
        left: held(&[KeyCode::KeyA, KeyCode::ArrowLeft]),
        right: held(&[KeyCode::KeyD, KeyCode::ArrowRight]),
        up: held(&[KeyCode::KeyW, KeyCode::ArrowUp]),
        down: held(&[KeyCode::KeyS, KeyCode::ArrowDown]),
        defend: mouse.pressed(MouseButton::Right),
        jump: pressed(&[KeyCode::Space]),
        attack: pressed(&[KeyCode::KeyJ, KeyCode::KeyZ]) || mouse.just_pressed(MouseButton::Left),
        special: pressed(&[KeyCode::KeyE]) || mouse.just_pressed(MouseButton::Middle),
        dash: pressed(&[KeyCode::ShiftLeft, KeyCode::ShiftRight]),
        pause: pressed(&[KeyCode::Escape]),
        confirm: pressed(&[KeyCode::Enter, KeyCode::NumpadEnter]),
        retry: pressed(&[KeyCode::KeyR]),
        menu: pressed(&[KeyCode::KeyM]),
        power_up,
    }
}

/// Advance the session by one frame
pub fn drive_session(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut session: ResMut<GameSession>,
) {
    let input = sample_input(&keys, &mouse);
    session.frame(&input, time.delta_secs());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_and_pressed_keys() {
        let mut keys = ButtonInput::<KeyCode>::default();
        let mut mouse = ButtonInput::<MouseButton>::default();
        keys.press(KeyCode::ArrowLeft);
        keys.press(KeyCode::Space);
        mouse.press(MouseButton::Right);

        let input = sample_input(&keys, &mouse);
        assert!(input.left && input.jump && input.defend);
        assert!(!input.right && !input.attack);

        // Next frame: still held, no longer just pressed
        keys.clear();
        mouse.clear();
        let input = sample_input(&keys, &mouse);
        assert!(input.left && input.defend);
        assert!(!input.jump);
    }

    #[test]
    fn test_power_up_keys() {
        let mut keys = ButtonInput::<KeyCode>::default();
        let mouse = ButtonInput::<MouseButton>::default();
        keys.press(KeyCode::Digit2);
        assert_eq!(sample_input(&keys, &mouse).power_up, Some(PowerUpType::Speed));
    }

    #[test]
    fn test_mouse_attacks() {
        let keys = ButtonInput::<KeyCode>::default();
        let mut mouse = ButtonInput::<MouseButton>::default();
        mouse.press(MouseButton::Left);
        mouse.press(MouseButton::Middle);
        let input = sample_input(&keys, &mouse);
        assert!(input.attack && input.special);
    }
}
