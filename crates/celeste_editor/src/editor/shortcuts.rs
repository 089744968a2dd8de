use bevy::prelude::*;

use super::document::{EditorDocument, FRAME_DURATION_STEP};

/// Everything a key can ask the editor to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Quit,
    Save,
    Undo,
    Redo,
    ClearCell,
    ClearAll,
    OpenTileset,
    ToggleSolid,
    ToggleWater,
    ToggleDoor,
    ToggleKey,
    CycleEnemy,
    SelectAir,
    FewerFrames,
    MoreFrames,
    ShorterFrames,
    LongerFrames,
    AppendFrame,
    Dump,
}

/// Actions for the keys pressed this frame
pub fn shortcut_actions(keys: &ButtonInput<KeyCode>) -> Vec<EditorAction> {
    let ctrl = keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]);
    let shift = keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
    let mut actions = Vec::new();

    if keys.just_pressed(KeyCode::Escape) {
        actions.push(EditorAction::Quit);
        return actions;
    }

    if ctrl {
        let bindings = [
            (KeyCode::KeyS, EditorAction::Save),
            (KeyCode::KeyC, EditorAction::ClearCell),
            (KeyCode::KeyZ, EditorAction::Undo),
            (KeyCode::KeyY, EditorAction::Redo),
            (KeyCode::KeyO, EditorAction::OpenTileset),
        ];
        actions.extend(
            bindings
                .iter()
                .filter(|(key, _)| keys.just_pressed(*key))
                .map(|(_, action)| *action),
        );
        return actions;
    }

    if shift && keys.just_pressed(KeyCode::KeyC) {
        actions.push(EditorAction::ClearAll);
    }

    let bindings = [
        (KeyCode::Digit1, EditorAction::ToggleSolid),
        (KeyCode::Digit2, EditorAction::ToggleWater),
        (KeyCode::Digit3, EditorAction::ToggleDoor),
        (KeyCode::Digit4, EditorAction::ToggleKey),
        (KeyCode::Digit5, EditorAction::CycleEnemy),
        (KeyCode::KeyX, EditorAction::SelectAir),
        (KeyCode::BracketLeft, EditorAction::FewerFrames),
        (KeyCode::BracketRight, EditorAction::MoreFrames),
        (KeyCode::Minus, EditorAction::ShorterFrames),
        (KeyCode::NumpadSubtract, EditorAction::ShorterFrames),
        (KeyCode::Equal, EditorAction::LongerFrames),
        (KeyCode::NumpadAdd, EditorAction::LongerFrames),
        (KeyCode::KeyO, EditorAction::AppendFrame),
        (KeyCode::KeyP, EditorAction::Dump),
    ];
    for (key, action) in bindings {
        if keys.just_pressed(key) && !actions.contains(&action) {
            actions.push(action);
        }
    }
    actions
}

/// Apply an action that only touches the document.
///
/// Returns `false` for actions the caller has to handle (quit, open tileset).
pub fn apply_action(document: &mut EditorDocument, action: EditorAction) -> bool {
    match action {
        EditorAction::Quit | EditorAction::OpenTileset => return false,
        EditorAction::Save => {
            document.save_all();
        }
        EditorAction::Undo => {
            if document.undo().is_none() {
                document.set_status("Nothing to undo");
            }
        }
        EditorAction::Redo => {
            if document.redo().is_none() {
                document.set_status("Nothing to redo");
            }
        }
        EditorAction::ClearCell => {
            document.clear_cell();
        }
        EditorAction::ClearAll => document.clear_all(),
        EditorAction::ToggleSolid => {
            document.toggle_solid();
        }
        EditorAction::ToggleWater => {
            document.toggle_water();
        }
        EditorAction::ToggleDoor => {
            document.toggle_door();
        }
        EditorAction::ToggleKey => {
            document.toggle_key();
        }
        EditorAction::CycleEnemy => {
            document.cycle_enemy();
        }
        EditorAction::SelectAir => document.select_air(),
        EditorAction::FewerFrames => document.adjust_frame_count(-1),
        EditorAction::MoreFrames => document.adjust_frame_count(1),
        EditorAction::ShorterFrames => document.adjust_frame_duration(-FRAME_DURATION_STEP),
        EditorAction::LongerFrames => document.adjust_frame_duration(FRAME_DURATION_STEP),
        EditorAction::AppendFrame => {
            document.append_frame();
        }
        EditorAction::Dump => println!("{}", document.dump()),
    }
    true
}
