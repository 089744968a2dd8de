use bevy::ecs::message::MessageReader;
use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use celeste_core::TileRef;

use super::document::{InspectorDocument, Selection};
use crate::canvas::{self, PaletteTexture};
use crate::data::DataFiles;

const HELP: &str = "1/2 solid | 4 door | 5 key | 6 water | Enter name enemy | \
                    Del/Backspace delete next click | Ctrl+S save";

const SOLID: egui::Color32 = egui::Color32::from_rgb(26, 242, 51);
const WATER: egui::Color32 = egui::Color32::from_rgb(51, 115, 242);
const DOOR: egui::Color32 = egui::Color32::from_rgb(242, 140, 38);
const KEY: egui::Color32 = egui::Color32::from_rgb(242, 217, 51);
const ENEMY: egui::Color32 = egui::Color32::from_rgb(242, 64, 115);

/// Data directory the inspector reads and writes
#[derive(Resource, Debug, Clone, Default)]
pub struct InspectorLaunch {
    pub files: DataFiles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectorAction {
    Save,
    Select(Selection, &'static str),
    StartNaming,
    ArmDelete,
    ConfirmName,
    CancelName,
    Backspace,
}

/// The action for this frame's keys; naming mode has its own keys
pub fn inspector_action(keys: &ButtonInput<KeyCode>, naming: bool) -> Option<InspectorAction> {
    let pressed = |codes: &[KeyCode]| keys.any_just_pressed(codes.iter().copied());
    if naming {
        return if pressed(&[KeyCode::Enter, KeyCode::NumpadEnter]) {
            Some(InspectorAction::ConfirmName)
        } else if pressed(&[KeyCode::Escape]) {
            Some(InspectorAction::CancelName)
        } else if pressed(&[KeyCode::Backspace]) {
            Some(InspectorAction::Backspace)
        } else {
            None
        };
    }

    let ctrl = keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]);
    if ctrl && keys.just_pressed(KeyCode::KeyS) {
        Some(InspectorAction::Save)
    } else if pressed(&[KeyCode::Digit1]) {
        Some(InspectorAction::Select(Selection::Solid, "1"))
    } else if pressed(&[KeyCode::Digit2]) {
        Some(InspectorAction::Select(Selection::Solid, "2"))
    } else if pressed(&[KeyCode::Digit4]) {
        Some(InspectorAction::Select(Selection::Door, "4"))
    } else if pressed(&[KeyCode::Digit5]) {
        Some(InspectorAction::Select(Selection::Key, "5"))
    } else if pressed(&[KeyCode::Digit6]) {
        Some(InspectorAction::Select(Selection::Water, "6"))
    } else if pressed(&[KeyCode::Enter, KeyCode::NumpadEnter]) {
        Some(InspectorAction::StartNaming)
    } else if pressed(&[KeyCode::Delete, KeyCode::Backspace]) {
        Some(InspectorAction::ArmDelete)
    } else {
        None
    }
}

/// Apply an action; returns the lines to log
pub fn apply_inspector_action(
    document: &mut InspectorDocument,
    action: InspectorAction,
) -> Vec<String> {
    match action {
        InspectorAction::Save => match document.save_snapshot() {
            Ok(path) => {
                let mut lines = vec![format!("Snapshot saved to {}", path.display())];
                lines.extend(document.summary_lines());
                lines
            }
            Err(e) => vec![format!("Failed to save snapshot: {}", e)],
        },
        InspectorAction::Select(selection, key) => vec![document.set_selection(selection, key)],
        InspectorAction::StartNaming => vec![document.start_naming()],
        InspectorAction::ArmDelete => vec![document.arm_delete()],
        InspectorAction::ConfirmName => vec![document.confirm_name()],
        InspectorAction::CancelName => vec![document.cancel_naming()],
        InspectorAction::Backspace => {
            document.backspace();
            Vec::new()
        }
    }
}

/// Click a tile and return the lines to log, summary included when something changed
pub fn click_tile(document: &mut InspectorDocument, tile: TileRef) -> Vec<String> {
    let outcome = document.click(tile);
    let mut lines = outcome.messages();
    if outcome.changed() {
        lines.extend(document.summary_lines());
    }
    lines
}

pub fn setup_inspector(mut commands: Commands, launch: Res<InspectorLaunch>) {
    let (document, warnings) = InspectorDocument::load(launch.files.clone());
    for warning in warnings {
        warn!("{}", warning);
    }
    for line in document.summary_lines() {
        info!("{}", line);
    }
    commands.insert_resource(document);
}

pub fn handle_inspector_input(
    keys: Res<ButtonInput<KeyCode>>,
    mut typed: MessageReader<KeyboardInput>,
    mut document: ResMut<InspectorDocument>,
) {
    let chars: Vec<char> = typed
        .read()
        .filter(|event| event.state == ButtonState::Pressed)
        .flat_map(|event| match &event.logical_key {
            Key::Character(text) => text.chars().collect(),
            Key::Space => vec![' '],
            _ => Vec::new(),
        })
        .collect();

    let naming = document.is_naming();
    if let Some(action) = inspector_action(&keys, naming) {
        for line in apply_inspector_action(&mut document, action) {
            info!("{}", line);
        }
    } else if naming {
        for c in chars {
            document.type_char(c);
        }
    }
}

#[derive(Default)]
pub struct InspectorView {
    texture: Option<PaletteTexture>,
}

pub fn draw_inspector(
    mut contexts: EguiContexts,
    mut document: ResMut<InspectorDocument>,
    mut view: Local<InspectorView>,
    time: Res<Time>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    if view.texture.is_none() {
        view.texture = document
            .palette
            .as_ref()
            .map(|palette| PaletteTexture::upload(ctx, palette, 0));
    }

    egui::TopBottomPanel::top("inspector_status").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(format!("Active selection: {}", document.selection.label()));
            if let Some(buffer) = document.name_buffer() {
                ui.colored_label(ENEMY, format!("Enemy name: {}_", buffer));
            } else if let Some(name) = document.pending_enemy() {
                ui.colored_label(ENEMY, format!("Click a tile to place '{}'", name));
            } else if document.delete_mode() {
                ui.colored_label(egui::Color32::LIGHT_RED, "Delete mode: click a tile");
            }
        });
        ui.label(egui::RichText::new(HELP).small());
    });

    egui::CentralPanel::default()
        .frame(egui::Frame::NONE.fill(egui::Color32::from_rgb(18, 18, 26)))
        .show(ctx, |ui| {
            let (rows, cols) = (document.blueprint.rows, document.blueprint.cols);
            let tile_size = canvas::map_tile_size(ui.available_size(), rows, cols);
            let size = egui::vec2(cols as f32, rows as f32) * tile_size;
            let (response, painter) = ui.allocate_painter(size, egui::Sense::click());
            let origin = response.rect.min;

            canvas::draw_blueprint(
                &painter,
                origin,
                tile_size,
                &document.blueprint,
                view.texture.as_ref(),
                document.palette.as_ref().map_or(0, |p| p.len()),
                time.elapsed_secs(),
            );

            let mark = |tile: &TileRef, color: egui::Color32| {
                let rect = canvas::cell_rect(origin, tile_size, tile.row, tile.col);
                painter.rect_filled(rect, 0.0, color.gamma_multiply(0.28));
                canvas::outline(&painter, rect, color);
            };
            document.solid().iter().for_each(|t| mark(t, SOLID));
            document.water().iter().for_each(|t| mark(t, WATER));
            for enemy in document.enemies() {
                mark(&enemy.tile(), ENEMY);
            }
            for door in document.doors() {
                door.door.iter().for_each(|t| mark(t, DOOR));
                door.key.iter().for_each(|t| mark(t, KEY));
            }

            if response.clicked() {
                if let Some((row, col)) = response
                    .interact_pointer_pos()
                    .and_then(|pos| canvas::cell_at(origin, tile_size, pos, rows, cols))
                {
                    for line in click_tile(&mut document, TileRef::new(row, col)) {
                        info!("{}", line);
                    }
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use celeste_core::LevelBlueprint;

    #[test]
    fn test_naming_keys_replace_hotkeys() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::Enter);
        assert_eq!(
            inspector_action(&keys, false),
            Some(InspectorAction::StartNaming)
        );
        assert_eq!(
            inspector_action(&keys, true),
            Some(InspectorAction::ConfirmName)
        );

        keys.clear();
        keys.press(KeyCode::Backspace);
        assert_eq!(
            inspector_action(&keys, false),
            Some(InspectorAction::ArmDelete)
        );
        assert_eq!(
            inspector_action(&keys, true),
            Some(InspectorAction::Backspace)
        );

        keys.clear();
        keys.press(KeyCode::Digit4);
        assert_eq!(inspector_action(&keys, true), None);
    }

    #[test]
    fn test_key_two_also_selects_solid() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::Digit2);
        let mut document = InspectorDocument::new(LevelBlueprint::new(2, 2), DataFiles::default());
        document.selection = Selection::Water;
        let action = inspector_action(&keys, false).unwrap();
        assert_eq!(
            apply_inspector_action(&mut document, action),
            vec!["Active selection: Solid ground/wall (key 2)"]
        );
    }

    #[test]
    fn test_click_prints_summary_on_change() {
        let mut document = InspectorDocument::new(LevelBlueprint::new(2, 2), DataFiles::default());
        let lines = click_tile(&mut document, TileRef::new(1, 1));
        assert_eq!(lines[0], "solid [#1 (r=1,c=1)]");
        assert_eq!(lines.len(), 4);
        let lines = click_tile(&mut document, TileRef::new(1, 1));
        assert_eq!(lines, vec!["Solid ground/wall already contains (r=1,c=1)"]);
    }
}
