//! The map inspector: click tiles to record solid ground, water, doors, keys and enemies

mod document;
mod ui;

pub use document::{is_name_char, ClickOutcome, InspectorDocument, Selection};
pub use ui::{
    apply_inspector_action, click_tile, inspector_action, InspectorAction, InspectorLaunch,
};

use bevy::prelude::*;
use bevy_egui::{EguiPlugin, EguiPrimaryContextPass};

use crate::data::DataFiles;
use crate::editor::spawn_editor_camera;

/// Map inspector plugin
#[derive(Default)]
pub struct MapInspectorPlugin {
    pub files: DataFiles,
}

impl Plugin for MapInspectorPlugin {
    fn build(&self, app: &mut App) {
        let ready = resource_exists::<InspectorDocument>;
        app.add_plugins(EguiPlugin::default())
            .insert_resource(InspectorLaunch {
                files: self.files.clone(),
            })
            .add_systems(Startup, (ui::setup_inspector, spawn_editor_camera))
            .add_systems(Update, ui::handle_inspector_input.run_if(ready))
            .add_systems(EguiPrimaryContextPass, ui::draw_inspector.run_if(ready));
    }
}
