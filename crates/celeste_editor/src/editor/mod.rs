//! The tile map editor: paint tiles, mark solid/water/doors/keys and place enemies

mod document;
mod shortcuts;
mod ui;

pub use document::{
    EditorDocument, SaveReport, ENEMY_TYPES, FRAME_DURATION_STEP, MAX_FRAME_DURATION,
    MIN_FRAME_DURATION, STATUS_DURATION,
};
pub use shortcuts::{apply_action, shortcut_actions, EditorAction};
pub use ui::{EditorLaunch, PendingTileset};

use bevy::prelude::*;
use bevy_egui::{EguiPlugin, EguiPrimaryContextPass};
use celeste_core::DEFAULT_TSX_PATH;
use std::path::PathBuf;

use crate::data::DataFiles;

/// Map editor plugin
///
/// # Usage
///
/// ```rust,ignore
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(MapEditorPlugin::new("assets/b.tsx"))
///     .run();
/// ```
pub struct MapEditorPlugin {
    pub tsx_path: PathBuf,
    pub files: DataFiles,
}

impl MapEditorPlugin {
    pub fn new(tsx_path: impl Into<PathBuf>) -> Self {
        Self {
            tsx_path: tsx_path.into(),
            files: DataFiles::default(),
        }
    }

    pub fn with_files(mut self, files: DataFiles) -> Self {
        self.files = files;
        self
    }
}

impl Default for MapEditorPlugin {
    fn default() -> Self {
        Self::new(DEFAULT_TSX_PATH)
    }
}

impl Plugin for MapEditorPlugin {
    fn build(&self, app: &mut App) {
        let ready = resource_exists::<EditorDocument>;
        app.add_plugins(EguiPlugin::default())
            .insert_resource(EditorLaunch {
                tsx_path: self.tsx_path.clone(),
                files: self.files.clone(),
            })
            .init_resource::<PendingTileset>()
            .add_systems(Startup, (ui::setup_editor, spawn_editor_camera))
            .add_systems(
                Update,
                (ui::handle_editor_shortcuts, ui::apply_pending_tileset)
                    .chain()
                    .run_if(ready),
            )
            .add_systems(EguiPrimaryContextPass, ui::draw_editor.run_if(ready));
    }
}

/// egui needs a camera to render into
pub(crate) fn spawn_editor_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
