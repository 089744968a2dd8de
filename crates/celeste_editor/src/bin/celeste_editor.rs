//! Map editor launcher
//!
//! Run with: celeste_editor [path/to/tileset.tsx]

use bevy::asset::{AssetPlugin, UnapprovedPathMode};
use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use bevy::window::{WindowMoved, WindowPosition, WindowResized, WindowResolution};
use celeste_editor::celeste_core::DEFAULT_TSX_PATH;
use celeste_editor::preferences::EditorPreferences;
use celeste_editor::{DataFiles, MapEditorPlugin};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "celeste_editor", about = "Celeste-like map editor")]
struct Args {
    /// Tileset descriptor to paint with
    tsx: Option<PathBuf>,

    /// Read and write the level files in this directory
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    // Load preferences early to get saved window size
    let mut preferences = EditorPreferences::load();
    let window_width = preferences.window_width.unwrap_or(1600.0) as u32;
    let window_height = preferences.window_height.unwrap_or(900.0) as u32;
    let window_position = match (preferences.window_x, preferences.window_y) {
        (Some(x), Some(y)) => WindowPosition::At(IVec2::new(x, y)),
        _ => WindowPosition::Automatic,
    };

    let tsx = args
        .tsx
        .or_else(|| preferences.last_tsx.clone().filter(|p| p.is_file()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TSX_PATH));
    preferences.remember_tsx(&tsx);

    let files = args.data_dir.map(DataFiles::in_dir).unwrap_or_default();

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Celeste-like Map Editor".to_string(),
                        resolution: WindowResolution::new(window_width, window_height),
                        position: window_position,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(AssetPlugin {
                    unapproved_path_mode: UnapprovedPathMode::Allow,
                    ..default()
                }),
        )
        .insert_resource(preferences)
        .add_plugins(MapEditorPlugin::new(tsx).with_files(files))
        .add_systems(Update, save_window_state_on_change)
        .add_systems(Last, save_window_state_on_exit)
        .run();
}

fn store_window(window: &Window, preferences: &mut EditorPreferences) {
    preferences.window_width = Some(window.resolution.width());
    preferences.window_height = Some(window.resolution.height());
    if let WindowPosition::At(pos) = window.position {
        preferences.window_x = Some(pos.x);
        preferences.window_y = Some(pos.y);
    }
}

/// Save window state to preferences whenever the window is moved or resized
fn save_window_state_on_change(
    mut moved_events: MessageReader<WindowMoved>,
    mut resized_events: MessageReader<WindowResized>,
    windows: Query<&Window>,
    mut preferences: ResMut<EditorPreferences>,
) {
    let has_moved = moved_events.read().last().is_some();
    let has_resized = resized_events.read().last().is_some();
    if !has_moved && !has_resized {
        return;
    }
    if let Ok(window) = windows.single() {
        store_window(window, &mut preferences);
        if let Err(e) = preferences.save() {
            error!("Failed to save window state to preferences: {}", e);
        }
    }
}

/// Save preferences when the app exits
fn save_window_state_on_exit(
    mut exit_events: MessageReader<AppExit>,
    windows: Query<&Window>,
    mut preferences: ResMut<EditorPreferences>,
) {
    if exit_events.read().next().is_none() {
        return;
    }
    if let Ok(window) = windows.single() {
        store_window(window, &mut preferences);
    }
    if let Err(e) = preferences.save() {
        error!("Failed to save preferences: {}", e);
    }
}
