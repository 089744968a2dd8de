//! Desktop launcher for the platformer
//!
//! Run from the distribution root so `editor_blueprint.json`,
//! `inspector_snapshot.json`, `enemy_spawns.json` and `assets/` are found.

use bevy::asset::{AssetPlugin, UnapprovedPathMode};
use bevy::image::{ImageFilterMode, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};
use celeste::prelude::CelesteGamePlugin;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Celeste-like Platformer".to_string(),
                        resolution: WindowResolution::new(1280, 720),
                        resizable: false,
                        present_mode: PresentMode::AutoVsync,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin {
                    default_sampler: ImageSamplerDescriptor {
                        mag_filter: ImageFilterMode::Nearest,
                        min_filter: ImageFilterMode::Nearest,
                        mipmap_filter: ImageFilterMode::Nearest,
                        ..default()
                    },
                })
                .set(AssetPlugin {
                    // Sheet paths reach the asset server already absolute
                    file_path: ".".to_string(),
                    unapproved_path_mode: UnapprovedPathMode::Allow,
                    ..default()
                }),
        )
        .add_plugins(CelesteGamePlugin)
        .run();
}
