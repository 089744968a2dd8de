//! Map inspector launcher
//!
//! Run with: celeste_inspector

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};
use celeste_editor::{DataFiles, MapInspectorPlugin};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "celeste_inspector", about = "Celeste-like map inspector")]
struct Args {
    /// Read and write the level files in this directory
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    let files = args.data_dir.map(DataFiles::in_dir).unwrap_or_default();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Celeste-like Map Inspector".to_string(),
                resolution: WindowResolution::new(1280, 720),
                present_mode: PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(MapInspectorPlugin { files })
        .run();
}
