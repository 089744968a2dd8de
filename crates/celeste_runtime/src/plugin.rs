use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use bevy_ecs_tilemap::TilemapPlugin;
use bevy_egui::{EguiPlugin, EguiPrimaryContextPass};
use celeste_animation::{AnimationSet, SpriteAnimationPlugin};
use celeste_core::{
    absolute_path, journal, load_enemy_spawns, locate_data_dir, locate_data_file, GameConfig,
    GAME_CONFIG_PATH,
};
use std::path::PathBuf;

use crate::enemy::EnemyManager;
use crate::error::LevelLoadError;
use crate::hud::draw_hud;
use crate::input::drive_session;
use crate::level::{animate_cells, spawn_tilemap, LoadedLevel};
use crate::render::{
    draw_health_bar_segments, fit_camera, spawn_camera, spawn_samurai_sprite, sync_enemy_sprites,
    sync_samurai_sprite, CameraZoom, EnemySprites, SheetHandles,
};
use crate::samurai::{Samurai, SamuraiAnimationKey, SAMURAI_SPRITE_DIR};
use crate::session::GameSession;

/// Read `assets/game_config.json`, falling back to defaults
pub fn load_game_config() -> GameConfig {
    let Some(path) = locate_data_file(GAME_CONFIG_PATH) else {
        warn!("{} not found, using default tuning", GAME_CONFIG_PATH);
        return GameConfig::default();
    };
    match GameConfig::load(&path) {
        Ok(config) => {
            info!("Loaded game config from {}", path.display());
            config.sanitized()
        }
        Err(e) => {
            error!("Failed to load {}: {}", path.display(), e);
            GameConfig::default()
        }
    }
}

/// Absolute directory of the samurai sheets; the asset server does not
/// resolve relative paths against the working directory
pub fn samurai_sprite_dir() -> PathBuf {
    locate_data_dir(SAMURAI_SPRITE_DIR).unwrap_or_else(|| absolute_path(SAMURAI_SPRITE_DIR))
}

/// Load everything the game needs and build the session
pub fn build_session(config: &GameConfig) -> Result<(LoadedLevel, GameSession), LevelLoadError> {
    let (level, warnings) = LoadedLevel::load_default()?;
    for warning in warnings {
        warn!("{}", warning);
    }
    info!(
        "Level {}x{} with {} palette tiles",
        level.blueprint.rows,
        level.blueprint.cols,
        level.palette.len()
    );

    let sprite_dir = samurai_sprite_dir();
    let (clips, missing) = AnimationSet::probe_all(&sprite_dir, SamuraiAnimationKey::clip_specs());
    for problem in missing {
        warn!("{}", problem);
    }
    let mut samurai = Samurai::new(clips, &config.player);
    samurai.attach_collision_map(Some(level.collision.clone()));

    let (spawns, spawn_warnings) = load_enemy_spawns();
    for warning in spawn_warnings {
        warn!("{}", warning);
    }
    let session = GameSession::new(
        samurai,
        EnemyManager::default(),
        spawns,
        level.blueprint.rows,
        level.tile_size,
    );
    Ok((level, session))
}

fn setup_game(mut commands: Commands, mut exit: MessageWriter<AppExit>) {
    if let Err(e) = journal::init(journal::DEFAULT_LOG_PATH) {
        warn!("Gameplay journal disabled: {}", e);
    }
    let config = load_game_config();
    match build_session(&config) {
        Ok((level, session)) => {
            commands.insert_resource(CameraZoom(config.camera.zoom));
            commands.insert_resource(level);
            commands.insert_resource(session);
        }
        Err(e) => {
            error!("Failed to start the game: {}", e);
            exit.write(AppExit::error());
        }
    }
}

fn end_session(mut exits: MessageReader<AppExit>, session: Option<ResMut<GameSession>>) {
    if exits.read().next().is_none() {
        return;
    }
    if let Some(mut session) = session {
        session.exit();
    }
}

/// The whole game: level, samurai, enemies, HUD
pub struct CelesteGamePlugin;

impl Plugin for CelesteGamePlugin {
    fn build(&self, app: &mut App) {
        let running = resource_exists::<GameSession>;
        app.add_plugins(EguiPlugin::default())
            .add_plugins(TilemapPlugin)
            .add_plugins(SpriteAnimationPlugin)
            .init_resource::<SheetHandles>()
            .init_resource::<EnemySprites>()
            .add_systems(Startup, (setup_game, spawn_camera))
            .add_systems(
                PostStartup,
                (spawn_tilemap, spawn_samurai_sprite).run_if(resource_exists::<LoadedLevel>),
            )
            .add_systems(
                Update,
                (
                    drive_session,
                    animate_cells,
                    sync_samurai_sprite,
                    sync_enemy_sprites,
                    draw_health_bar_segments,
                    fit_camera,
                )
                    .chain()
                    .run_if(running),
            )
            .add_systems(EguiPrimaryContextPass, draw_hud.run_if(running))
            .add_systems(Last, end_session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samurai_sprite_dir_is_absolute() {
        let dir = samurai_sprite_dir();
        assert!(dir.is_absolute());
        assert!(dir.ends_with(SAMURAI_SPRITE_DIR));
    }
}
