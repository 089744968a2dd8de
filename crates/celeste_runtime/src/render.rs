//! Camera, character sprites and enemy health bars

use bevy::prelude::*;
use celeste_animation::SpriteFrame;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::enemy::{EnemyView, HealthBar};
use crate::level::LoadedLevel;
use crate::session::GameSession;

const SAMURAI_Z: f32 = 10.0;
const ENEMY_Z: f32 = 9.0;
const HEALTH_BAR_Z: f32 = 11.0;

const HEALTH_BAR_BACK: Color = Color::srgba(0.0, 0.0, 0.0, 0.6);
const HEALTH_BAR_FILL: Color = Color::srgb(0.85, 0.15, 0.15);
const HEALTH_BAR_TICK: Color = Color::srgba(0.0, 0.0, 0.0, 0.8);

/// Zoom applied on top of the fit-to-level scale
#[derive(Resource, Debug, Clone, Copy)]
pub struct CameraZoom(pub f32);

impl Default for CameraZoom {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Orthographic scale that fits `world` into `window`
pub fn fit_scale(world: Vec2, window: Vec2, zoom: f32) -> f32 {
    if window.x <= 0.0 || window.y <= 0.0 {
        return 1.0;
    }
    let fit = (world.x / window.x).max(world.y / window.y);
    fit / zoom.max(0.01)
}

/// Center of a sprite whose bottom-left corner sits at `origin`
pub fn sprite_center(origin: Vec2, size: Vec2) -> Vec2 {
    origin + size / 2.0
}

#[derive(Component)]
pub struct GameCamera;

#[derive(Component)]
pub struct SamuraiSprite;

#[derive(Component)]
pub struct EnemySprite(pub u64);

#[derive(Component)]
pub struct EnemyHealthBarSprite {
    pub uid: u64,
    pub fill: bool,
}

/// Image handles by sheet path
#[derive(Resource, Default)]
pub struct SheetHandles {
    handles: HashMap<PathBuf, Handle<Image>>,
}

impl SheetHandles {
    pub fn get(&mut self, asset_server: &AssetServer, path: &Path) -> Handle<Image> {
        self.handles
            .entry(path.to_path_buf())
            .or_insert_with(|| asset_server.load(path.to_path_buf()))
            .clone()
    }
}

/// Entities drawing each enemy
#[derive(Resource, Default)]
pub struct EnemySprites {
    entities: HashMap<u64, [Entity; 3]>,
}

pub fn spawn_camera(mut commands: Commands) {
    commands.spawn((Camera2d, GameCamera));
}

pub fn spawn_samurai_sprite(mut commands: Commands) {
    commands.spawn((
        Sprite::default(),
        SpriteFrame::default(),
        Transform::from_xyz(0.0, 0.0, SAMURAI_Z),
        SamuraiSprite,
    ));
}

/// Keep the whole level in view, centred
pub fn fit_camera(
    level: Res<LoadedLevel>,
    zoom: Res<CameraZoom>,
    windows: Query<&Window>,
    mut cameras: Query<(&mut Transform, &mut Projection), With<GameCamera>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let world = level.world_size();
    let scale = fit_scale(world, Vec2::new(window.width(), window.height()), zoom.0);
    for (mut transform, mut projection) in cameras.iter_mut() {
        let center = world / 2.0;
        if transform.translation.truncate() != center {
            transform.translation = center.extend(transform.translation.z);
        }
        if let Projection::Orthographic(ref mut ortho) = *projection {
            if ortho.scale != scale {
                ortho.scale = scale;
            }
        }
    }
}

pub fn sync_samurai_sprite(
    session: Res<GameSession>,
    asset_server: Res<AssetServer>,
    mut handles: ResMut<SheetHandles>,
    mut sprites: Query<(&mut SpriteFrame, &mut Transform, &mut Visibility), With<SamuraiSprite>>,
) {
    let Ok((mut frame, mut transform, mut visibility)) = sprites.single_mut() else {
        return;
    };
    let samurai = session.samurai();
    let (key, time) = samurai.current_animation();
    let Some(animation) = samurai.clips().get(key) else {
        *visibility = Visibility::Hidden;
        return;
    };
    *visibility = Visibility::Visible;

    frame.image = handles.get(&asset_server, &animation.sheet.path);
    frame.rect = Some(animation.rect_at(time));
    frame.flip_x = !samurai.is_facing_right();

    let center = sprite_center(samurai.render_origin(), animation.sheet.frame_size());
    transform.translation = center.extend(SAMURAI_Z);
}

/// Spawn, move and despawn enemy sprites to match the simulation
pub fn sync_enemy_sprites(
    mut commands: Commands,
    session: Res<GameSession>,
    asset_server: Res<AssetServer>,
    mut handles: ResMut<SheetHandles>,
    mut sprites: ResMut<EnemySprites>,
    mut bodies: Query<(&mut SpriteFrame, &mut Transform), With<EnemySprite>>,
    mut bars: Query<
        (&EnemyHealthBarSprite, &mut Sprite, &mut Transform, &mut Visibility),
        Without<EnemySprite>,
    >,
) {
    let views = session.enemies().views();

    let alive: Vec<u64> = views.iter().map(|v| v.uid).collect();
    sprites.entities.retain(|uid, entities| {
        if alive.contains(uid) {
            return true;
        }
        for entity in entities.iter() {
            commands.entity(*entity).despawn();
        }
        false
    });

    for view in &views {
        let image = handles.get(&asset_server, &view.sheet);
        let Some(entities) = sprites.entities.get(&view.uid).copied() else {
            let entities = spawn_enemy_entities(&mut commands, view, image);
            sprites.entities.insert(view.uid, entities);
            continue;
        };

        if let Ok((mut frame, mut transform)) = bodies.get_mut(entities[0]) {
            frame.image = image;
            frame.rect = Some(view.rect);
            *transform = enemy_transform(view);
        }
        for entity in &entities[1..] {
            if let Ok((bar, mut sprite, mut transform, mut visibility)) = bars.get_mut(*entity) {
                match &view.health_bar {
                    Some(health_bar) => {
                        *visibility = Visibility::Visible;
                        let (size, center) = bar_geometry(health_bar, bar.fill);
                        sprite.custom_size = Some(size);
                        transform.translation = center.extend(HEALTH_BAR_Z);
                    }
                    None => *visibility = Visibility::Hidden,
                }
            }
        }
    }
}

fn spawn_enemy_entities(
    commands: &mut Commands,
    view: &EnemyView,
    image: Handle<Image>,
) -> [Entity; 3] {
    let body = commands
        .spawn((
            Sprite::default(),
            SpriteFrame {
                image,
                rect: Some(view.rect),
                flip_x: false,
            },
            enemy_transform(view),
            EnemySprite(view.uid),
        ))
        .id();
    let mut bar = |fill: bool| {
        let color = if fill { HEALTH_BAR_FILL } else { HEALTH_BAR_BACK };
        let (size, center, visibility) = match &view.health_bar {
            Some(health_bar) => {
                let (size, center) = bar_geometry(health_bar, fill);
                (size, center, Visibility::Visible)
            }
            None => (Vec2::ZERO, Vec2::ZERO, Visibility::Hidden),
        };
        let z = if fill { HEALTH_BAR_Z + 0.1 } else { HEALTH_BAR_Z };
        commands
            .spawn((
                Sprite::from_color(color, size),
                Transform::from_translation(center.extend(z)),
                visibility,
                EnemyHealthBarSprite {
                    uid: view.uid,
                    fill,
                },
            ))
            .id()
    };
    let back = bar(false);
    let fill = bar(true);
    [body, back, fill]
}

fn enemy_transform(view: &EnemyView) -> Transform {
    let origin = view.position - view.render_origin * view.render_scale;
    let size = view.rect.size() * view.render_scale;
    Transform::from_translation(sprite_center(origin, size).extend(ENEMY_Z))
        .with_scale(Vec3::new(view.render_scale, view.render_scale, 1.0))
}

/// Size and center of the background or fill rectangle
fn bar_geometry(bar: &HealthBar, fill: bool) -> (Vec2, Vec2) {
    let width = if fill {
        bar.width * bar.fraction.clamp(0.0, 1.0)
    } else {
        bar.width
    };
    let size = Vec2::new(width, bar.height);
    (size, sprite_center(bar.origin, size))
}

/// Segment ticks over every enemy health bar
pub fn draw_health_bar_segments(session: Res<GameSession>, mut gizmos: Gizmos) {
    for view in session.enemies().views() {
        let Some(bar) = view.health_bar else {
            continue;
        };
        for x in segment_ticks(&bar) {
            gizmos.line_2d(
                Vec2::new(x, bar.origin.y),
                Vec2::new(x, bar.origin.y + bar.height),
                HEALTH_BAR_TICK,
            );
        }
    }
}

/// X positions of the dividers between health bar segments
pub fn segment_ticks(bar: &HealthBar) -> Vec<f32> {
    let step = bar.width / bar.segments.max(1) as f32;
    (1..bar.segments)
        .map(|i| bar.origin.x + step * i as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_scale_uses_tighter_axis() {
        let world = Vec2::new(1024.0, 576.0);
        assert_eq!(fit_scale(world, Vec2::new(1280.0, 720.0), 1.0), 0.8);
        assert_eq!(fit_scale(world, Vec2::new(512.0, 576.0), 1.0), 2.0);
        assert_eq!(fit_scale(world, Vec2::new(512.0, 576.0), 2.0), 1.0);
        assert_eq!(fit_scale(world, Vec2::ZERO, 1.0), 1.0);
    }

    #[test]
    fn test_sprite_center() {
        assert_eq!(
            sprite_center(Vec2::new(10.0, 20.0), Vec2::new(96.0, 96.0)),
            Vec2::new(58.0, 68.0)
        );
    }

    #[test]
    fn test_health_bar_geometry() {
        let bar = HealthBar {
            origin: Vec2::new(0.0, 100.0),
            width: 80.0,
            height: 6.0,
            fraction: 0.25,
            segments: 4,
        };
        let (size, center) = bar_geometry(&bar, true);
        assert_eq!(size, Vec2::new(20.0, 6.0));
        assert_eq!(center, Vec2::new(10.0, 103.0));
        assert_eq!(bar_geometry(&bar, false).0, Vec2::new(80.0, 6.0));
        assert_eq!(segment_ticks(&bar), vec![20.0, 40.0, 60.0]);
    }

    #[test]
    fn test_single_segment_has_no_ticks() {
        let bar = HealthBar {
            origin: Vec2::ZERO,
            width: 50.0,
            height: 6.0,
            fraction: 1.0,
            segments: 1,
        };
        assert!(segment_ticks(&bar).is_empty());
    }
}
