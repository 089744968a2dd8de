//! Kinematic tile controller
//!
//! Moves an axis-aligned collider through a [`LevelCollisionMap`]: gravity,
//! horizontal then vertical resolution against solid cells, plus wall-contact
//! and water probes. Without a map it falls back to a flat ground plane.

use bevy::log::debug;
use bevy::math::Vec2;
use celeste_core::LevelCollisionMap;
use std::sync::Arc;

const COLLISION_EPSILON: f32 = 0.001;

#[derive(Debug, Clone)]
pub struct KinematicController {
    position: Vec2,
    velocity: Vec2,
    gravity: f32,
    ground_y: f32,
    grounded: bool,
    touching_wall_left: bool,
    touching_wall_right: bool,
    in_water: bool,
    collider_size: Vec2,
    collider_offset: Vec2,
    map: Option<Arc<LevelCollisionMap>>,
}

impl Default for KinematicController {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            gravity: -1500.0,
            ground_y: 0.0,
            grounded: false,
            touching_wall_left: false,
            touching_wall_right: false,
            in_water: false,
            collider_size: Vec2::new(48.0, 80.0),
            collider_offset: Vec2::new(2.0, 0.0),
            map: None,
        }
    }
}

impl KinematicController {
    /// Teleport, clearing velocity and the grounded flag
    pub fn place(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
        self.velocity = Vec2::ZERO;
        self.grounded = false;
        debug!("Controller placed at ({}, {})", x, y);
    }

    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity = gravity;
    }

    pub fn set_ground_y(&mut self, ground_y: f32) {
        self.ground_y = ground_y;
    }

    pub fn set_collision_map(&mut self, map: Option<Arc<LevelCollisionMap>>) {
        self.map = map;
    }

    pub fn configure_collider(&mut self, width: f32, height: f32, offset_x: f32, offset_y: f32) {
        self.collider_size = Vec2::new(width, height);
        self.collider_offset = Vec2::new(offset_x, offset_y);
    }

    pub fn add_impulse(&mut self, impulse: Vec2) {
        self.velocity += impulse;
        if impulse.y > 0.0 {
            self.grounded = false;
        }
    }

    pub fn set_horizontal_speed(&mut self, speed: f32) {
        self.velocity.x = speed;
    }

    pub fn stop_horizontal(&mut self) {
        self.velocity.x = 0.0;
    }

    pub fn set_vertical_velocity(&mut self, speed: f32) {
        self.velocity.y = speed;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_touching_wall_left(&self) -> bool {
        self.touching_wall_left
    }

    pub fn is_touching_wall_right(&self) -> bool {
        self.touching_wall_right
    }

    pub fn is_in_water(&self) -> bool {
        self.in_water
    }

    pub fn collider_size(&self) -> Vec2 {
        self.collider_size
    }

    /// Collider center in world space
    pub fn collider_center(&self) -> Vec2 {
        self.position + self.collider_offset + self.collider_size * 0.5
    }

    /// Advance by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        self.velocity.y += self.gravity * dt;
        self.touching_wall_left = false;
        self.touching_wall_right = false;
        match self.map.clone() {
            Some(map) => self.integrate_with_collisions(&map, dt),
            None => self.integrate_flat(dt),
        }
    }

    fn integrate_flat(&mut self, dt: f32) {
        self.in_water = false;
        self.position += self.velocity * dt;
        if self.position.y < self.ground_y {
            self.position.y = self.ground_y;
            self.grounded = true;
            if self.velocity.y < 0.0 {
                self.velocity.y = 0.0;
            }
        } else {
            self.grounded = false;
        }
    }

    fn integrate_with_collisions(&mut self, map: &LevelCollisionMap, dt: f32) {
        self.position.x += self.velocity.x * dt;
        self.resolve_horizontal(map);
        self.position.y += self.velocity.y * dt;
        self.resolve_vertical(map);
        self.refresh_wall_contact(map);
        self.in_water = map.overlaps_water(
            self.left() + COLLISION_EPSILON,
            self.bottom() + COLLISION_EPSILON,
            self.right() - COLLISION_EPSILON,
            self.top() - COLLISION_EPSILON,
        );
    }

    /// Inclusive row range covered by the collider
    fn rows_spanned(&self, map: &LevelCollisionMap) -> (i32, i32) {
        let a = map.world_to_row(self.bottom() + COLLISION_EPSILON);
        let b = map.world_to_row(self.top() - COLLISION_EPSILON);
        (a.min(b), a.max(b))
    }

    fn cols_spanned(&self, map: &LevelCollisionMap) -> (i32, i32) {
        let a = map.world_to_col(self.left() + COLLISION_EPSILON);
        let b = map.world_to_col(self.right() - COLLISION_EPSILON);
        (a.min(b), a.max(b))
    }

    fn column_blocked(map: &LevelCollisionMap, col: i32, rows: (i32, i32)) -> bool {
        (rows.0..=rows.1).any(|row| map.is_solid(row, col))
    }

    fn resolve_horizontal(&mut self, map: &LevelCollisionMap) {
        if self.velocity.x.abs() < 0.01 {
            return;
        }
        let rows = self.rows_spanned(map);
        if self.velocity.x > 0.0 {
            let col = map.world_to_col(self.right() - COLLISION_EPSILON);
            if Self::column_blocked(map, col, rows) {
                self.set_left(map.col_left(col) - self.collider_size.x);
                self.velocity.x = 0.0;
                self.touching_wall_right = true;
            }
        } else {
            let col = map.world_to_col(self.left() + COLLISION_EPSILON);
            if Self::column_blocked(map, col, rows) {
                self.set_left(map.col_right(col));
                self.velocity.x = 0.0;
                self.touching_wall_left = true;
            }
        }
    }

    fn resolve_vertical(&mut self, map: &LevelCollisionMap) {
        let (c0, c1) = self.cols_spanned(map);
        if self.velocity.y <= 0.0 {
            let row = map.world_to_row(self.bottom() - COLLISION_EPSILON);
            if (c0..=c1).any(|col| map.is_solid(row, col)) {
                self.set_bottom(map.row_top(row));
                self.velocity.y = 0.0;
                self.grounded = true;
            } else {
                self.grounded = false;
            }
        } else {
            let row = map.world_to_row(self.top() + COLLISION_EPSILON);
            if (c0..=c1).any(|col| map.is_solid(row, col)) {
                self.set_bottom(map.row_bottom(row) - self.collider_size.y);
                self.velocity.y = 0.0;
            }
            self.grounded = false;
        }
    }

    fn refresh_wall_contact(&mut self, map: &LevelCollisionMap) {
        let rows = self.rows_spanned(map);
        let left_col = map.world_to_col(self.left() - COLLISION_EPSILON);
        let right_col = map.world_to_col(self.right() + COLLISION_EPSILON);
        self.touching_wall_left = Self::column_blocked(map, left_col, rows);
        self.touching_wall_right = Self::column_blocked(map, right_col, rows);
    }

    fn left(&self) -> f32 {
        self.position.x + self.collider_offset.x
    }

    fn right(&self) -> f32 {
        self.left() + self.collider_size.x
    }

    fn bottom(&self) -> f32 {
        self.position.y + self.collider_offset.y
    }

    fn top(&self) -> f32 {
        self.bottom() + self.collider_size.y
    }

    fn set_left(&mut self, left: f32) {
        self.position.x = left - self.collider_offset.x;
    }

    fn set_bottom(&mut self, bottom: f32) {
        self.position.y = bottom - self.collider_offset.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use celeste_core::{InspectorSnapshot, LevelBlueprint, TileBlueprint, TileRef};

    /// 6x8 level: solid floor on row 5, a wall at col 5 on rows 2..=4
    fn test_map(water: Vec<TileRef>) -> Arc<LevelCollisionMap> {
        let mut level = LevelBlueprint::new(6, 8);
        for col in 0..8 {
            level.set(5, col, TileBlueprint::single(0));
        }
        for row in 2..5 {
            level.set(row, 5, TileBlueprint::single(0));
        }
        let snapshot = InspectorSnapshot {
            water,
            ..Default::default()
        };
        Arc::new(LevelCollisionMap::new(&level, Some(&snapshot), 32.0))
    }

    fn controller(map: Arc<LevelCollisionMap>) -> KinematicController {
        let mut c = KinematicController::default();
        c.configure_collider(20.0, 40.0, 0.0, 0.0);
        c.set_collision_map(Some(map));
        c
    }

    #[test]
    fn test_flat_ground_clamp() {
        let mut c = KinematicController::default();
        c.place(0.0, 10.0);
        for _ in 0..60 {
            c.update(1.0 / 60.0);
        }
        assert!(c.is_grounded());
        assert_eq!(c.position().y, 0.0);
        assert_eq!(c.velocity().y, 0.0);
    }

    #[test]
    fn test_lands_on_floor_tile() {
        let mut c = controller(test_map(Vec::new()));
        // Floor row 5 has its top at y=32
        c.place(40.0, 60.0);
        for _ in 0..120 {
            c.update(1.0 / 60.0);
        }
        assert!(c.is_grounded());
        assert!((c.position().y - 32.0).abs() < 1e-3);
    }

    #[test]
    fn test_wall_stops_horizontal_motion() {
        let mut c = controller(test_map(Vec::new()));
        c.place(100.0, 32.0);
        c.update(1.0 / 60.0);
        for _ in 0..60 {
            c.set_horizontal_speed(300.0);
            c.update(1.0 / 60.0);
        }
        // Wall column 5 starts at x=160
        assert!((c.position().x + 20.0 - 160.0).abs() < 1e-3);
        assert!(c.is_touching_wall_right());
        assert!(!c.is_touching_wall_left());
        assert_eq!(c.velocity().x, 0.0);
    }

    #[test]
    fn test_ceiling_stops_jump() {
        let mut c = controller(test_map(Vec::new()));
        c.place(0.0, 32.0);
        c.update(1.0 / 60.0);
        assert!(c.is_grounded());
        c.add_impulse(Vec2::new(0.0, 2000.0));
        assert!(!c.is_grounded());
        for _ in 0..30 {
            c.update(1.0 / 60.0);
        }
        // Row 0 top is the level ceiling at y=192; outside the grid counts as solid
        assert!(c.position().y + 40.0 <= 192.0 + 1e-3);
    }

    #[test]
    fn test_water_flag() {
        let mut c = controller(test_map(vec![TileRef::new(4, 1)]));
        c.place(36.0, 32.0);
        c.update(1.0 / 60.0);
        assert!(c.is_in_water());

        c.place(200.0, 32.0);
        c.update(1.0 / 60.0);
        assert!(!c.is_in_water());
    }

    #[test]
    fn test_collider_center() {
        let mut c = KinematicController::default();
        c.configure_collider(40.0, 80.0, 10.0, 0.0);
        c.place(100.0, 50.0);
        assert_eq!(c.collider_center(), Vec2::new(130.0, 90.0));
    }
}
