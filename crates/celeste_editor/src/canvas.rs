//! egui drawing shared by the editor and the inspector

use bevy_egui::egui;
use celeste_core::{LevelBlueprint, Palette};

pub const SOLID_COLOR: egui::Color32 = egui::Color32::from_rgba_premultiplied(0, 110, 0, 110);
pub const WATER_COLOR: egui::Color32 = egui::Color32::from_rgba_premultiplied(0, 50, 140, 140);
pub const DOOR_COLOR: egui::Color32 = egui::Color32::from_rgba_premultiplied(150, 150, 0, 150);
pub const KEY_COLOR: egui::Color32 = egui::Color32::from_rgba_premultiplied(160, 90, 0, 160);
pub const ENEMY_COLOR: egui::Color32 = egui::Color32::from_rgba_premultiplied(150, 0, 0, 150);
const GRID_COLOR: egui::Color32 = egui::Color32::from_rgba_premultiplied(50, 50, 50, 50);

/// The palette uploaded to egui as one atlas texture
pub struct PaletteTexture {
    pub revision: u64,
    pub handle: egui::TextureHandle,
    columns: u32,
    rows: u32,
}

impl PaletteTexture {
    pub fn upload(ctx: &egui::Context, palette: &Palette, revision: u64) -> Self {
        let atlas = palette.atlas_image();
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [atlas.width() as usize, atlas.height() as usize],
            atlas.as_raw(),
        );
        Self {
            revision,
            handle: ctx.load_texture("palette", image, egui::TextureOptions::NEAREST),
            columns: palette.columns.max(1),
            rows: palette.rows().max(1),
        }
    }

    /// Texture coordinates of tile `index`
    pub fn uv(&self, index: u32) -> egui::Rect {
        tile_uv(index, self.columns, self.rows)
    }

    pub fn paint(&self, painter: &egui::Painter, rect: egui::Rect, index: u32) {
        painter.image(self.handle.id(), rect, self.uv(index), egui::Color32::WHITE);
    }
}

pub fn tile_uv(index: u32, columns: u32, rows: u32) -> egui::Rect {
    let (w, h) = (1.0 / columns as f32, 1.0 / rows as f32);
    let col = (index % columns) as f32;
    let row = (index / columns) as f32;
    egui::Rect::from_min_size(egui::pos2(col * w, row * h), egui::vec2(w, h))
}

/// Largest whole-pixel tile that fits the map into `pane`, never below 8
pub fn map_tile_size(pane: egui::Vec2, rows: usize, cols: usize) -> f32 {
    if rows == 0 || cols == 0 {
        return 32.0;
    }
    let fit = (pane.x / cols as f32).min(pane.y / rows as f32).floor();
    fit.max(8.0)
}

/// Grid cell under `pos`, row 0 at the top
pub fn cell_at(
    origin: egui::Pos2,
    tile_size: f32,
    pos: egui::Pos2,
    rows: usize,
    cols: usize,
) -> Option<(usize, usize)> {
    let local = pos - origin;
    if local.x < 0.0 || local.y < 0.0 {
        return None;
    }
    let col = (local.x / tile_size) as usize;
    let row = (local.y / tile_size) as usize;
    (row < rows && col < cols).then_some((row, col))
}

pub fn cell_rect(origin: egui::Pos2, tile_size: f32, row: usize, col: usize) -> egui::Rect {
    egui::Rect::from_min_size(
        origin + egui::vec2(col as f32 * tile_size, row as f32 * tile_size),
        egui::vec2(tile_size, tile_size),
    )
}

/// Draw every non-air cell at its frame for `time`, plus grid lines
pub fn draw_blueprint(
    painter: &egui::Painter,
    origin: egui::Pos2,
    tile_size: f32,
    blueprint: &LevelBlueprint,
    texture: Option<&PaletteTexture>,
    palette_len: usize,
    time: f32,
) {
    let size = egui::vec2(blueprint.cols as f32, blueprint.rows as f32) * tile_size;
    painter.rect_filled(
        egui::Rect::from_min_size(origin, size),
        0.0,
        egui::Color32::from_rgb(15, 15, 23),
    );
    if let Some(texture) = texture {
        for (row, col, tile) in blueprint.filled_cells() {
            let Some(index) = tile.frame_at(time) else {
                continue;
            };
            if (index as usize) < palette_len {
                texture.paint(painter, cell_rect(origin, tile_size, row, col), index);
            }
        }
    }
    let stroke = egui::Stroke::new(1.0, GRID_COLOR);
    for row in 0..=blueprint.rows {
        let y = origin.y + row as f32 * tile_size;
        painter.line_segment(
            [egui::pos2(origin.x, y), egui::pos2(origin.x + size.x, y)],
            stroke,
        );
    }
    for col in 0..=blueprint.cols {
        let x = origin.x + col as f32 * tile_size;
        painter.line_segment(
            [egui::pos2(x, origin.y), egui::pos2(x, origin.y + size.y)],
            stroke,
        );
    }
}

pub fn outline(painter: &egui::Painter, rect: egui::Rect, color: egui::Color32) {
    painter.rect_stroke(
        rect,
        0.0,
        egui::Stroke::new(2.0, color),
        egui::StrokeKind::Inside,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_tile_size() {
        assert_eq!(map_tile_size(egui::vec2(1120.0, 900.0), 18, 32), 35.0);
        assert_eq!(map_tile_size(egui::vec2(100.0, 100.0), 18, 32), 8.0);
    }

    #[test]
    fn test_cell_at_uses_top_row_zero() {
        let origin = egui::pos2(10.0, 10.0);
        assert_eq!(
            cell_at(origin, 16.0, egui::pos2(12.0, 12.0), 4, 4),
            Some((0, 0))
        );
        assert_eq!(
            cell_at(origin, 16.0, egui::pos2(45.0, 60.0), 4, 4),
            Some((3, 2))
        );
        assert_eq!(cell_at(origin, 16.0, egui::pos2(5.0, 12.0), 4, 4), None);
        assert_eq!(cell_at(origin, 16.0, egui::pos2(12.0, 80.0), 4, 4), None);
    }

    #[test]
    fn test_tile_uv() {
        let uv = tile_uv(5, 4, 2);
        assert_eq!(uv.min, egui::pos2(0.25, 0.5));
        assert_eq!(uv.max, egui::pos2(0.5, 1.0));
    }
}
