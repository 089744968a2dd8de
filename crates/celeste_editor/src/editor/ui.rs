use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use std::path::PathBuf;

use super::document::EditorDocument;
use super::shortcuts::{apply_action, shortcut_actions, EditorAction};
use crate::canvas::{
    self, PaletteTexture, DOOR_COLOR, ENEMY_COLOR, KEY_COLOR, SOLID_COLOR, WATER_COLOR,
};
use crate::data::DataFiles;
use crate::preferences::EditorPreferences;

const HELP: &str = "LMB select/paint | 1=solid 2=water 3=door 4=key 5=enemy | X=air \
                    [ ]=frames -/= duration O=add frame P=dump | Ctrl+S save Ctrl+C clear cell \
                    Shift+C clear map Ctrl+Z/Y undo/redo Ctrl+O open TSX | Esc quit";

/// TSX and data directory the editor starts with
#[derive(Resource, Debug, Clone)]
pub struct EditorLaunch {
    pub tsx_path: PathBuf,
    pub files: DataFiles,
}

/// Tileset the user picked, applied on the next frame
#[derive(Resource, Default)]
pub struct PendingTileset(pub Option<PathBuf>);

pub fn setup_editor(mut commands: Commands, launch: Res<EditorLaunch>) {
    let (document, warnings) = EditorDocument::load(&launch.tsx_path, launch.files.clone());
    for warning in warnings {
        warn!("{}", warning);
    }
    info!(
        "MapEditor started with TSX: {} ({}x{})",
        document.tsx_path.display(),
        document.map.rows(),
        document.map.cols()
    );
    commands.insert_resource(document);
}

pub fn handle_editor_shortcuts(
    keys: Res<ButtonInput<KeyCode>>,
    mut document: ResMut<EditorDocument>,
    mut pending: ResMut<PendingTileset>,
    mut exit: MessageWriter<AppExit>,
) {
    for action in shortcut_actions(&keys) {
        match action {
            EditorAction::Quit => {
                info!("MapEditor terminated");
                exit.write(AppExit::Success);
            }
            EditorAction::OpenTileset => pending.0 = pick_tsx(),
            action => {
                apply_action(&mut document, action);
            }
        }
    }
}

/// Swap in a tileset chosen from the dialog
pub fn apply_pending_tileset(
    mut pending: ResMut<PendingTileset>,
    mut document: ResMut<EditorDocument>,
    preferences: Option<ResMut<EditorPreferences>>,
) {
    let Some(path) = pending.0.take() else {
        return;
    };
    match document.load_tileset(&path) {
        Ok(rejected) => {
            for reason in rejected {
                warn!("{}", reason);
            }
            document.set_status(format!("Loaded tileset {}", path.display()));
            if let Some(mut preferences) = preferences {
                if preferences.remember_tsx(&path) {
                    if let Err(e) = preferences.save() {
                        error!("Failed to save preferences: {}", e);
                    }
                }
            }
        }
        Err(e) => {
            error!("Failed to load tileset from {}: {}", path.display(), e);
            document.set_status("Failed to load tileset (see log)");
        }
    }
}

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
fn pick_tsx() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Tiled Tileset", &["tsx"])
        .add_filter("All Files", &["*"])
        .set_title("Open Tileset")
        .pick_file()
}

#[cfg(not(all(feature = "native", not(target_arch = "wasm32"))))]
fn pick_tsx() -> Option<PathBuf> {
    None
}

#[derive(Default)]
pub struct EditorView {
    texture: Option<PaletteTexture>,
}

pub fn draw_editor(
    mut contexts: EguiContexts,
    mut document: ResMut<EditorDocument>,
    mut pending: ResMut<PendingTileset>,
    mut view: Local<EditorView>,
    time: Res<Time>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    document.tick(time.delta_secs());

    let revision = document.palette_revision();
    if view.texture.as_ref().map(|t| t.revision) != Some(revision) {
        view.texture = document
            .palette
            .as_ref()
            .map(|palette| PaletteTexture::upload(ctx, palette, revision));
    }

    egui::TopBottomPanel::top("editor_status").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if ui.button("Open TSX...").clicked() {
                pending.0 = pick_tsx();
            }
            if ui.button("Save").clicked() {
                document.save_all();
            }
            ui.label(document.status_line());
        });
        ui.label(egui::RichText::new(HELP).small());
        if let Some(status) = document.status() {
            ui.colored_label(egui::Color32::YELLOW, status);
        }
    });

    let palette_width = ctx.available_rect().width() * 0.3;
    egui::SidePanel::right("palette")
        .exact_width(palette_width)
        .resizable(false)
        .show(ctx, |ui| {
            draw_palette(ui, &mut document, view.texture.as_ref())
        });

    egui::CentralPanel::default()
        .frame(egui::Frame::NONE.fill(egui::Color32::from_rgb(15, 15, 23)))
        .show(ctx, |ui| {
            draw_map(
                ui,
                &mut document,
                view.texture.as_ref(),
                time.elapsed_secs(),
            )
        });
}

fn draw_map(
    ui: &mut egui::Ui,
    document: &mut EditorDocument,
    texture: Option<&PaletteTexture>,
    time: f32,
) {
    let (rows, cols) = (document.map.rows(), document.map.cols());
    let tile_size = canvas::map_tile_size(ui.available_size(), rows, cols);
    let size = egui::vec2(cols as f32, rows as f32) * tile_size;
    let (response, painter) = ui.allocate_painter(size, egui::Sense::click());
    let origin = response.rect.min;

    canvas::draw_blueprint(
        &painter,
        origin,
        tile_size,
        &document.map.blueprint,
        texture,
        document.palette_len(),
        time,
    );

    for row in 0..rows {
        for col in 0..cols {
            let rect = canvas::cell_rect(origin, tile_size, row, col);
            if document.map.is_solid(row, col) {
                painter.rect_filled(rect, 0.0, SOLID_COLOR);
            }
            if document.map.is_water(row, col) {
                painter.rect_filled(rect, 0.0, WATER_COLOR);
            }
            if let Some(channel) = document.map.door(row, col) {
                painter.rect_filled(rect.shrink(tile_size * 0.1), 0.0, DOOR_COLOR);
                channel_label(&painter, rect, channel);
            }
            if let Some(channel) = document.map.key(row, col) {
                painter.circle_filled(rect.center(), tile_size * 0.25, KEY_COLOR);
                channel_label(&painter, rect, channel);
            }
            if document.map.enemy(row, col).is_some() {
                painter.rect_filled(rect.shrink(tile_size * 0.25), 0.0, ENEMY_COLOR);
            }
        }
    }

    if let Some(cell) = document.selected_cell {
        canvas::outline(
            &painter,
            canvas::cell_rect(origin, tile_size, cell.row, cell.col),
            egui::Color32::WHITE,
        );
    }

    if response.clicked() {
        if let Some((row, col)) = response
            .interact_pointer_pos()
            .and_then(|pos| canvas::cell_at(origin, tile_size, pos, rows, cols))
        {
            document.click_map(row, col);
        }
    }
}

fn channel_label(painter: &egui::Painter, rect: egui::Rect, channel: u32) {
    painter.text(
        rect.left_top() + egui::vec2(2.0, 1.0),
        egui::Align2::LEFT_TOP,
        channel.to_string(),
        egui::FontId::monospace(10.0),
        egui::Color32::WHITE,
    );
}

fn draw_palette(
    ui: &mut egui::Ui,
    document: &mut EditorDocument,
    texture: Option<&PaletteTexture>,
) {
    let (Some(palette), Some(texture)) = (document.palette.as_ref(), texture) else {
        ui.label("No tileset loaded. Use Open TSX...");
        return;
    };
    let columns = palette.columns.max(1) as usize;
    let rows = palette.rows().max(1) as usize;
    let count = palette.len();
    let tile_size = canvas::map_tile_size(ui.available_size(), rows, columns);
    let size = egui::vec2(columns as f32, rows as f32) * tile_size;

    let mut clicked = None;
    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(size, egui::Sense::click());
            let origin = response.rect.min;
            for index in 0..count {
                let rect = canvas::cell_rect(origin, tile_size, index / columns, index % columns);
                texture.paint(&painter, rect, index as u32);
            }
            if let Some(index) = document.selected_tile {
                let index = index as usize;
                let rect = canvas::cell_rect(origin, tile_size, index / columns, index % columns);
                canvas::outline(&painter, rect, egui::Color32::WHITE);
            }
            if response.clicked() {
                clicked = response
                    .interact_pointer_pos()
                    .and_then(|pos| canvas::cell_at(origin, tile_size, pos, rows, columns))
                    .map(|(row, col)| row * columns + col);
            }
        });

    if let Some(index) = clicked {
        document.select_palette(index);
    }
}
