//! Player health, score, clock, buffs and the state overlays

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::session::GameSession;

const HEALTH_BAR_SIZE: egui::Vec2 = egui::vec2(260.0, 18.0);

/// Text lines drawn under the health bar
pub fn hud_lines(session: &GameSession) -> Vec<String> {
    let mut lines = vec![
        format!("Score: {}", session.score()),
        format!("Time : {}", session.clock()),
    ];
    lines.extend(
        session
            .samurai()
            .active_power_ups()
            .iter()
            .map(|buff| buff.label()),
    );
    lines
}

pub fn draw_hud(mut contexts: EguiContexts, session: Res<GameSession>) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::Area::new(egui::Id::new("celeste_hud"))
        .anchor(egui::Align2::LEFT_TOP, [16.0, 16.0])
        .order(egui::Order::Foreground)
        .interactable(false)
        .show(ctx, |ui| {
            let health = session.samurai().health();
            let (rect, _) = ui.allocate_exact_size(HEALTH_BAR_SIZE, egui::Sense::hover());
            let painter = ui.painter();
            painter.rect_filled(rect, 2.0, egui::Color32::from_black_alpha(160));
            let mut fill = rect;
            fill.set_width(rect.width() * health.fraction().clamp(0.0, 1.0));
            painter.rect_filled(fill, 2.0, egui::Color32::from_rgb(200, 40, 40));
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                format!("{} / {}", health.current(), health.max()),
                egui::FontId::proportional(13.0),
                egui::Color32::WHITE,
            );

            ui.add_space(6.0);
            for line in hud_lines(&session) {
                ui.label(
                    egui::RichText::new(line)
                        .color(egui::Color32::WHITE)
                        .size(16.0),
                );
            }
        });

    let Some((title, subtitle)) = session.state().overlay() else {
        return;
    };
    egui::Area::new(egui::Id::new("celeste_state_overlay"))
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .order(egui::Order::Foreground)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::NONE
                .fill(egui::Color32::from_black_alpha(170))
                .inner_margin(24.0)
                .corner_radius(6.0)
                .show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.label(
                            egui::RichText::new(title)
                                .color(egui::Color32::WHITE)
                                .size(36.0)
                                .strong(),
                        );
                        ui.add_space(8.0);
                        ui.label(
                            egui::RichText::new(subtitle)
                                .color(egui::Color32::LIGHT_GRAY)
                                .size(16.0),
                        );
                    });
                });
        });
}
