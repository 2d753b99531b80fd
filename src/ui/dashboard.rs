//! Dashboard panel with navigation cards and the activity log.

use eframe::egui::{self, Color32, CornerRadius, Margin, RichText, ScrollArea, Ui};
use egui_phosphor::regular::{BUILDINGS, GRADUATION_CAP, HAND_COINS, MONEY, RECEIPT, USER_GEAR, USERS, WALLET};

use crate::pages::Entity;

use super::app::{App, LogLevel, Panel};
use super::components::dashboard_card;

const CARDS_PER_ROW: usize = 4;

fn entity_icon(entity: Entity) -> &'static str {
    match entity {
        Entity::Students => USERS,
        Entity::Fees => RECEIPT,
        Entity::Payments => MONEY,
        Entity::Remittances => HAND_COINS,
        Entity::Expenses => WALLET,
        Entity::Programs => GRADUATION_CAP,
        Entity::Departments => BUILDINGS,
        Entity::Accounts => USER_GEAR,
    }
}

/// Show the dashboard panel.
///
/// Returns `Some(panel)` if navigation is requested.
pub fn show(app: &App, ui: &mut Ui) -> Option<Panel> {
    let mut next_panel = None;

    let Some(user) = app.session.user().cloned() else {
        return None;
    };
    let entities = Entity::visible_for(user.role);

    ui.vertical_centered(|ui| {
        ui.add_space(30.0);

        ui.label(RichText::new(&app.config.ui.brand_name).size(32.0).strong());
        ui.add_space(5.0);
        ui.label(
            RichText::new(format!("Welcome, {} ({})", user.display_name(), user.role.label()))
                .size(14.0)
                .weak(),
        );

        ui.add_space(30.0);

        let available = ui.available_width();
        let per_row = CARDS_PER_ROW.min(entities.len()).max(1) as f32;
        let spacing = 30.0;
        let total_spacing = spacing * (per_row - 1.0);
        let card_width = ((available - total_spacing) / per_row).clamp(150.0, 250.0);
        let card_size = egui::vec2(card_width, card_width * 0.75);
        let total_width = card_width * per_row + total_spacing;
        let start_offset = ((available - total_width) / 2.0).max(0.0);

        for chunk in entities.chunks(CARDS_PER_ROW) {
            ui.horizontal(|ui| {
                ui.add_space(start_offset);
                for (i, entity) in chunk.iter().enumerate() {
                    if i > 0 {
                        ui.add_space(spacing);
                    }
                    if dashboard_card(ui, entity.title(), entity.description(), entity_icon(*entity), card_size)
                        .clicked()
                    {
                        next_panel = Some(Panel::Entity(*entity));
                    }
                }
            });
            ui.add_space(spacing);
        }
    });

    // Recent Activity
    egui::Frame::new()
        .fill(ui.style().visuals.extreme_bg_color)
        .inner_margin(Margin::same(15))
        .outer_margin(Margin::symmetric(10, 0))
        .corner_radius(CornerRadius::same(8))
        .show(ui, |ui| {
            ui.label(RichText::new("Recent Activity").strong());
            ui.add_space(10.0);

            ScrollArea::vertical().max_height(150.0).show(ui, |ui| {
                if app.log_messages.is_empty() {
                    ui.label(RichText::new("No recent activity").weak());
                } else {
                    for entry in app.log_messages.iter().rev().take(10) {
                        let color = match entry.level {
                            LogLevel::Info => Color32::GRAY,
                            LogLevel::Success => Color32::from_rgb(100, 200, 100),
                            LogLevel::Warning => Color32::from_rgb(230, 180, 50),
                            LogLevel::Error => Color32::from_rgb(230, 100, 100),
                        };

                        ui.horizontal(|ui| {
                            ui.label(
                                RichText::new(entry.timestamp.format("%H:%M:%S").to_string())
                                    .small()
                                    .color(Color32::DARK_GRAY),
                            );
                            ui.label(RichText::new(&entry.message).color(color));
                        });
                    }
                }
            });
        });

    next_panel
}
