//! Generic server-paginated table widget.
//!
//! Draws a [`TableView`] and reports what the user asked for as [`TableEvent`]s. The
//! widget owns no data; the page applies the events and refetches.

use eframe::egui::{self, Align, Layout, RichText, ScrollArea, Ui};
use egui_phosphor::regular::{ARROWS_CLOCKWISE, CARET_DOWN, CARET_LEFT, CARET_RIGHT, CARET_UP, FILE_TEXT, TRASH};

use crate::config::ROWS_PER_PAGE_CHOICES;
use crate::table::filter::ALL_LABEL;
use crate::table::{BodyState, Column, SortDir, TableEvent, TableView};

use super::components::{danger_action_button, primary_button_with_icon, styled_button, styled_button_with_icon};

/// Placeholder for empty cells on screen.
const EMPTY_CELL: &str = "-";

/// Show the table. `id` must be unique per page.
pub fn show(ui: &mut Ui, id: &str, view: &TableView<'_>) -> Vec<TableEvent> {
    let mut events = Vec::new();

    toolbar(ui, id, view, &mut events);
    ui.add_space(15.0);
    body(ui, id, view, &mut events);
    ui.add_space(10.0);
    ui.separator();
    pagination_bar(ui, id, view, &mut events);

    events
}

fn toolbar(ui: &mut Ui, id: &str, view: &TableView<'_>, events: &mut Vec<TableEvent>) {
    ui.horizontal_wrapped(|ui| {
        for key in view.filter_keys {
            let current = view.filters.get(*key);

            ui.label(format!("{}:", key.label()));
            egui::ComboBox::from_id_salt((id, key.name()))
                .width(150.0)
                .selected_text(view.filter_options.label_for(*key, current))
                .show_ui(ui, |ui| {
                    if ui.selectable_label(current.is_none(), ALL_LABEL).clicked() && current.is_some() {
                        events.push(TableEvent::Filter(*key, None));
                    }
                    for option in view.filter_options.get(*key) {
                        let selected = current == Some(option.value.as_str());
                        if ui.selectable_label(selected, &option.label).clicked() && !selected {
                            events.push(TableEvent::Filter(*key, Some(option.value.clone())));
                        }
                    }
                });
            ui.add_space(10.0);
        }

        let any_constrained = view.filter_keys.iter().any(|k| view.filters.is_constrained(*k));
        if any_constrained && styled_button(ui, "Clear").clicked() {
            for key in view.filter_keys {
                if view.filters.is_constrained(*key) {
                    events.push(TableEvent::Filter(*key, None));
                }
            }
        }

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if view.can_export && primary_button_with_icon(ui, FILE_TEXT, "Generate Report").clicked() {
                events.push(TableEvent::OpenReport);
            }
            ui.add_space(10.0);
            if ui
                .add_enabled_ui(!view.loading, |ui| styled_button_with_icon(ui, ARROWS_CLOCKWISE, "Refresh"))
                .inner
                .clicked()
            {
                events.push(TableEvent::Refresh);
            }
        });
    });
}

fn header_cell(ui: &mut Ui, view: &TableView<'_>, column: &Column, events: &mut Vec<TableEvent>) {
    if column.is_actions() {
        ui.strong("Actions");
        return;
    }
    if !column.sortable {
        ui.strong(&column.label);
        return;
    }

    let arrow = match view.sort.direction_of(&column.key) {
        Some(SortDir::Asc) => format!(" {CARET_UP}"),
        Some(SortDir::Desc) => format!(" {CARET_DOWN}"),
        None => String::new(),
    };
    let text = RichText::new(format!("{}{arrow}", column.label)).strong();
    if ui
        .add(egui::Button::new(text).frame(false))
        .on_hover_text("Sort")
        .clicked()
    {
        events.push(TableEvent::Sort(column.key.clone()));
    }
}

fn body(ui: &mut Ui, id: &str, view: &TableView<'_>, events: &mut Vec<TableEvent>) {
    match view.body_state() {
        BodyState::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading...");
            });
            return;
        }
        BodyState::Empty => {
            ui.vertical_centered(|ui| {
                ui.add_space(30.0);
                ui.label(RichText::new("No records found").weak());
                ui.add_space(30.0);
            });
            return;
        }
        BodyState::Rows => {}
    }

    let columns: Vec<&Column> = view.visible_columns().collect();

    ScrollArea::both()
        .id_salt((id, "scroll"))
        .max_height(ui.available_height() - 50.0)
        .show(ui, |ui| {
            ui.add_space(4.0);
            egui::Grid::new((id, "grid"))
                .num_columns(columns.len())
                .striped(true)
                .min_col_width(60.0)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    for column in &columns {
                        header_cell(ui, view, column, events);
                    }
                    ui.end_row();

                    for (index, row) in view.rows.iter().enumerate() {
                        for column in &columns {
                            if column.is_actions() {
                                if danger_action_button(ui, TRASH, "Delete").clicked() {
                                    events.push(TableEvent::DeleteRow(index));
                                }
                            } else {
                                ui.label(column.cell(row).display(EMPTY_CELL));
                            }
                        }
                        ui.end_row();
                    }
                });
        });
}

fn pagination_bar(ui: &mut Ui, id: &str, view: &TableView<'_>, events: &mut Vec<TableEvent>) {
    let pagination = view.pagination;

    ui.horizontal(|ui| {
        ui.label("Rows per page:");
        egui::ComboBox::from_id_salt((id, "rows_per_page"))
            .width(60.0)
            .selected_text(pagination.rows_per_page.to_string())
            .show_ui(ui, |ui| {
                for choice in ROWS_PER_PAGE_CHOICES {
                    let selected = pagination.rows_per_page == choice;
                    if ui.selectable_label(selected, choice.to_string()).clicked() && !selected {
                        events.push(TableEvent::RowsPerPageChanged(choice));
                    }
                }
            });

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if ui
                .add_enabled(pagination.has_next() && !view.loading, egui::Button::new(CARET_RIGHT))
                .clicked()
            {
                events.push(TableEvent::PageChanged(pagination.current_page + 1));
            }
            ui.label(format!(
                "Page {} of {}",
                pagination.current_page,
                pagination.total_pages().max(1)
            ));
            if ui
                .add_enabled(pagination.has_prev() && !view.loading, egui::Button::new(CARET_LEFT))
                .clicked()
            {
                events.push(TableEvent::PageChanged(pagination.current_page - 1));
            }
            ui.add_space(10.0);
            ui.label(pagination.range_label());
        });
    });
}
