//! "Generate Report" dialog: format, fields and filters for one entity page.

use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_phosphor::regular::FILE_ARROW_DOWN;

use crate::pages::Entity;
use crate::report::{ReportDialogState, ReportFormat, ReportType};
use crate::table::filter::ALL_LABEL;
use crate::table::{Column, FilterKey, FilterOptions, FilterSet};

use super::app::App;
use super::components::{colors, primary_button_with_icon, styled_button};
use super::entity_panel::EntityPage;

enum DialogAction {
    None,
    Generate,
    Cancel,
}

/// Show the report dialog of `entity`'s page.
pub fn show(app: &mut App, ctx: &egui::Context, entity: Entity) {
    let Some(report_type) = entity.report_type() else {
        app.page_mut(entity).report.close();
        return;
    };

    let mut action = DialogAction::None;
    {
        let EntityPage {
            columns,
            table,
            options,
            report,
            ..
        } = app.page_mut(entity);
        report.sync(report_type, columns, &table.filters, options);

        egui::Window::new(format!("Generate {}", report_type.title()))
            .collapsible(false)
            .resizable(false)
            .default_width(480.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.add_enabled_ui(!report.busy, |ui| {
                    format_section(ui, report);
                    ui.add_space(10.0);
                    fields_section(ui, report, columns);
                    ui.add_space(10.0);
                    filters_section(ui, report, report_type, entity.filter_keys(), options);
                });

                ui.add_space(15.0);
                ui.separator();

                ui.horizontal(|ui| {
                    if report.busy {
                        ui.spinner();
                        ui.label("Generating...");
                        return;
                    }
                    if styled_button(ui, "Cancel").clicked() {
                        action = DialogAction::Cancel;
                    }
                    ui.add_space(10.0);
                    if primary_button_with_icon(ui, FILE_ARROW_DOWN, "Generate").clicked() {
                        action = DialogAction::Generate;
                    }
                });
            });
    }

    match action {
        DialogAction::None => {}
        DialogAction::Cancel => app.page_mut(entity).report.close(),
        DialogAction::Generate => app.generate_report(entity),
    }
}

fn format_section(ui: &mut Ui, report: &mut ReportDialogState) {
    ui.label(RichText::new("Format").strong());
    ui.horizontal(|ui| {
        for format in ReportFormat::ALL {
            ui.radio_value(&mut report.format, format, format.label());
        }
    });
}

fn fields_section(ui: &mut Ui, report: &mut ReportDialogState, columns: &[Column]) {
    ui.horizontal(|ui| {
        ui.label(RichText::new("Fields").strong());
        ui.label(RichText::new(format!("({} selected)", report.fields.selected_count())).weak());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("None").clicked() {
                report.fields.set_all(false);
            }
            if ui.small_button("All").clicked() {
                report.fields.set_all(true);
            }
        });
    });

    ScrollArea::vertical()
        .id_salt("report_fields")
        .max_height(160.0)
        .show(ui, |ui| {
            egui::Grid::new("report_fields_grid")
                .num_columns(2)
                .spacing([20.0, 4.0])
                .show(ui, |ui| {
                    for (i, column) in columns.iter().filter(|c| c.is_exportable()).enumerate() {
                        let mut checked = report.fields.is_selected(&column.key);
                        if ui.checkbox(&mut checked, &column.label).changed() {
                            report.fields.set(&column.key, checked);
                        }
                        if i % 2 == 1 {
                            ui.end_row();
                        }
                    }
                });
        });
}

fn filters_section(
    ui: &mut Ui,
    report: &mut ReportDialogState,
    report_type: ReportType,
    keys: &[FilterKey],
    options: &FilterOptions,
) {
    ui.label(RichText::new("Filters").strong());

    let Some(filters) = report.filters.as_mut() else {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Loading filter options...");
        });
        return;
    };

    egui::Grid::new("report_filters_grid")
        .num_columns(2)
        .spacing([20.0, 8.0])
        .show(ui, |ui| {
            for key in keys {
                ui.label(format!("{}:", key.label()));
                filter_combo(ui, filters, *key, options, report_type);
                ui.end_row();
            }
        });

    if report_type.requires_fee() && !filters.is_constrained(FilterKey::FeeType) {
        ui.add_space(5.0);
        ui.colored_label(
            colors::WARNING,
            format!("A fee type is required for the {}.", report_type.title().to_lowercase()),
        );
    }
}

fn filter_combo(ui: &mut Ui, filters: &mut FilterSet, key: FilterKey, options: &FilterOptions, report_type: ReportType) {
    // Fee-scoped reports cannot run unconstrained.
    let allow_all = !(key == FilterKey::FeeType && report_type.requires_fee());
    let current = filters.get(key).map(str::to_string);

    egui::ComboBox::from_id_salt(("report_filter", key.name()))
        .width(200.0)
        .selected_text(options.label_for(key, current.as_deref()))
        .show_ui(ui, |ui| {
            if allow_all && ui.selectable_label(current.is_none(), ALL_LABEL).clicked() {
                filters.set(key, None);
            }
            for option in options.get(key) {
                let selected = current.as_deref() == Some(option.value.as_str());
                if ui.selectable_label(selected, &option.label).clicked() {
                    filters.set(key, Some(option.value.clone()));
                }
            }
        });
}
