//! Sign-in screen shown while no session is active.

use eframe::egui::{self, Key, RichText, Ui};
use egui_phosphor::regular::SIGN_IN;

use super::app::App;
use super::components::{colors, primary_button_with_icon};

pub fn show(app: &mut App, ui: &mut Ui) {
    let mut submit = false;

    ui.vertical_centered(|ui| {
        ui.add_space(80.0);
        ui.label(RichText::new(&app.config.ui.brand_name).size(32.0).strong());
        ui.add_space(5.0);
        ui.label(RichText::new("Financial Transparency Dashboard").size(14.0).weak());
        ui.add_space(40.0);

        ui.add_enabled_ui(!app.login_form.busy, |ui| {
            egui::Grid::new("login_grid")
                .num_columns(2)
                .spacing([20.0, 10.0])
                .show(ui, |ui| {
                    ui.label("Username:");
                    ui.add(egui::TextEdit::singleline(&mut app.login_form.username).desired_width(220.0));
                    ui.end_row();

                    ui.label("Password:");
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut app.login_form.password)
                            .password(true)
                            .desired_width(220.0),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                        submit = true;
                    }
                    ui.end_row();
                });

            ui.add_space(20.0);

            if primary_button_with_icon(ui, SIGN_IN, "Sign In").clicked() {
                submit = true;
            }
        });

        ui.add_space(15.0);

        if app.login_form.busy {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Signing in...");
            });
        } else if let Some(error) = &app.login_form.error {
            ui.colored_label(colors::ERROR, error);
        }

        ui.add_space(30.0);
        ui.label(RichText::new(format!("Server: {}", app.api.base_url())).small().weak());
    });

    if submit && !app.login_form.busy {
        app.login();
    }
}
