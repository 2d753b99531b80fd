//! First-run setup wizard for configuration.

use std::path::PathBuf;
use std::sync::mpsc;

use eframe::egui::{self, Color32, RichText};

use crate::api::ApiClient;
use crate::config::{ApiConfig, AppConfig, ROWS_PER_PAGE_CHOICES};

/// Connection test state.
#[derive(Default, Clone)]
pub enum ConnectionTestState {
    #[default]
    NotTested,
    Testing,
    Success,
    Failed(String),
}

/// Setup wizard state.
pub struct SetupWizard {
    /// Current step (0-3).
    pub current_step: usize,
    /// Configuration being built.
    pub config: AppConfig,
    /// Server connection test state.
    pub server_test_state: ConnectionTestState,
    /// Wizard completed flag.
    pub completed: bool,
    /// Timeout input as string for text editing.
    timeout_input: String,
    /// Export directory input; empty means the download directory.
    export_dir_input: String,
}

impl Default for SetupWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl SetupWizard {
    pub fn new() -> Self {
        Self::from_config(AppConfig::default())
    }

    /// Fresh wizard, pointed at `server` when one was given on the command line.
    pub fn with_server(server: Option<String>) -> Self {
        let mut config = AppConfig::default();
        if let Some(url) = server {
            config.api.base_url = url;
        }
        Self::from_config(config)
    }

    /// Start from an existing (possibly invalid) configuration.
    pub fn from_config(config: AppConfig) -> Self {
        Self {
            current_step: 0,
            timeout_input: config.api.timeout_secs.to_string(),
            export_dir_input: config
                .export
                .directory
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_default(),
            config,
            server_test_state: ConnectionTestState::NotTested,
            completed: false,
        }
    }

    /// Check if user can proceed to next step.
    pub fn can_proceed(&self) -> bool {
        match self.current_step {
            0 => true,
            1 => matches!(self.server_test_state, ConnectionTestState::Success),
            2 => self.config.validate().is_ok(),
            3 => true,
            _ => false,
        }
    }

    /// Server URL edits invalidate an earlier successful test.
    fn server_changed(&mut self) {
        self.server_test_state = ConnectionTestState::NotTested;
    }

    fn set_timeout_input(&mut self) {
        if let Ok(secs) = self.timeout_input.trim().parse() {
            self.config.api.timeout_secs = secs;
        }
    }

    fn set_export_dir_input(&mut self) {
        let trimmed = self.export_dir_input.trim();
        self.config.export.directory = (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
    }

    /// Get step title.
    fn step_title(&self) -> &'static str {
        match self.current_step {
            0 => "Welcome",
            1 => "Server Connection",
            2 => "Reports & Display",
            3 => "Confirmation",
            _ => "Setup",
        }
    }

    /// Total number of steps.
    const TOTAL_STEPS: usize = 4;
}

/// Setup wizard application.
pub struct SetupApp {
    pub wizard: SetupWizard,
    pub initial_error: Option<String>,
    config_path: PathBuf,
    rt: tokio::runtime::Runtime,
    server_test_rx: Option<mpsc::Receiver<Result<(), String>>>,
}

impl SetupApp {
    pub fn new(
        wizard: SetupWizard,
        initial_error: Option<String>,
        config_path: PathBuf,
        rt: tokio::runtime::Runtime,
    ) -> Self {
        Self {
            wizard,
            initial_error,
            config_path,
            rt,
            server_test_rx: None,
        }
    }

    /// Test the server connection asynchronously.
    fn start_server_test(&mut self) {
        let config = self.wizard.config.api.clone();
        let (tx, rx) = mpsc::channel();
        self.server_test_rx = Some(rx);
        self.wizard.server_test_state = ConnectionTestState::Testing;

        self.rt.spawn(async move {
            let result = test_server_connection(&config).await;
            let _ = tx.send(result);
        });
    }

    /// Check for async test results.
    fn poll_test_results(&mut self) {
        if let Some(rx) = &self.server_test_rx
            && let Ok(result) = rx.try_recv()
        {
            self.wizard.server_test_state = match result {
                Ok(()) => ConnectionTestState::Success,
                Err(e) => ConnectionTestState::Failed(e),
            };
            self.server_test_rx = None;
        }
    }
}

impl eframe::App for SetupApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll async test results
        self.poll_test_results();

        // Request repaint while testing
        if matches!(self.wizard.server_test_state, ConnectionTestState::Testing) {
            ctx.request_repaint();
        }

        // Show initial error dialog
        if let Some(err) = self.initial_error.clone() {
            egui::Window::new("Configuration Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(Color32::from_rgb(255, 100, 100), &err);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.initial_error = None;
                    }
                });
            return;
        }

        // Main wizard panel
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);

                // Header
                ui.horizontal(|ui| {
                    ui.heading(RichText::new("Treasury Desk Setup").size(24.0).strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(format!(
                            "Step {} of {}",
                            self.wizard.current_step + 1,
                            SetupWizard::TOTAL_STEPS
                        ));
                    });
                });

                ui.separator();
                ui.add_space(10.0);

                ui.heading(self.wizard.step_title());
                ui.add_space(20.0);

                let needs_server_test = match self.wizard.current_step {
                    0 => {
                        show_welcome_step(ui);
                        false
                    }
                    1 => show_server_step(ui, &mut self.wizard),
                    2 => {
                        show_reports_step(ui, &mut self.wizard);
                        false
                    }
                    3 => {
                        show_confirmation_step(ui, &self.wizard);
                        false
                    }
                    _ => false,
                };

                if needs_server_test {
                    self.start_server_test();
                }

                ui.add_space(30.0);
                ui.separator();

                // Navigation buttons
                ui.horizontal(|ui| {
                    if self.wizard.current_step > 0 && ui.button("< Back").clicked() {
                        self.wizard.current_step -= 1;
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if self.wizard.current_step < SetupWizard::TOTAL_STEPS - 1 {
                            let btn_text = if self.wizard.current_step == 0 {
                                "Get Started >"
                            } else {
                                "Next >"
                            };
                            let enabled = self.wizard.can_proceed();
                            if ui.add_enabled(enabled, egui::Button::new(btn_text)).clicked() {
                                self.wizard.current_step += 1;
                            }
                        } else if ui.button("Save & Exit").clicked() {
                            self.wizard.completed = true;
                        }
                    });
                });
            });
        });

        // Handle completion
        if self.wizard.completed {
            match self.wizard.config.save(&self.config_path) {
                Ok(()) => {
                    tracing::info!("Configuration saved to {:?}", self.config_path);
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
                Err(e) => {
                    self.initial_error = Some(format!("Failed to save config: {}", e));
                    self.wizard.completed = false;
                }
            }
        }
    }
}

fn show_welcome_step(ui: &mut egui::Ui) {
    ui.label("Welcome to Treasury Desk!");
    ui.add_space(10.0);
    ui.label("This wizard will help you configure the application.");
    ui.add_space(20.0);
    ui.label("You will need:");
    ui.add_space(5.0);
    ui.label("  - The address of your organization's treasury server");
    ui.label("  - A folder where generated reports should be saved (optional)");
}

fn show_server_step(ui: &mut egui::Ui, wizard: &mut SetupWizard) -> bool {
    let mut needs_test = false;

    egui::Grid::new("server_grid")
        .num_columns(2)
        .spacing([20.0, 8.0])
        .striped(true)
        .show(ui, |ui| {
            ui.label("Server URL:");
            if ui.text_edit_singleline(&mut wizard.config.api.base_url).changed() {
                wizard.server_changed();
            }
            ui.end_row();

            ui.label("Timeout (seconds):");
            if ui.text_edit_singleline(&mut wizard.timeout_input).changed() {
                wizard.set_timeout_input();
                wizard.server_changed();
            }
            ui.end_row();
        });

    ui.add_space(20.0);

    ui.horizontal(|ui| {
        let testing = matches!(wizard.server_test_state, ConnectionTestState::Testing);
        if ui.add_enabled(!testing, egui::Button::new("Test Connection")).clicked() {
            needs_test = true;
        }

        ui.add_space(10.0);

        match &wizard.server_test_state {
            ConnectionTestState::NotTested => {
                ui.label("Not tested");
            }
            ConnectionTestState::Testing => {
                ui.spinner();
                ui.label("Testing...");
            }
            ConnectionTestState::Success => {
                ui.colored_label(Color32::from_rgb(100, 200, 100), "Server reachable!");
            }
            ConnectionTestState::Failed(e) => {
                ui.colored_label(Color32::from_rgb(255, 100, 100), format!("Failed: {}", e));
            }
        }
    });

    needs_test
}

fn show_reports_step(ui: &mut egui::Ui, wizard: &mut SetupWizard) {
    egui::Grid::new("reports_grid")
        .num_columns(2)
        .spacing([20.0, 8.0])
        .striped(true)
        .show(ui, |ui| {
            ui.label("Organization name:");
            ui.text_edit_singleline(&mut wizard.config.ui.brand_name);
            ui.end_row();

            ui.label("Report folder:");
            ui.horizontal(|ui| {
                if ui
                    .add(egui::TextEdit::singleline(&mut wizard.export_dir_input).hint_text("Downloads"))
                    .changed()
                {
                    wizard.set_export_dir_input();
                }
                if ui.button("Browse...").clicked()
                    && let Some(dir) = rfd::FileDialog::new().pick_folder()
                {
                    wizard.export_dir_input = dir.display().to_string();
                    wizard.set_export_dir_input();
                }
            });
            ui.end_row();

            ui.label("Save location:");
            ui.checkbox(&mut wizard.config.export.ask_location, "Ask where to save each report");
            ui.end_row();

            ui.label("Rows per page:");
            egui::ComboBox::from_id_salt("setup_rows_per_page")
                .selected_text(wizard.config.ui.rows_per_page.to_string())
                .show_ui(ui, |ui| {
                    for choice in ROWS_PER_PAGE_CHOICES {
                        ui.selectable_value(&mut wizard.config.ui.rows_per_page, choice, choice.to_string());
                    }
                });
            ui.end_row();
        });

    // Validation feedback
    if let Err(e) = wizard.config.validate() {
        ui.add_space(10.0);
        ui.colored_label(Color32::from_rgb(255, 100, 100), e.to_string());
    }
}

fn show_confirmation_step(ui: &mut egui::Ui, wizard: &SetupWizard) {
    ui.label("Review your configuration:");
    ui.add_space(10.0);

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.heading("Server");
        ui.label(format!("  {}", wizard.config.api.base_url));
        ui.label(format!("  Timeout: {} seconds", wizard.config.api.timeout_secs));
    });

    ui.add_space(10.0);

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.heading("Reports");
        ui.label(format!("  Organization: {}", wizard.config.ui.brand_name));
        ui.label(format!(
            "  Folder: {}",
            wizard.config.export.resolved_directory().display()
        ));
        ui.label(format!(
            "  Save location: {}",
            if wizard.config.export.ask_location {
                "Ask every time"
            } else {
                "Save to folder"
            }
        ));
        ui.label(format!("  Rows per page: {}", wizard.config.ui.rows_per_page));
    });

    ui.add_space(20.0);
    ui.label("Click 'Save & Exit' to save and close the wizard.");
    ui.label("You will need to restart the application after setup.");
}

/// Check that the server answers at all.
async fn test_server_connection(config: &ApiConfig) -> Result<(), String> {
    let candidate = AppConfig {
        api: config.clone(),
        ..Default::default()
    };
    candidate.validate().map_err(|e| e.to_string())?;

    let client = ApiClient::new(config).map_err(|e| e.user_message())?;
    match client.test_connection().await {
        Ok(true) => Ok(()),
        Ok(false) => Err("Server responded with an internal error".to_string()),
        Err(e) => Err(e.user_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_step_requires_successful_test() {
        let mut wizard = SetupWizard::new();
        wizard.current_step = 1;
        assert!(!wizard.can_proceed());

        wizard.server_test_state = ConnectionTestState::Success;
        assert!(wizard.can_proceed());

        wizard.server_changed();
        assert!(!wizard.can_proceed());
    }

    #[test]
    fn test_text_inputs_update_config() {
        let mut wizard = SetupWizard::new();

        wizard.timeout_input = "45".to_string();
        wizard.set_timeout_input();
        assert_eq!(wizard.config.api.timeout_secs, 45);

        wizard.timeout_input = "abc".to_string();
        wizard.set_timeout_input();
        assert_eq!(wizard.config.api.timeout_secs, 45);

        wizard.export_dir_input = "  /srv/reports ".to_string();
        wizard.set_export_dir_input();
        assert_eq!(wizard.config.export.directory, Some(PathBuf::from("/srv/reports")));

        wizard.export_dir_input.clear();
        wizard.set_export_dir_input();
        assert_eq!(wizard.config.export.directory, None);
    }

    #[test]
    fn test_reports_step_validates_config() {
        let mut wizard = SetupWizard::new();
        wizard.current_step = 2;
        assert!(wizard.can_proceed());

        wizard.config.ui.brand_name = " ".to_string();
        assert!(!wizard.can_proceed());
    }

    #[test]
    fn test_from_config_prefills_inputs() {
        let mut config = AppConfig::default();
        config.api.timeout_secs = 60;
        config.export.directory = Some(PathBuf::from("/tmp/out"));

        let wizard = SetupWizard::from_config(config);
        assert_eq!(wizard.timeout_input, "60");
        assert_eq!(wizard.export_dir_input, "/tmp/out");
    }

    #[test]
    fn test_command_line_server_prefills_wizard() {
        let wizard = SetupWizard::with_server(Some("http://10.0.0.5:8080/api".to_string()));
        assert_eq!(wizard.config.api.base_url, "http://10.0.0.5:8080/api");

        let wizard = SetupWizard::with_server(None);
        assert_eq!(wizard.config.api.base_url, AppConfig::default().api.base_url);
    }
}
