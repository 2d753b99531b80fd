//! Main application UI.

use std::collections::HashMap;

use chrono::{DateTime, Local};
use eframe::egui::{self, Align, Layout};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, PaymentReminder};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::{Page, Row};
use crate::pages::{self, Entity};
use crate::report::{
    DialogSink, DirectorySink, NoticeLevel, ReportError, ReportNotice, ReportOutcome, ReportSink, generate_report,
};
use crate::session::{FileSessionStore, Session, SessionManager, authenticate};
use crate::table::{FilterKey, FilterOption, FilterOptions};

use super::components::{colors, notice_color};
use super::entity_panel::{self, EntityPage, FetchOutcome};
use super::{dashboard, login_panel};

/// Current panel being displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Dashboard,
    Entity(Entity),
}

impl Panel {
    /// Get the display name for the panel.
    pub fn name(&self) -> &'static str {
        match self {
            Panel::Dashboard => "Dashboard",
            Panel::Entity(entity) => entity.title(),
        }
    }
}

/// Messages from async tasks to UI.
pub enum UiMessage {
    // Auth
    LoggedIn(Session),
    LoginFailed(AppError),

    // Data loading
    PageLoaded {
        entity: Entity,
        ticket: u64,
        result: Result<Page<Row>, AppError>,
    },
    OptionsLoaded(Vec<(FilterKey, Vec<FilterOption>)>),
    OptionsFailed {
        source: &'static str,
        keys: &'static [FilterKey],
        error: AppError,
    },

    // CRUD operations
    RowDeleted { entity: Entity, label: String },
    OperationFailed(AppError),

    // Email
    RemindersSent(usize),
    RemindersFailed(AppError),

    // Export
    ReportFinished {
        entity: Entity,
        result: Result<ReportOutcome, ReportError>,
    },
}

/// Log level for UI messages.
#[derive(Clone, Copy, Debug)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Log entry for display in the UI.
#[derive(Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
    pub level: LogLevel,
}

/// Target for delete confirmation dialog.
#[derive(Clone)]
pub struct DeleteTarget {
    pub entity: Entity,
    pub id: i64,
    pub label: String,
}

/// Login form state.
#[derive(Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub busy: bool,
    pub error: Option<String>,
}

/// Async results, tagged with the session they were requested in.
pub type Envelope = (u64, UiMessage);

/// Main application state.
pub struct App {
    pub rt: tokio::runtime::Runtime,
    pub api: ApiClient,
    pub session: SessionManager<FileSessionStore>,

    // Message channel for async communication
    pub tx: mpsc::UnboundedSender<Envelope>,
    pub rx: mpsc::UnboundedReceiver<Envelope>,
    /// Bumped on logout; results from earlier sessions are dropped.
    session_epoch: u64,

    // Navigation
    pub current_panel: Panel,

    // Per-entity pages and the filter choices loaded from the backend
    pages: HashMap<Entity, EntityPage>,
    pub backend_options: FilterOptions,

    pub login_form: LoginForm,
    pub reminder_busy: bool,

    // Log messages
    pub log_messages: Vec<LogEntry>,

    // Configuration
    pub config: AppConfig,

    // Dialogs
    pub show_delete_confirm: bool,
    pub delete_target: Option<DeleteTarget>,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
    pub report_notice: Option<ReportNotice>,
}

impl App {
    pub fn new(
        config: AppConfig,
        api: ApiClient,
        session: SessionManager<FileSessionStore>,
        rt: tokio::runtime::Runtime,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut app = Self {
            rt,
            api,
            session,
            tx,
            rx,
            session_epoch: 0,
            current_panel: Panel::default(),
            pages: HashMap::new(),
            backend_options: FilterOptions::new(),
            login_form: LoginForm::default(),
            reminder_busy: false,
            log_messages: Vec::new(),
            config,
            show_delete_confirm: false,
            delete_target: None,
            error_message: None,
            success_message: None,
            report_notice: None,
        };

        let restored = app.session.hydrate().map(|s| (s.token.clone(), s.user.display_name()));
        if let Some((token, name)) = restored {
            app.api.set_token(Some(token));
            app.log_info(format!("Welcome back, {name}"));
            app.load_filter_options();
        }

        app
    }

    /// Log a message to the UI log.
    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.log_messages.push(LogEntry {
            timestamp: Local::now(),
            message: message.into(),
            level,
        });

        // Keep only last 100 messages
        if self.log_messages.len() > 100 {
            self.log_messages.remove(0);
        }
    }

    pub fn log_info(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn log_success(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Success, message);
    }

    pub fn log_warning(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    pub fn log_error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    /// Page state of `entity`, created on first access.
    pub fn page_mut(&mut self, entity: Entity) -> &mut EntityPage {
        let rows_per_page = self.config.ui.rows_per_page;
        let backend = &self.backend_options;
        self.pages.entry(entity).or_insert_with(|| {
            let mut page = EntityPage::new(entity, rows_per_page);
            page.rebuild_options(backend);
            page
        })
    }

    pub fn can_delete(&self, entity: Entity) -> bool {
        self.session.role().is_some_and(|role| entity.deletable_by(role))
    }

    /// Navigate to a panel, loading an entity page the first time it is shown.
    pub fn open_panel(&mut self, panel: Panel) {
        self.current_panel = panel;
        if let Panel::Entity(entity) = panel
            && !self.page_mut(entity).loaded
        {
            self.fetch_page(entity);
        }
    }

    /// Submit the login form.
    pub fn login(&mut self) {
        let username = self.login_form.username.clone();
        let password = self.login_form.password.clone();
        let api = self.api.clone();
        let tx = self.tx.clone();
        let epoch = self.session_epoch;

        self.login_form.busy = true;
        self.login_form.error = None;

        self.rt.spawn(async move {
            match authenticate(&api, &username, &password).await {
                Ok(session) => {
                    let _ = tx.send((epoch, UiMessage::LoggedIn(session)));
                }
                Err(e) => {
                    let _ = tx.send((epoch, UiMessage::LoginFailed(e)));
                }
            }
        });
    }

    /// Drop the session and every cached page.
    pub fn logout(&mut self) {
        if let Err(e) = self.session.logout() {
            warn!("Failed to clear stored session: {}", e);
        }
        self.api.set_token(None);
        self.session_epoch += 1;
        self.pages.clear();
        self.backend_options = FilterOptions::new();
        self.current_panel = Panel::Dashboard;
        self.show_delete_confirm = false;
        self.delete_target = None;
        self.reminder_busy = false;
        self.log_info("Logged out");
    }

    /// Load filter choices that come from the backend.
    ///
    /// A failed source still marks its keys as loaded (with no choices) so dialogs
    /// waiting on them can proceed.
    pub fn load_filter_options(&mut self) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        let epoch = self.session_epoch;

        self.rt.spawn(async move {
            let send = |result: Result<Vec<(FilterKey, Vec<FilterOption>)>, AppError>,
                        source: &'static str,
                        keys: &'static [FilterKey]| {
                let message = match result {
                    Ok(options) => UiMessage::OptionsLoaded(options),
                    Err(error) => UiMessage::OptionsFailed { source, keys, error },
                };
                let _ = tx.send((epoch, message));
            };

            send(
                api.fees().all().await.map(|fees| pages::fee_options(&fees)),
                "fees",
                &[FilterKey::FeeType, FilterKey::AcademicYear],
            );
            send(
                api.programs()
                    .all()
                    .await
                    .map(|programs| vec![(FilterKey::Program, pages::program_options(&programs))]),
                "programs",
                &[FilterKey::Program],
            );
            send(
                api.departments()
                    .all()
                    .await
                    .map(|departments| vec![(FilterKey::DepartmentId, pages::department_options(&departments))]),
                "departments",
                &[FilterKey::DepartmentId],
            );
            send(
                api.accounts()
                    .all()
                    .await
                    .map(|accounts| vec![(FilterKey::RemittedBy, pages::account_options(&accounts))]),
                "accounts",
                &[FilterKey::RemittedBy],
            );
        });
    }

    /// Request the current page of `entity` with its table state.
    pub fn fetch_page(&mut self, entity: Entity) {
        let page = self.page_mut(entity);
        let ticket = page.begin_fetch();
        let params = page.table.query_params();
        let api = self.api.clone();
        let tx = self.tx.clone();
        let epoch = self.session_epoch;

        self.rt.spawn(async move {
            let result = api.rows(entity.path()).list(&params).await;
            let _ = tx.send((epoch, UiMessage::PageLoaded { entity, ticket, result }));
        });
    }

    /// Delete a row, then refetch its page once the server confirms.
    pub fn delete_row(&mut self, target: DeleteTarget) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        let epoch = self.session_epoch;

        self.rt.spawn(async move {
            match api.rows(target.entity.path()).delete(target.id).await {
                Ok(()) => {
                    let message = UiMessage::RowDeleted {
                        entity: target.entity,
                        label: target.label,
                    };
                    let _ = tx.send((epoch, message));
                }
                Err(e) => {
                    let _ = tx.send((epoch, UiMessage::OperationFailed(e)));
                }
            }
        });
    }

    /// Email payment reminders through the backend.
    pub fn send_payment_reminder(&mut self, reminder: PaymentReminder) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        let epoch = self.session_epoch;
        let count = reminder.student_ids.len();

        self.reminder_busy = true;
        self.log_info(format!("Sending payment reminders to {count} students"));

        self.rt.spawn(async move {
            match api.send_payment_reminder(&reminder).await {
                Ok(()) => {
                    let _ = tx.send((epoch, UiMessage::RemindersSent(count)));
                }
                Err(e) => {
                    let _ = tx.send((epoch, UiMessage::RemindersFailed(e)));
                }
            }
        });
    }

    fn report_sink(&self) -> Box<dyn ReportSink> {
        let dir = self.config.export.resolved_directory();
        if self.config.export.ask_location {
            Box::new(DialogSink::new(dir))
        } else {
            Box::new(DirectorySink::new(dir))
        }
    }

    /// Validate the report dialog of `entity` and start generating.
    pub fn generate_report(&mut self, entity: Entity) {
        let Some(report_type) = entity.report_type() else {
            return;
        };
        let brand = self.config.ui.brand_name.clone();

        let request = {
            let page = self.page_mut(entity);
            page.report.request(report_type, &page.columns, &brand)
        };
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                self.report_notice = Some(e.notice());
                return;
            }
        };
        self.page_mut(entity).report.busy = true;

        let sink = self.report_sink();
        let api = self.api.clone();
        let tx = self.tx.clone();
        let epoch = self.session_epoch;
        self.log_info(format!("Generating {} ({})", report_type.title(), request.format.label()));

        self.rt.spawn(async move {
            let result = generate_report(&api, request, sink.as_ref()).await;
            let _ = tx.send((epoch, UiMessage::ReportFinished { entity, result }));
        });
    }

    /// Surface a failed call; an expired session logs the user out.
    fn handle_error(&mut self, context: &str, error: AppError) {
        if error.is_unauthorized() {
            self.logout();
            self.error_message = Some(error.user_message());
            return;
        }
        let message = error.user_message();
        self.log_error(format!("{context}: {message}"));
        self.error_message = Some(message);
    }

    /// Poll async results from the channel.
    fn poll_async_results(&mut self) {
        while let Ok((epoch, msg)) = self.rx.try_recv() {
            if epoch != self.session_epoch {
                debug!("Dropping a result requested before the last logout");
                continue;
            }
            match msg {
                UiMessage::LoggedIn(session) => {
                    self.login_form.busy = false;
                    let token = session.token.clone();
                    let name = session.user.display_name();
                    match self.session.establish(session) {
                        Ok(_) => {
                            self.api.set_token(Some(token));
                            self.login_form = LoginForm::default();
                            self.current_panel = Panel::Dashboard;
                            self.log_success(format!("Signed in as {name}"));
                            self.load_filter_options();
                        }
                        Err(e) => {
                            self.login_form.error = Some(e.user_message());
                        }
                    }
                }
                UiMessage::LoginFailed(e) => {
                    self.login_form.busy = false;
                    self.login_form.password.clear();
                    self.login_form.error = Some(match e {
                        AppError::Unauthorized => "Invalid username or password".to_string(),
                        other => other.user_message(),
                    });
                }
                UiMessage::PageLoaded { entity, ticket, result } => match result {
                    Ok(data) => {
                        if self.page_mut(entity).finish_fetch(ticket, data) == FetchOutcome::PageClamped {
                            self.fetch_page(entity);
                        }
                    }
                    Err(e) => {
                        if self.page_mut(entity).fail_fetch(ticket) {
                            self.handle_error(&format!("Loading {}", entity.title()), e);
                        }
                    }
                },
                UiMessage::OptionsLoaded(options) => {
                    for (key, choices) in options {
                        self.backend_options.set(key, choices);
                    }
                    let backend = self.backend_options.clone();
                    for page in self.pages.values_mut() {
                        page.rebuild_options(&backend);
                    }
                }
                UiMessage::OptionsFailed { source, keys, error } => {
                    if error.is_unauthorized() {
                        self.handle_error("Loading filters", error);
                        continue;
                    }
                    warn!("Could not load {} filter options: {}", source, error);
                    self.log_warning(format!("Could not load {source} filter choices"));
                    for key in keys {
                        if !self.backend_options.has(*key) {
                            self.backend_options.set(*key, Vec::new());
                        }
                    }
                    let backend = self.backend_options.clone();
                    for page in self.pages.values_mut() {
                        page.rebuild_options(&backend);
                    }
                }
                UiMessage::RowDeleted { entity, label } => {
                    info!("Deleted {} from {}", label, entity.title());
                    self.log_success(format!("Deleted {label}"));
                    self.success_message = Some(format!("'{label}' was deleted."));
                    self.fetch_page(entity);
                }
                UiMessage::OperationFailed(e) => {
                    self.handle_error("Operation failed", e);
                }
                UiMessage::RemindersSent(count) => {
                    self.reminder_busy = false;
                    self.log_success(format!("Payment reminders sent to {count} students"));
                    self.success_message = Some(format!("Payment reminders were sent to {count} students."));
                }
                UiMessage::RemindersFailed(e) => {
                    self.reminder_busy = false;
                    self.handle_error("Sending reminders", e);
                }
                UiMessage::ReportFinished { entity, result } => {
                    self.page_mut(entity).report.busy = false;
                    match result {
                        Ok(outcome) => {
                            self.page_mut(entity).report.close();
                            self.log_success(format!("Report saved: {}", outcome.filename));
                            self.report_notice = Some(ReportNotice::success(&outcome));
                        }
                        Err(e) if e.is_unauthorized() => {
                            self.logout();
                            self.error_message = Some(AppError::Unauthorized.user_message());
                        }
                        Err(e) => {
                            let notice = e.notice();
                            self.log(log_level(&notice), format!("{}: {}", notice.title, notice.message));
                            self.report_notice = Some(notice);
                        }
                    }
                }
            }
        }
    }

    fn is_busy(&self) -> bool {
        self.login_form.busy || self.reminder_busy || self.pages.values().any(|p| p.loading || p.report.busy)
    }

    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("Go", |ui| {
                    if ui.button("Dashboard").clicked() {
                        self.open_panel(Panel::Dashboard);
                        ui.close();
                    }
                    let role = self.session.role();
                    if let Some(role) = role {
                        ui.separator();
                        for entity in Entity::visible_for(role) {
                            if ui.button(entity.title()).clicked() {
                                self.open_panel(Panel::Entity(entity));
                                ui.close();
                            }
                        }
                    }
                });
                ui.menu_button("Account", |ui| {
                    if ui.button("Log Out").clicked() {
                        self.logout();
                        ui.close();
                    }
                });
            });
        });
    }

    /// Render status bar (display only, no interaction).
    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .min_height(28.0)
            .show(ctx, |ui| {
                ui.disable();
                ui.horizontal(|ui| {
                    match self.session.user() {
                        Some(user) => {
                            ui.colored_label(
                                colors::SUCCESS,
                                format!("{} ({})", user.display_name(), user.role.label()),
                            );
                        }
                        None => {
                            ui.colored_label(colors::NEUTRAL, "Not signed in");
                        }
                    }
                    ui.separator();
                    ui.label(self.current_panel.name());

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.api.base_url());
                        if self.is_busy() {
                            ui.spinner();
                        }
                    });
                });
            });
    }

    fn show_dialogs(&mut self, ctx: &egui::Context) {
        // Error dialog
        if let Some(ref error) = self.error_message.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(colors::ERROR, error);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.error_message = None;
                    }
                });
        }

        // Success dialog
        if let Some(ref msg) = self.success_message.clone() {
            egui::Window::new("Success")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(colors::SUCCESS, msg);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.success_message = None;
                    }
                });
        }

        // Report outcome
        if let Some(notice) = self.report_notice.clone() {
            egui::Window::new(notice.title.as_str())
                .id(egui::Id::new("report_notice"))
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(notice_color(notice.level), &notice.message);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.report_notice = None;
                    }
                });
        }

        // Delete confirmation dialog
        if self.show_delete_confirm
            && let Some(target) = self.delete_target.clone()
        {
            egui::Window::new(format!("Delete from {}", target.entity.title()))
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(format!("Delete '{}'? This cannot be undone.", target.label));
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            self.show_delete_confirm = false;
                            self.delete_target = None;
                        }
                        if ui.button("Delete").clicked() {
                            self.delete_row(target.clone());
                            self.show_delete_confirm = false;
                            self.delete_target = None;
                        }
                    });
                });
        }
    }
}

fn log_level(notice: &ReportNotice) -> LogLevel {
    match notice.level {
        NoticeLevel::Info => LogLevel::Info,
        NoticeLevel::Success => LogLevel::Success,
        NoticeLevel::Warning => LogLevel::Warning,
        NoticeLevel::Error => LogLevel::Error,
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll async results
        self.poll_async_results();

        // Request repaint during async operations
        if self.is_busy() {
            ctx.request_repaint();
        }

        if !self.session.is_authenticated() {
            self.show_dialogs(ctx);
            egui::CentralPanel::default().show(ctx, |ui| login_panel::show(self, ui));
            return;
        }

        self.show_menu_bar(ctx);
        self.show_status_bar(ctx);

        // Modal dialogs (error, success, report notice, delete confirmation)
        self.show_dialogs(ctx);

        egui::CentralPanel::default().show(ctx, |ui| match self.current_panel {
            Panel::Dashboard => {
                if let Some(next) = dashboard::show(self, ui) {
                    self.open_panel(next);
                }
            }
            Panel::Entity(entity) => {
                if entity_panel::show(self, ui, entity) {
                    self.open_panel(Panel::Dashboard);
                }
            }
        });
    }
}
