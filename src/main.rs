//! Treasury Desk - financial transparency dashboard for student organization treasuries.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use treasury_desk as app;

use app::api::ApiClient;
use app::config::{AppConfig, ConfigLoadResult};
use app::session::{FileSessionStore, SessionManager};
use app::ui::{App, SetupApp, SetupWizard};

/// Financial transparency dashboard for student organization treasuries.
#[derive(Parser)]
#[command(name = "treasury-desk")]
struct Cli {
    /// Use config.toml and data from the current directory (dev mode)
    #[arg(long)]
    dev: bool,

    /// Server URL, overriding the configured one for this run
    #[arg(long, value_name = "URL")]
    server: Option<String>,
}

/// Application launch mode.
enum LaunchMode {
    /// Normal operation with valid config.
    Normal(AppConfig),
    /// Setup wizard for first run or invalid config.
    Setup(SetupWizard, Option<String>),
}

/// Log to stdout and to a daily file under `log_dir`. The guard flushes the file on drop.
fn init_logging(log_dir: &Path) -> Option<WorkerGuard> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("treasury-desk")
        .filename_suffix("log")
        .build(log_dir);

    match appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter())
                .with(fmt::layer())
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::registry().with(filter()).with(fmt::layer()).init();
            tracing::warn!("File logging disabled: {}", e);
            None
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config_path, data_dir) = if cli.dev {
        (PathBuf::from("config.toml"), PathBuf::from(".treasury-desk"))
    } else {
        (AppConfig::default_path(), AppConfig::data_dir())
    };

    let _log_guard = init_logging(&data_dir.join("logs"));

    tracing::info!("Treasury Desk starting...");
    if cli.dev {
        tracing::info!("Dev mode: loading config from current directory");
    }
    tracing::info!("Config path: {:?}", config_path);

    let launch_mode = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(mut config) => {
            tracing::info!("Config loaded successfully");
            if let Some(url) = cli.server {
                tracing::info!("Using server {} from the command line", url);
                config.api.base_url = url;
            }
            LaunchMode::Normal(config)
        }
        ConfigLoadResult::Missing => {
            tracing::info!("Config missing, starting setup wizard");
            LaunchMode::Setup(SetupWizard::with_server(cli.server), None)
        }
        ConfigLoadResult::Invalid(e) => {
            tracing::warn!("Config invalid: {}", e);
            LaunchMode::Setup(SetupWizard::with_server(cli.server), Some(e.to_string()))
        }
    };

    // Create tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    match launch_mode {
        LaunchMode::Normal(config) => run_main_app(config, data_dir, rt),
        LaunchMode::Setup(wizard, error) => run_setup_wizard(wizard, error, config_path, rt),
    }
}

fn install_fonts(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();
    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
    ctx.set_fonts(fonts);
}

/// Run the setup wizard.
fn run_setup_wizard(
    wizard: SetupWizard,
    initial_error: Option<String>,
    config_path: PathBuf,
    rt: tokio::runtime::Runtime,
) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Treasury Desk - Setup")
            .with_inner_size([600.0, 520.0])
            .with_min_inner_size([500.0, 400.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "Treasury Desk - Setup",
        options,
        Box::new(|cc| {
            install_fonts(&cc.egui_ctx);
            Ok(Box::new(SetupApp::new(wizard, initial_error, config_path, rt)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Setup window failed: {e}"))
}

/// Run the main application.
fn run_main_app(config: AppConfig, data_dir: PathBuf, rt: tokio::runtime::Runtime) -> anyhow::Result<()> {
    let api = ApiClient::new(&config.api).context("Failed to create HTTP client")?;
    let session = SessionManager::new(FileSessionStore::new(data_dir));
    tracing::info!("Server: {}", api.base_url());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Treasury Desk")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Treasury Desk",
        options,
        Box::new(|cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            install_fonts(&cc.egui_ctx);
            Ok(Box::new(App::new(config, api, session, rt)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Main window failed: {e}"))
}
