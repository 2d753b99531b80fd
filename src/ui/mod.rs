//! GUI panels and application state.

pub mod app;
pub mod components;
pub mod dashboard;
pub mod data_table;
pub mod entity_panel;
pub mod login_panel;
pub mod report_dialog;
pub mod setup_wizard;

pub use app::App;
pub use setup_wizard::{SetupApp, SetupWizard};
