pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod pages;
pub mod report;
pub mod session;
pub mod table;
pub mod ui;

pub use error::{AppError, Result};
