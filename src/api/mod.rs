//! Backend REST API client and per-entity services.

pub mod client;
pub mod services;

pub use client::{API_PREFIX, ApiClient, QueryParams};
pub use services::{PaymentReminder, Resource};
