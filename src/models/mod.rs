//! Data models for accounts, fees, programs and departments.
//!
//! List and report endpoints are consumed as loose JSON rows ([`Row`]) so the generic
//! table and the report generators can address any property by column key. The typed
//! DTOs cover login and the collections that feed filter choices.

pub mod account;
pub mod fee;
pub mod org;

use serde::{Deserialize, Serialize};

pub use account::{Account, LoginRequest, LoginResponse, Role, UserProfile};
pub use fee::Fee;
pub use org::{Department, Program};

/// A record as received from a list or report endpoint.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Envelope of paginated list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            total_elements: 0,
            total_pages: 0,
        }
    }
}

/// Read a row property as display text, treating null and missing alike.
pub fn row_text(row: &Row, key: &str) -> Option<String> {
    match row.get(key)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Read a row property as a number, accepting numeric strings.
pub fn row_number(row: &Row, key: &str) -> Option<f64> {
    match row.get(key)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
