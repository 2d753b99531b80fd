//! Program and department DTOs.

use serde::{Deserialize, Serialize};

/// Academic department.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// Degree program within a department.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub department_id: Option<i64>,
}

impl Program {
    /// Label used in filter options: code when present, else name.
    pub fn option_label(&self) -> &str {
        self.code.as_deref().unwrap_or(&self.name)
    }
}
