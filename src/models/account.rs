//! Account, role and login DTOs.

use serde::{Deserialize, Serialize};

/// Role attached to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    OrgTreasurer,
    ClassTreasurer,
    #[serde(other)]
    Student,
}

impl Role {
    /// Get the display name for the role.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::OrgTreasurer => "Org Treasurer",
            Role::ClassTreasurer => "Class Treasurer",
            Role::Student => "Student",
        }
    }
}

/// Profile of the logged-in user, persisted alongside the token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
    #[serde(default)]
    pub program_id: Option<i64>,
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(default)]
    pub year_level: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
}

impl UserProfile {
    /// Name shown in the header bar.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Treasurer/admin account as listed by `/accounts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
    #[serde(default)]
    pub program_id: Option<i64>,
    #[serde(default)]
    pub year_level: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub active: bool,
}

impl Account {
    /// Label used in "remitted by" filter options.
    pub fn option_label(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_wire_names() {
        let role: Role = serde_json::from_value(json!("ORG_TREASURER")).unwrap();
        assert_eq!(role, Role::OrgTreasurer);
        assert_eq!(serde_json::to_value(Role::ClassTreasurer).unwrap(), json!("CLASS_TREASURER"));
    }

    #[test]
    fn test_unknown_role_is_student() {
        let role: Role = serde_json::from_value(json!("AUDITOR")).unwrap();
        assert_eq!(role, Role::Student);
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let user: UserProfile = serde_json::from_value(json!({
            "id": 7,
            "username": "treasurer1",
            "role": "ADMIN"
        }))
        .unwrap();
        assert_eq!(user.display_name(), "treasurer1");
    }
}
