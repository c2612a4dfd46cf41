//! API identity models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub email: String,
    /// Confirmation timestamp; `None` until the email is confirmed.
    #[serde(default)]
    pub email_confirmed: Option<DateTime<Utc>>,
    pub role_id: i64,
    #[serde(default)]
    pub role: Option<Role>,
}

impl User {
    pub fn is_validated(&self) -> bool {
        self.email_confirmed.is_some()
    }

    pub fn role_name(&self) -> Option<&str> {
        self.role.as_ref().map(|r| r.name.as_str())
    }

    /// `super-admin` passes every role check.
    pub fn has_role(&self, role: &str) -> bool {
        matches!(self.role_name(), Some(name) if name == "super-admin" || name == role)
    }

    /// All requested permissions must be granted; `root_access` grants
    /// everything.
    pub fn has_permission(&self, perms: &[&str]) -> bool {
        let granted: Vec<&str> = self
            .role
            .as_ref()
            .map(|r| r.permissions.iter().map(|p| p.name.as_str()).collect())
            .unwrap_or_default();

        if granted.contains(&"root_access") {
            return true;
        }
        perms.iter().all(|p| granted.contains(p))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Credentials payload shared by login, signup and password reset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_confirmation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remember_me: Option<bool>,
    /// Reset token, for the reset-password flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl AuthForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Default::default()
        }
    }
}
