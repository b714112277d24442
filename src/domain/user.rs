use serde::{Deserialize, Serialize};
use std::fmt;

pub type UserId = u64;

/// Campus role attached to every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Faculty,
    Vendor,
    Admin,
}

impl Role {
    /// Roles allowed to book inside the faculty-priority window.
    pub fn has_faculty_priority(self) -> bool {
        matches!(self, Role::Faculty | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::Vendor => "vendor",
            Role::Admin => "admin",
        };
        f.write_str(name)
    }
}

/// Represents a registered account. The phone number doubles as the
/// notification address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub phone: String,
    pub role: Role,
    /// Vendors publish slots only once approved.
    pub approved: bool,
}

/// Payload for creating a new user.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub name: String,
    pub phone: String,
    pub role: Role,
    pub approved: bool,
}

/// Payload for updating an existing user.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub approved: Option<bool>,
}

impl UserCreate {
    pub fn new(name: impl Into<String>, phone: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            role,
            approved: false,
        }
    }

    pub fn approved(mut self) -> Self {
        self.approved = true;
        self
    }
}
