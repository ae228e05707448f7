//! Authenticated session entities.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use facilityhub_core::types::UserId;

/// Roles whose members see technician-wide notifications in addition to
/// their own.
const TECHNICIAN_ROLES: [&str; 2] = ["Technician_Employee", "Technician_Manager"];

/// A user role as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role name, e.g. `"Admin"`, `"Technician_Employee"`.
    pub name: String,
}

impl Role {
    /// Creates a role from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Whether this role is in the fixed technician set.
    pub fn is_technician(&self) -> bool {
        TECHNICIAN_ROLES.contains(&self.name.as_str())
    }
}

/// The signed-in session. Owned by the application shell; lifetime is the
/// authenticated session, destroyed on logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The signed-in user.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Role of the user.
    pub role: Role,
    /// API paths this user may call.
    #[serde(default)]
    pub permissions: HashSet<String>,
}

impl Session {
    /// Creates a session.
    pub fn new(user_id: UserId, name: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            name: name.into(),
            role,
            permissions: HashSet::new(),
        }
    }
}
