//! User roles and access levels

use serde::{Deserialize, Serialize};

/// Role assigned to an application user.
///
/// Roles gate which views and actions the GUI exposes; enforcement lives in
/// the application layer, not the database.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Driver,
    Manager,
    Admin,
}

impl Role {
    /// Managers and admins may create and optimize routes
    pub fn can_manage_routes(&self) -> bool {
        matches!(self, Role::Manager | Role::Admin)
    }

    /// Only admins (and managers) may edit or delete delivery records
    pub fn can_edit_records(&self) -> bool {
        matches!(self, Role::Manager | Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Driver => write!(f, "driver"),
            Role::Manager => write!(f, "manager"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "driver" => Ok(Role::Driver),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}
