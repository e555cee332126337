//! Application users

use fleetdesk_types::Role;
use serde::{Deserialize, Serialize};

/// An authenticated application user
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub full_name: String,
    pub role: Role,
}
