//! Store / pickup location records

use serde::{Deserialize, Serialize};

/// A store a delivery originates from
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Store {
    pub store_id: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl Store {
    /// Display name, falling back to the id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.store_id)
    }
}
