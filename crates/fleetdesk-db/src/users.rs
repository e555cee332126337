//! TOML-backed user roster
//!
//! Users live in `users.toml` under the config directory. When the file is
//! missing a single admin account is seeded so a fresh install can log in.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use fleetdesk_domain::model::User;
use fleetdesk_types::{AuthError, ConfigError, Result, Role};

/// One roster entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl UserRecord {
    fn to_user(&self) -> User {
        User {
            username: self.username.clone(),
            full_name: self
                .full_name
                .clone()
                .unwrap_or_else(|| self.username.clone()),
            role: self.role,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Roster {
    #[serde(default)]
    users: Vec<UserRecord>,
}

/// File-backed user store
pub struct UserStore {
    path: PathBuf,
    roster: Roster,
}

impl UserStore {
    /// Default roster location: `<config dir>/fleetdesk/users.toml`
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("fleetdesk");
        Ok(dir.join("users.toml"))
    }

    /// Load the roster, seeding a default admin when the file is absent
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let roster = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content)
                .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?
        } else {
            Roster {
                users: vec![UserRecord {
                    username: "admin".to_string(),
                    password: "password123".to_string(),
                    full_name: Some("Administrator".to_string()),
                    role: Role::Admin,
                }],
            }
        };

        Ok(Self { path, roster })
    }

    /// Write the roster back to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&self.roster)
            .map_err(|e| ConfigError::SaveError(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    /// Check a username/password pair against the roster
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        self.roster
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .map(UserRecord::to_user)
            .ok_or_else(|| AuthError::InvalidCredentials.into())
    }

    /// All users, without credentials
    pub fn users(&self) -> Vec<User> {
        self.roster.users.iter().map(UserRecord::to_user).collect()
    }

    /// Add or replace a roster entry
    pub fn upsert(&mut self, record: UserRecord) {
        match self
            .roster
            .users
            .iter_mut()
            .find(|u| u.username == record.username)
        {
            Some(existing) => *existing = record,
            None => self.roster.users.push(record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_seeds_admin() {
        let dir = tempdir().unwrap();
        let store = UserStore::load(dir.path().join("users.toml")).unwrap();

        let user = store.authenticate("admin", "password123").unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.full_name, "Administrator");
    }

    #[test]
    fn bad_credentials_are_rejected() {
        let dir = tempdir().unwrap();
        let store = UserStore::load(dir.path().join("users.toml")).unwrap();

        assert!(store.authenticate("admin", "wrong").is_err());
        assert!(store.authenticate("nobody", "password123").is_err());
    }

    #[test]
    fn roster_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.toml");

        let mut store = UserStore::load(&path).unwrap();
        store.upsert(UserRecord {
            username: "dana".to_string(),
            password: "hunter2".to_string(),
            full_name: Some("Dana Driver".to_string()),
            role: Role::Driver,
        });
        store.save().unwrap();

        let reloaded = UserStore::load(&path).unwrap();
        let user = reloaded.authenticate("dana", "hunter2").unwrap();
        assert_eq!(user.role, Role::Driver);
        assert_eq!(user.full_name, "Dana Driver");
        assert_eq!(reloaded.users().len(), 2);
    }

    #[test]
    fn malformed_roster_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.toml");
        std::fs::write(&path, "users = \"oops\"").unwrap();

        assert!(UserStore::load(&path).is_err());
    }
}
