//! Configuration management for fleetdesk
//!
//! Settings come from three places, later sources winning:
//! 1. defaults,
//! 2. the config file at `<config dir>/fleetdesk/config.json`,
//! 3. environment variables (a `.env` file is honored via dotenvy).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use fleetdesk_db::{DbAuth, DbConfig};
use fleetdesk_types::{ConfigError, Result};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings
    pub db: DbConfig,

    /// Override for the token-acquisition command (token auth only)
    #[serde(default)]
    pub token_command: Option<String>,

    /// Override for the user roster location
    #[serde(default)]
    pub users_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db: DbConfig {
                server: "localhost".to_string(),
                port: 5432,
                database: "fleetdesk".to_string(),
                username: "fleetdesk".to_string(),
                password: None,
                auth: DbAuth::Password,
                require_ssl: false,
            },
            token_command: None,
            users_file: None,
        }
    }
}

impl AppConfig {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("fleetdesk");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from the default location and apply env overrides
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = Self::config_path()?;
        let config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        Ok(config.with_env_overrides())
    }

    /// Load config from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        Ok(config)
    }

    /// Apply `DB_*` / `FLEETDESK_*` environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        if let Some(server) = var("DB_SERVER") {
            self.db.server = server;
        }
        if let Some(port) = var("DB_PORT").and_then(|v| v.parse().ok()) {
            self.db.port = port;
        }
        if let Some(database) = var("DB_DATABASE") {
            self.db.database = database;
        }
        if let Some(username) = var("DB_USERNAME") {
            self.db.username = username;
        }
        if let Some(password) = var("DB_PASSWORD") {
            self.db.password = Some(password);
        }
        if let Some(auth) = var("DB_AUTH").and_then(|v| v.parse::<DbAuth>().ok()) {
            self.db.auth = auth;
        }
        if let Some(ssl) = var("DB_REQUIRE_SSL") {
            self.db.require_ssl = matches!(ssl.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(command) = var("FLEETDESK_TOKEN_CMD") {
            self.token_command = Some(command);
        }
        self
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// The user roster path (configured or default)
    pub fn users_path(&self) -> Result<PathBuf> {
        match &self.users_file {
            Some(path) => Ok(path.clone()),
            None => fleetdesk_db::UserStore::default_path(),
        }
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Fleetdesk Configuration")?;
        writeln!(f, "=======================")?;
        writeln!(f)?;
        writeln!(f, "Server:    {}:{}", self.db.server, self.db.port)?;
        writeln!(f, "Database:  {}", self.db.database)?;
        writeln!(f, "Username:  {}", self.db.username)?;
        writeln!(
            f,
            "Auth:      {}",
            match self.db.auth {
                DbAuth::Password => "password",
                DbAuth::Token => "token",
            }
        )?;
        writeln!(f, "TLS:       {}", self.db.require_ssl)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file: {}", path.display())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env vars are process-global; serialize the tests that touch them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for name in [
            "DB_SERVER",
            "DB_PORT",
            "DB_DATABASE",
            "DB_USERNAME",
            "DB_PASSWORD",
            "DB_AUTH",
            "DB_REQUIRE_SSL",
            "FLEETDESK_TOKEN_CMD",
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn env_overrides_win() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("DB_SERVER", "db.example.net");
        std::env::set_var("DB_PORT", "5433");
        std::env::set_var("DB_DATABASE", "deliveries");
        std::env::set_var("DB_AUTH", "token");
        std::env::set_var("DB_REQUIRE_SSL", "true");
        std::env::set_var("FLEETDESK_TOKEN_CMD", "az account get-access-token");

        let config = AppConfig::default().with_env_overrides();
        clear_env();

        assert_eq!(config.db.server, "db.example.net");
        assert_eq!(config.db.port, 5433);
        assert_eq!(config.db.database, "deliveries");
        assert_eq!(config.db.auth, DbAuth::Token);
        assert!(config.db.require_ssl);
        assert_eq!(
            config.token_command.as_deref(),
            Some("az account get-access-token")
        );
    }

    #[test]
    fn defaults_survive_empty_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        let config = AppConfig::default().with_env_overrides();
        assert_eq!(config.db.server, "localhost");
        assert_eq!(config.db.port, 5432);
        assert_eq!(config.db.auth, DbAuth::Password);
    }

    #[test]
    fn config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.db.server = "prod.example.net".to_string();
        config.db.auth = DbAuth::Token;
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = AppConfig::from_file(&path).unwrap();
        assert_eq!(loaded.db.server, "prod.example.net");
        assert_eq!(loaded.db.auth, DbAuth::Token);
    }

    #[test]
    fn malformed_config_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::from_file(&path).is_err());
    }
}
