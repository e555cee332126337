//! Database connection handling
//!
//! The pool lives for the application lifetime; individual connections are
//! acquired per call and released when the call ends. The whole stack is
//! synchronous (GUI and CLI both block on each fetch), so the handle owns a
//! tokio runtime and exposes `block_on`.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;

use fleetdesk_types::{ConfigError, Result};

use crate::token::TokenChain;

/// How the database credential is obtained
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbAuth {
    /// `DB_USERNAME` / `DB_PASSWORD`
    #[default]
    Password,
    /// Access token from the provider chain, passed as the password
    Token,
}

impl std::str::FromStr for DbAuth {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "password" => Ok(DbAuth::Password),
            "token" => Ok(DbAuth::Token),
            other => Err(ConfigError::ParseError(format!(
                "DB_AUTH must be 'password' or 'token', got '{other}'"
            ))),
        }
    }
}

/// Connection settings for the managed database
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DbConfig {
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: String,
    pub username: String,
    /// Only used with [`DbAuth::Password`]
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub auth: DbAuth,
    /// Managed servers generally require TLS
    #[serde(default = "default_true")]
    pub require_ssl: bool,
}

fn default_port() -> u16 {
    5432
}

fn default_true() -> bool {
    true
}

impl DbConfig {
    /// Resolve the credential and build connect options.
    ///
    /// With token auth, asks the chain now; a failed chain surfaces as an
    /// authentication error before any connection is attempted.
    pub fn connect_options(&self, tokens: &TokenChain) -> Result<PgConnectOptions> {
        let password = match self.auth {
            DbAuth::Password => self
                .password
                .clone()
                .ok_or_else(|| ConfigError::Missing("DB_PASSWORD".to_string()))?,
            DbAuth::Token => tokens.acquire()?.secret,
        };

        let mut options = PgConnectOptions::new()
            .host(&self.server)
            .port(self.port)
            .database(&self.database)
            .username(&self.username)
            .password(&password);
        if self.require_ssl {
            options = options.ssl_mode(PgSslMode::Require);
        }
        Ok(options)
    }
}

/// The live database handle: pool plus the runtime that drives it
pub struct Db {
    runtime: tokio::runtime::Runtime,
    pool: PgPool,
}

impl Db {
    /// Connect and verify the credential.
    ///
    /// The pool establishes (and pings) a first connection here, so bad
    /// credentials or an unreachable server fail immediately instead of
    /// surfacing as empty query results later.
    pub fn connect(config: &DbConfig, tokens: &TokenChain) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        let options = config.connect_options(tokens)?;
        tracing::info!(server = %config.server, database = %config.database, "connecting");

        let pool = runtime.block_on(
            PgPoolOptions::new()
                .max_connections(4)
                .acquire_timeout(Duration::from_secs(30))
                .connect_with(options),
        )?;

        Ok(Self { runtime, pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Drive a future to completion on the handle's runtime
    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Cheap liveness probe
    pub fn ping(&self) -> Result<()> {
        self.block_on(sqlx::query("SELECT 1").execute(&self.pool))?;
        Ok(())
    }

    /// Close the pool. Operations issued afterwards fail with a database
    /// error rather than hanging.
    pub fn close(&self) {
        self.block_on(self.pool.close());
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}
