//! Access-token acquisition for token-authenticated database connections
//!
//! The application owns no token logic beyond asking a chain of external
//! identity sources, in order, for a bearer token and passing the first one
//! obtained through as the database credential. Refresh belongs to the
//! identity provider; a fresh token is requested per connection attempt.

use std::process::Command;

use fleetdesk_types::{AuthError, Error, Result};
use serde::Deserialize;

/// OAuth resource for Azure managed Postgres
pub const DEFAULT_TOKEN_RESOURCE: &str = "https://ossrdbms-aad.database.windows.net/.default";

/// Environment variable checked by [`EnvTokenProvider`]
pub const TOKEN_ENV_VAR: &str = "FLEETDESK_TOKEN";

/// A bearer token obtained from an identity source
#[derive(Clone, Debug)]
pub struct AccessToken {
    pub secret: String,
    /// Expiry as reported by the provider, unparsed
    pub expires_on: Option<String>,
}

/// A single identity source that may yield a token
pub trait TokenProvider {
    /// Short name used in log messages
    fn name(&self) -> &str;

    /// Try to obtain a token from this source
    fn acquire_token(&self) -> Result<AccessToken>;
}

/// Reads a token directly from the environment.
///
/// Covers IDE/session setups that export a pre-acquired token.
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new() -> Self {
        Self {
            var: TOKEN_ENV_VAR.to_string(),
        }
    }

    pub fn with_var(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvTokenProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenProvider for EnvTokenProvider {
    fn name(&self) -> &str {
        "environment"
    }

    fn acquire_token(&self) -> Result<AccessToken> {
        match std::env::var(&self.var) {
            Ok(secret) if !secret.trim().is_empty() => Ok(AccessToken {
                secret: secret.trim().to_string(),
                expires_on: None,
            }),
            _ => Err(AuthError::Provider {
                provider: self.name().to_string(),
                message: format!("{} is not set", self.var),
            }
            .into()),
        }
    }
}

/// JSON shape of `az account get-access-token` output
#[derive(Debug, Deserialize)]
struct CliTokenResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
    #[serde(rename = "expiresOn")]
    expires_on: Option<String>,
}

/// Obtains a token from the local Azure CLI session.
///
/// Side effect: with a cold credential cache the CLI may start its own
/// interactive login flow.
pub struct AzureCliTokenProvider {
    command: Vec<String>,
}

impl AzureCliTokenProvider {
    pub fn new() -> Self {
        Self {
            command: vec![
                "az".to_string(),
                "account".to_string(),
                "get-access-token".to_string(),
                "--resource".to_string(),
                DEFAULT_TOKEN_RESOURCE.to_string(),
                "--output".to_string(),
                "json".to_string(),
            ],
        }
    }

    /// Build from a configured command line, e.g.
    /// `az account get-access-token --resource ... --output json`
    pub fn from_command_line(line: &str) -> Result<Self> {
        let command = shell_words::split(line).map_err(|e| AuthError::Provider {
            provider: "azure-cli".to_string(),
            message: format!("invalid token command: {e}"),
        })?;
        if command.is_empty() {
            return Err(AuthError::Provider {
                provider: "azure-cli".to_string(),
                message: "empty token command".to_string(),
            }
            .into());
        }
        Ok(Self { command })
    }
}

impl Default for AzureCliTokenProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenProvider for AzureCliTokenProvider {
    fn name(&self) -> &str {
        "azure-cli"
    }

    fn acquire_token(&self) -> Result<AccessToken> {
        let provider_err = |message: String| -> Error {
            AuthError::Provider {
                provider: "azure-cli".to_string(),
                message,
            }
            .into()
        };

        let output = Command::new(&self.command[0])
            .args(&self.command[1..])
            .output()
            .map_err(|e| provider_err(format!("failed to run {}: {e}", self.command[0])))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(provider_err(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let response: CliTokenResponse = serde_json::from_slice(&output.stdout)
            .map_err(|e| provider_err(format!("unexpected CLI output: {e}")))?;

        Ok(AccessToken {
            secret: response.access_token,
            expires_on: response.expires_on,
        })
    }
}

/// An ordered set of token providers, tried until one succeeds
pub struct TokenChain {
    providers: Vec<Box<dyn TokenProvider + Send + Sync>>,
}

impl TokenChain {
    pub fn new(providers: Vec<Box<dyn TokenProvider + Send + Sync>>) -> Self {
        Self { providers }
    }

    /// The standard chain: environment token, then the Azure CLI session.
    /// `token_command` overrides the CLI invocation when set.
    pub fn standard(token_command: Option<&str>) -> Result<Self> {
        let cli = match token_command {
            Some(line) => AzureCliTokenProvider::from_command_line(line)?,
            None => AzureCliTokenProvider::new(),
        };
        Ok(Self::new(vec![
            Box::new(EnvTokenProvider::new()),
            Box::new(cli),
        ]))
    }

    /// Ask each provider in order; the first token wins.
    ///
    /// Fails with [`AuthError::NoTokenAvailable`] once every source has been
    /// exhausted - never with a partial credential.
    pub fn acquire(&self) -> Result<AccessToken> {
        for provider in &self.providers {
            match provider.acquire_token() {
                Ok(token) => {
                    tracing::info!(provider = provider.name(), "acquired access token");
                    return Ok(token);
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "token provider failed");
                }
            }
        }
        Err(AuthError::NoTokenAvailable.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeProvider {
        name: &'static str,
        token: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    impl TokenProvider for FakeProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn acquire_token(&self) -> Result<AccessToken> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.token {
                Some(secret) => Ok(AccessToken {
                    secret: secret.to_string(),
                    expires_on: None,
                }),
                None => Err(AuthError::Provider {
                    provider: self.name.to_string(),
                    message: "unavailable".to_string(),
                }
                .into()),
            }
        }
    }

    #[test]
    fn empty_chain_yields_no_token() {
        let chain = TokenChain::new(Vec::new());
        assert!(matches!(
            chain.acquire(),
            Err(Error::Auth(AuthError::NoTokenAvailable))
        ));
    }

    #[test]
    fn all_failing_providers_yield_no_token() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = TokenChain::new(vec![
            Box::new(FakeProvider {
                name: "a",
                token: None,
                calls: calls.clone(),
            }),
            Box::new(FakeProvider {
                name: "b",
                token: None,
                calls: calls.clone(),
            }),
        ]);
        assert!(matches!(
            chain.acquire(),
            Err(Error::Auth(AuthError::NoTokenAvailable))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn first_success_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let later_calls = Arc::new(AtomicUsize::new(0));
        let chain = TokenChain::new(vec![
            Box::new(FakeProvider {
                name: "a",
                token: None,
                calls: calls.clone(),
            }),
            Box::new(FakeProvider {
                name: "b",
                token: Some("tok-b"),
                calls: calls.clone(),
            }),
            Box::new(FakeProvider {
                name: "c",
                token: Some("tok-c"),
                calls: later_calls.clone(),
            }),
        ]);

        let token = chain.acquire().unwrap();
        assert_eq!(token.secret, "tok-b");
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn env_provider_reads_its_variable() {
        let var = "FLEETDESK_TOKEN_TEST_ENV_PROVIDER";
        std::env::set_var(var, "sekrit");
        let provider = EnvTokenProvider::with_var(var);
        assert_eq!(provider.acquire_token().unwrap().secret, "sekrit");

        std::env::remove_var(var);
        assert!(provider.acquire_token().is_err());
    }

    #[test]
    fn cli_provider_rejects_empty_command() {
        assert!(AzureCliTokenProvider::from_command_line("").is_err());
    }
}
