//! Credential access for Veridoc
//!
//! The backend authorizes every call with a bearer access token. The original
//! client read that token from ambient cookie state; here the lookup is an
//! injected capability so the pipeline and the chat consumer can be tested
//! without a real credential store.

use crate::error::{Result, VeridocError};
use async_trait::async_trait;

/// Keyring service name used for stored sessions
pub const KEYRING_SERVICE: &str = "veridoc";

/// Keyring entry name for the access token
pub const KEYRING_TOKEN_ENTRY: &str = "access_token";

/// Provides the bearer token attached to authorized backend calls.
///
/// Absence of a token is a hard failure surfaced before any network call
/// is attempted.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Return the current access token.
    ///
    /// # Errors
    ///
    /// Returns `VeridocError::Credentials` with the message
    /// "No access token found" when no token is available.
    async fn access_token(&self) -> Result<String>;
}

/// Fixed-token credentials, used by tests and scripted invocations.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    token: String,
}

impl StaticCredentials {
    /// Create a provider that always returns the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn access_token(&self) -> Result<String> {
        if self.token.is_empty() {
            return Err(VeridocError::Credentials("No access token found".to_string()).into());
        }
        Ok(self.token.clone())
    }
}

/// OS-keyring-backed credentials.
///
/// `veridoc auth login` stores the session token under the `veridoc`
/// service; subsequent commands read it back from here.
#[derive(Debug, Clone)]
pub struct KeyringCredentials {
    service: String,
    entry: String,
}

impl KeyringCredentials {
    /// Create a provider reading from the default Veridoc keyring entry.
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
            entry: KEYRING_TOKEN_ENTRY.to_string(),
        }
    }

    /// Create a provider reading from a custom service/entry pair.
    pub fn with_entry(service: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            entry: entry.into(),
        }
    }

    /// Store a token, overwriting any existing one.
    pub fn store_token(&self, token: &str) -> Result<()> {
        let entry =
            keyring::Entry::new(&self.service, &self.entry).map_err(VeridocError::Keyring)?;
        entry.set_password(token).map_err(VeridocError::Keyring)?;
        tracing::info!("Stored access token in keyring");
        Ok(())
    }

    /// Remove the stored token, if any.
    pub fn clear_token(&self) -> Result<()> {
        let entry =
            keyring::Entry::new(&self.service, &self.entry).map_err(VeridocError::Keyring)?;
        match entry.delete_password() {
            Ok(()) => {
                tracing::info!("Cleared access token from keyring");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(VeridocError::Keyring(e).into()),
        }
    }
}

impl Default for KeyringCredentials {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialProvider for KeyringCredentials {
    async fn access_token(&self) -> Result<String> {
        let entry =
            keyring::Entry::new(&self.service, &self.entry).map_err(VeridocError::Keyring)?;
        match entry.get_password() {
            Ok(token) if !token.is_empty() => Ok(token),
            Ok(_) | Err(keyring::Error::NoEntry) => {
                Err(VeridocError::Credentials("No access token found".to_string()).into())
            }
            Err(e) => Err(VeridocError::Keyring(e).into()),
        }
    }
}
