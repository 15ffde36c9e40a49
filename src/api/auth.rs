//! Authentication endpoints
//!
//! Token issuance itself lives server-side; this wrapper exchanges
//! credentials for a bearer token and reads back the current session.

use crate::api::ApiClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Request body for `POST /auth/login`
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from `POST /auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Response from `GET /auth/me`
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl ApiClient {
    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `VeridocError::Request` with the backend status and body when
    /// the credentials are rejected.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse> {
        tracing::info!(email, "Logging in");
        self.post_json_public("/auth/login", &LoginRequest { email, password })
            .await
    }

    /// Fetch the profile behind the current token.
    pub async fn me(&self) -> Result<UserProfile> {
        self.get_json("/auth/me").await
    }

    /// Invalidate the current session server-side.
    pub async fn logout(&self) -> Result<()> {
        self.delete("/auth/session").await
    }
}
