//! Thin typed wrappers around the platform's REST endpoints
//!
//! Every user-facing module of the platform besides the two data-flow cores
//! (bulk upload, streaming chat) boils down to a typed request/response pair
//! over HTTP. [`ApiClient`] carries the shared plumbing: base URL, bearer
//! auth, status triage into [`VeridocError::Request`], and JSON decoding.
//! The per-module operations live in the submodules.

pub mod auth;
pub mod documents;
pub mod predict;
pub mod verify;

pub use auth::{LoginRequest, TokenResponse, UserProfile};
pub use documents::{Document, DocumentStatus};
pub use predict::{ChartKind, ForecastPoint, ForecastSeries};
pub use verify::{Finding, VerificationReport, VerificationSubmission, Verdict};

use crate::config::Config;
use crate::credentials::CredentialProvider;
use crate::error::{Result, VeridocError};

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Shared HTTP client for the thin API wrappers.
pub struct ApiClient {
    client: Client,
    api_base: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl ApiClient {
    /// Create a new API client from configuration and a credential provider.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_seconds))
            .user_agent("veridoc/0.3.0")
            .build()
            .map_err(|e| VeridocError::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Authorized GET returning decoded JSON.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let token = self.credentials.access_token().await?;
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .map_err(VeridocError::Http)?;
        Self::decode(response).await
    }

    /// Authorized POST with a JSON body, returning decoded JSON.
    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let token = self.credentials.access_token().await?;
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(VeridocError::Http)?;
        Self::decode(response).await
    }

    /// Unauthorized POST with a JSON body (login only).
    pub(crate) async fn post_json_public<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(VeridocError::Http)?;
        Self::decode(response).await
    }

    /// Authorized DELETE with no response body.
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let token = self.credentials.access_token().await?;
        let response = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .map_err(VeridocError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VeridocError::Request {
                status: status.as_u16(),
                body,
            }
            .into());
        }
        Ok(())
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "API request rejected");
            return Err(VeridocError::Request {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        response
            .json()
            .await
            .map_err(|e| VeridocError::Api(format!("Failed to parse response: {}", e)).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticCredentials;

    #[test]
    fn test_api_client_creation() {
        let config = Config::default();
        let client = ApiClient::new(&config, Arc::new(StaticCredentials::new("token")));
        assert!(client.is_ok());
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let mut config = Config::default();
        config.api.base_url = "http://localhost:9000/".to_string();
        let client =
            ApiClient::new(&config, Arc::new(StaticCredentials::new("token"))).unwrap();
        assert_eq!(client.url("/documents"), "http://localhost:9000/documents");
    }

    #[tokio::test]
    async fn test_missing_credentials_fails_before_network() {
        let config = Config::default();
        let client = ApiClient::new(&config, Arc::new(StaticCredentials::new(""))).unwrap();
        let err = client.get_json::<serde_json::Value>("/documents").await;
        assert!(err
            .unwrap_err()
            .to_string()
            .contains("No access token found"));
    }
}
