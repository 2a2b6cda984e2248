//! Token manager implementation
//!
//! Obtains, caches and refreshes the bearer credential used by content calls.

use super::types::{Credential, OAuthConfig, TokenResponse};
use crate::error::{Error, Result};
use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Caches one client-credentials token and refreshes it on demand.
///
/// The cache lives behind an async mutex that stays locked for the whole
/// exchange, so concurrent callers never trigger more than one refresh.
pub struct TokenManager {
    config: OAuthConfig,
    cached: Mutex<Option<Credential>>,
    http_client: Client,
}

impl TokenManager {
    /// Create a token manager with its own HTTP client
    pub fn new(config: OAuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create a token manager sharing an existing HTTP client
    pub fn with_client(config: OAuthConfig, http_client: Client) -> Self {
        Self {
            config,
            cached: Mutex::new(None),
            http_client,
        }
    }

    /// Return the cached credential, exchanging for a new one when forced
    /// or when the cached one is missing or expired.
    pub async fn obtain(&self, force: bool) -> Result<Credential> {
        let mut cached = self.cached.lock().await;

        if !force {
            if let Some(cred) = cached.as_ref().filter(|c| !c.is_expired()) {
                return Ok(cred.clone());
            }
        }

        let fresh = self.exchange().await?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }

    /// Refresh after the remote rejected `rejected_token`.
    ///
    /// If another caller already replaced that token, the newer cached
    /// credential is returned without a second exchange.
    pub async fn refresh_rejected(&self, rejected_token: &str) -> Result<Credential> {
        let mut cached = self.cached.lock().await;

        if let Some(cred) = cached.as_ref() {
            if cred.token != rejected_token && !cred.is_expired() {
                debug!("oauth: token already refreshed by another caller");
                return Ok(cred.clone());
            }
        }

        let fresh = self.exchange().await?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }

    /// Client ID sent alongside every content call
    pub fn client_id(&self) -> &str {
        &self.config.client_id
    }

    /// Perform the client-credentials exchange
    async fn exchange(&self) -> Result<Credential> {
        let form = [
            ("grant_type", "client_credentials"),
            ("scope", self.config.scope.as_str()),
        ];

        let issued_at = Utc::now();
        let response = self
            .http_client
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&form)
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TokenExchange { status, body });
        }

        let body = response.bytes().await.map_err(Error::Http)?;
        let token_response: TokenResponse = serde_json::from_slice(&body)
            .map_err(|e| Error::auth(format!("malformed token response: {e}")))?;
        if token_response.access_token.is_empty() {
            return Err(Error::auth("token endpoint returned an empty access_token"));
        }
        let credential = token_response.into_credential(issued_at);
        info!(
            expires_at = %credential.expires_at,
            "oauth: token refreshed"
        );
        Ok(credential)
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("token_url", &self.config.token_url)
            .field("client_id", &self.config.client_id)
            .finish_non_exhaustive()
    }
}
