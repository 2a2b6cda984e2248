//! Credential types
//!
//! These types hold the OAuth2 client-credentials configuration and the
//! bearer credential cached between content calls.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Lifetime assumed when the token endpoint omits `expires_in`
pub const DEFAULT_TTL_SECONDS: i64 = 3600;

/// Safety margin subtracted from every token lifetime
pub const EXPIRY_MARGIN_SECONDS: i64 = 60;

/// Upper bound on an advertised token lifetime (one year)
pub const MAX_TTL_SECONDS: i64 = 365 * 24 * 3600;

/// OAuth2 client-credentials configuration
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Token endpoint URL
    pub token_url: String,
    /// Client ID (also sent as `x-client-id` on content calls)
    pub client_id: String,
    /// Client secret
    pub client_secret: String,
    /// Requested scope
    pub scope: String,
}

impl OAuthConfig {
    /// Create a config with the default `content` scope
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: "content".to_string(),
        }
    }

    /// Override the requested scope
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }
}

/// A bearer credential with its effective expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// The access token
    pub token: String,
    /// Instant after which the token must not be reused
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Create a credential issued at `issued_at` with the given lifetime.
    ///
    /// The stored expiry already has [`EXPIRY_MARGIN_SECONDS`] removed.
    /// Lifetimes outside `0..=MAX_TTL_SECONDS` are clamped into that range.
    pub fn issued(token: impl Into<String>, issued_at: DateTime<Utc>, ttl_seconds: i64) -> Self {
        let ttl = ttl_seconds.clamp(0, MAX_TTL_SECONDS);
        Self {
            token: token.into(),
            expires_at: issued_at + Duration::seconds(ttl - EXPIRY_MARGIN_SECONDS),
        }
    }

    /// Check whether the credential is expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Check whether the credential is expired right now
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// OAuth2 token endpoint response
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    pub(crate) fn into_credential(self, issued_at: DateTime<Utc>) -> Credential {
        let ttl = self.expires_in.unwrap_or(DEFAULT_TTL_SECONDS);
        Credential::issued(self.access_token, issued_at, ttl)
    }
}
