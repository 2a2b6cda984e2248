//! Authentication module
//!
//! OAuth2 client-credentials flow with a cached, single-flight refreshed
//! bearer credential.

mod token;
mod types;

pub use token::TokenManager;
pub use types::{
    Credential, OAuthConfig, DEFAULT_TTL_SECONDS, EXPIRY_MARGIN_SECONDS, MAX_TTL_SECONDS,
};
