use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::auth::{ClaimsPrincipal, IssuedToken, Token};

/// Request body for `/auth/login`.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: Token,
    /// Always "Bearer"
    pub token_type: &'static str,
    /// Seconds until expiry.
    pub expires_in: u64,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            token_type: issued.token_type,
            expires_in: issued.expires_in,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub subject: String,
    pub role: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<&ClaimsPrincipal> for WhoAmIResponse {
    fn from(principal: &ClaimsPrincipal) -> Self {
        Self {
            subject: principal.subject().to_string(),
            role: principal.role().to_string(),
            issued_at: principal.issued_at(),
            expires_at: principal.expires_at(),
        }
    }
}
