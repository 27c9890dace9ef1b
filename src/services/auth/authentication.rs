use std::sync::Arc;

use chrono::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::services::auth::claims::{ClaimSet, ClaimsPrincipal};
use crate::services::auth::credentials::{CredentialError, CredentialVerifier, Identity};
use crate::services::auth::token_codec::{Token, TokenCodec, TokenError};

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<CredentialError> for LoginError {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::InvalidCredentials => Self::InvalidCredentials,
            CredentialError::Unavailable(reason) => Self::Unavailable(reason),
        }
    }
}

/// Service-level return type to keep handlers thin.
#[derive(Clone, Debug)]
pub struct IssuedToken {
    pub token: Token,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// Turns credentials into access tokens.
///
/// - CredentialVerifier decides who the caller is.
/// - TokenCodec signs `{sub, role, jti}` with the configured ttl.
#[derive(Clone)]
pub struct AuthenticationService {
    verifier: Arc<dyn CredentialVerifier>,
    codec: Arc<TokenCodec>,
    ttl: Duration,
}

impl std::fmt::Debug for AuthenticationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationService")
            .field("codec", &self.codec)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl AuthenticationService {
    pub fn new(verifier: Arc<dyn CredentialVerifier>, codec: Arc<TokenCodec>, ttl: Duration) -> Self {
        Self {
            verifier,
            codec,
            ttl,
        }
    }

    /// One credential check, then one token. No retries, no lockout.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, LoginError> {
        let identity = self.verifier.verify(username, password).await.map_err(|e| {
            match &e {
                CredentialError::InvalidCredentials => tracing::info!("login rejected"),
                CredentialError::Unavailable(reason) => {
                    tracing::error!(%reason, "credential store unavailable")
                }
            }
            LoginError::from(e)
        })?;

        let issued = self.issue(&identity)?;
        tracing::info!(subject = %identity.subject, role = %identity.role, "access token issued");
        Ok(issued)
    }

    /// Issue a brand-new token for a principal that has already been authenticated.
    ///
    /// The presented token is left untouched; it stays valid until its own `exp`.
    pub fn refresh(&self, principal: &ClaimsPrincipal) -> Result<IssuedToken, LoginError> {
        let identity = Identity {
            subject: principal.subject().to_string(),
            role: principal.role().to_string(),
        };
        let issued = self.issue(&identity)?;
        tracing::info!(subject = %identity.subject, "access token refreshed");
        Ok(issued)
    }

    fn issue(&self, identity: &Identity) -> Result<IssuedToken, LoginError> {
        let claims = ClaimSet::new(&identity.subject, &identity.role)
            .with_claim("jti", Uuid::new_v4().to_string());

        let token = self.codec.encode(&claims, self.ttl)?;

        Ok(IssuedToken {
            token,
            token_type: "Bearer",
            expires_in: self.ttl.num_seconds().max(0) as u64,
        })
    }
}
