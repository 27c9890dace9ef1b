//! HS256 access-token codec.
//!
//! Wire format: `base64url(header) . base64url(payload) . base64url(signature)`.
//!
//! Decode order is fixed:
//! 1. structural check (exactly three base64url segments)
//! 2. signature over `header.payload`, compared in constant time by `jsonwebtoken`
//! 3. payload parsing
//! 4. expiry (`now > exp` is expired; `now == exp` is still valid)
use std::collections::BTreeMap;
use std::fmt;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::services::auth::claims::{ClaimSet, ClaimsPrincipal};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("token signature is invalid")]
    SignatureInvalid,
    #[error("token expired")]
    Expired,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningKeyError {
    #[error("signing key is too short ({len} bytes, need at least {min})")]
    TooShort { len: usize, min: usize },
}

/// Process-wide symmetric secret.
///
/// Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub const MIN_LEN: usize = 32;

    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, SigningKeyError> {
        let bytes = bytes.into();
        if bytes.len() < Self::MIN_LEN {
            return Err(SigningKeyError::TooShort {
                len: bytes.len(),
                min: Self::MIN_LEN,
            });
        }
        Ok(Self(bytes))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Signed, serialized access token handed to clients.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bearer tokens are credentials
        f.write_str("Token(..)")
    }
}

/// Anything that can turn a presented bearer credential into a principal.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<ClaimsPrincipal, TokenError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    sub: String,
    role: String,
    iat: i64,
    exp: i64,
    #[serde(flatten)]
    extensions: BTreeMap<String, Value>,
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(key: SigningKey) -> Self {
        let encoding_key = EncodingKey::from_secret(&key.0);
        let decoding_key = DecodingKey::from_secret(&key.0);

        // Signature only. Expiry is checked here against an explicit clock and there
        // is no audience/issuer in a single-issuer deployment.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        Self {
            encoding_key,
            decoding_key,
            validation,
        }
    }

    pub fn encode(&self, claims: &ClaimSet, ttl: Duration) -> Result<Token, TokenError> {
        self.encode_at(claims, ttl, Utc::now())
    }

    /// Stamp `iat = now`, `exp = now + ttl` and sign.
    pub fn encode_at(
        &self,
        claims: &ClaimSet,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Token, TokenError> {
        let iat = now.timestamp();
        let payload = TokenPayload {
            sub: claims.subject().to_string(),
            role: claims.role().to_string(),
            iat,
            exp: iat.saturating_add(ttl.num_seconds()),
            extensions: claims.extensions().clone(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());

        jsonwebtoken::encode(&header, &payload, &self.encoding_key)
            .map(Token)
            .map_err(|e| {
                tracing::error!(error = %e, "failed to sign access token");
                TokenError::Signing(e.to_string())
            })
    }

    pub fn decode(&self, token: &str) -> Result<ClaimsPrincipal, TokenError> {
        self.decode_at(token, Utc::now())
    }

    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<ClaimsPrincipal, TokenError> {
        check_segments(token)?;

        let data = jsonwebtoken::decode::<TokenPayload>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                _ => {
                    tracing::debug!(error = %e, "access token rejected as malformed");
                    TokenError::Malformed
                }
            })?;
        let payload = data.claims;

        if payload.sub.trim().is_empty() || payload.role.trim().is_empty() {
            return Err(TokenError::Malformed);
        }
        if DateTime::from_timestamp(payload.iat, 0).is_none()
            || DateTime::from_timestamp(payload.exp, 0).is_none()
        {
            return Err(TokenError::Malformed);
        }

        if now.timestamp() > payload.exp {
            return Err(TokenError::Expired);
        }

        Ok(ClaimsPrincipal::new(
            payload.sub,
            payload.role,
            payload.iat,
            payload.exp,
            payload.extensions,
        ))
    }
}

impl TokenVerifier for TokenCodec {
    fn verify(&self, token: &str) -> Result<ClaimsPrincipal, TokenError> {
        self.decode(token)
    }
}

/// Three non-empty, canonical base64url segments.
///
/// Tamper detection is about the decoded bytes: a flipped bit there is a signature
/// failure. Edits to the base64 text itself can produce a non-canonical segment and
/// are rejected here as `Malformed` before the signature is looked at.
fn check_segments(token: &str) -> Result<(), TokenError> {
    let mut count = 0;
    for segment in token.split('.') {
        count += 1;
        if count > 3 || segment.is_empty() || URL_SAFE_NO_PAD.decode(segment).is_err() {
            return Err(TokenError::Malformed);
        }
    }
    if count != 3 {
        return Err(TokenError::Malformed);
    }
    Ok(())
}
