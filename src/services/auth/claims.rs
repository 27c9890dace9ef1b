//! Claims carried inside access tokens.
//!
//! - `ClaimSet` is what callers hand to the codec when minting a token.
//! - `ClaimsPrincipal` is what the codec hands back after a token has been verified.
//!   It can only be built inside this crate, so application code never fabricates one.
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Names of the claims the codec owns.
pub const SUBJECT: &str = "sub";
pub const ROLE: &str = "role";
pub const ISSUED_AT: &str = "iat";
pub const EXPIRES_AT: &str = "exp";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ClaimName {
    Subject,
    Role,
    IssuedAt,
    ExpiresAt,
    Extension(String),
}

impl ClaimName {
    pub fn parse(name: &str) -> Self {
        match name {
            SUBJECT => Self::Subject,
            ROLE => Self::Role,
            ISSUED_AT => Self::IssuedAt,
            EXPIRES_AT => Self::ExpiresAt,
            other => Self::Extension(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Subject => SUBJECT,
            Self::Role => ROLE,
            Self::IssuedAt => ISSUED_AT,
            Self::ExpiresAt => EXPIRES_AT,
            Self::Extension(name) => name,
        }
    }

    pub fn is_reserved(&self) -> bool {
        !matches!(self, Self::Extension(_))
    }
}

impl fmt::Display for ClaimName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single verified (name, value) fact.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    name: ClaimName,
    value: Value,
}

impl Claim {
    pub fn new(name: ClaimName, value: impl Into<Value>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }

    pub fn name(&self) -> &ClaimName {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// String view of the value, when it is a JSON string.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }
}

/// Input to `TokenCodec::encode`.
///
/// `iat` / `exp` are never part of a claim set: the codec stamps them at encode time.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimSet {
    subject: String,
    role: String,
    extensions: BTreeMap<String, Value>,
}

impl ClaimSet {
    pub fn new(subject: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            role: role.into(),
            extensions: BTreeMap::new(),
        }
    }

    /// Add an extension claim. Reserved names are dropped.
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        if ClaimName::parse(&name).is_reserved() {
            tracing::debug!(claim = %name, "reserved claim name ignored in extension claims");
            return self;
        }
        self.extensions.insert(name, value.into());
        self
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn extensions(&self) -> &BTreeMap<String, Value> {
        &self.extensions
    }
}

/// Identity and role derived from exactly one verified token.
///
/// Lives for one request: the access filter builds it, attaches it to the request
/// and it is dropped with the request.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimsPrincipal {
    subject: String,
    role: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    claims: Vec<Claim>,
}

impl ClaimsPrincipal {
    pub(crate) fn new(
        subject: String,
        role: String,
        issued_at: i64,
        expires_at: i64,
        extensions: BTreeMap<String, Value>,
    ) -> Self {
        let mut claims = Vec::with_capacity(4 + extensions.len());
        claims.push(Claim::new(ClaimName::Subject, subject.clone()));
        claims.push(Claim::new(ClaimName::Role, role.clone()));
        claims.push(Claim::new(ClaimName::IssuedAt, issued_at));
        claims.push(Claim::new(ClaimName::ExpiresAt, expires_at));
        claims.extend(
            extensions
                .into_iter()
                .map(|(name, value)| Claim::new(ClaimName::Extension(name), value)),
        );

        Self {
            subject,
            role,
            issued_at: timestamp(issued_at),
            expires_at: timestamp(expires_at),
            claims,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn claim(&self, name: &str) -> Option<&Claim> {
        self.claims.iter().find(|c| c.name.as_str() == name)
    }

    pub fn is_in_role(&self, role: &str) -> bool {
        self.role == role
    }
}

// Out-of-range seconds clamp to the epoch; the codec has already range-checked `exp`.
fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reserved_names_are_not_extensions() {
        let set = ClaimSet::new("alice", "Admin")
            .with_claim("sub", "mallory")
            .with_claim("exp", 0)
            .with_claim("dept", "IT");

        assert_eq!(set.subject(), "alice");
        assert_eq!(set.extensions().len(), 1);
        assert_eq!(set.extensions().get("dept"), Some(&json!("IT")));
    }

    #[test]
    fn principal_orders_standard_claims_first() {
        let mut ext = BTreeMap::new();
        ext.insert("zeta".to_string(), json!(1));
        ext.insert("alpha".to_string(), json!("a"));

        let principal = ClaimsPrincipal::new(
            "alice".into(),
            "Admin".into(),
            1_700_000_000,
            1_700_000_600,
            ext,
        );

        let names: Vec<&str> = principal.claims().iter().map(|c| c.name().as_str()).collect();
        assert_eq!(names, vec!["sub", "role", "iat", "exp", "alpha", "zeta"]);
        assert_eq!(principal.claim("alpha").and_then(Claim::as_str), Some("a"));
        assert_eq!(principal.expires_at().timestamp(), 1_700_000_600);
    }

    #[test]
    fn role_membership_is_exact() {
        let principal =
            ClaimsPrincipal::new("bob".into(), "User".into(), 0, 60, BTreeMap::new());

        assert!(principal.is_in_role("User"));
        assert!(!principal.is_in_role("user"));
        assert!(!principal.is_in_role("Admin"));
    }
}
