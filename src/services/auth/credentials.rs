//! Username/password verification.
//!
//! `CredentialVerifier` is the seam to whatever identity store backs the service.
//! `InMemoryCredentialVerifier` is the store used when users come from configuration.
use std::collections::HashMap;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Who the caller is once their credentials have been accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// Unknown user and wrong password are deliberately the same variant.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> Result<Identity, CredentialError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserSpecError {
    #[error("user entry {0} must be `username:password:role`")]
    Format(usize),
    #[error("user entry {0} has an empty field")]
    Empty(usize),
    #[error("duplicate user {0:?}")]
    Duplicate(String),
}

/// One configured account.
#[derive(Clone, PartialEq, Eq)]
pub struct UserSpec {
    pub username: String,
    pub password: String,
    pub role: String,
}

impl std::fmt::Debug for UserSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSpec")
            .field("username", &self.username)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl UserSpec {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role: role.into(),
        }
    }

    /// Parse `username:password:role[,username:password:role...]`.
    ///
    /// The role is everything after the last `:`, the username everything before the
    /// first one, so passwords may contain `:`.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, UserSpecError> {
        let mut users: Vec<Self> = Vec::new();

        for (i, entry) in raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .enumerate()
        {
            let (username, rest) = entry.split_once(':').ok_or(UserSpecError::Format(i))?;
            let (password, role) = rest.rsplit_once(':').ok_or(UserSpecError::Format(i))?;
            let (username, role) = (username.trim(), role.trim());

            if username.is_empty() || password.is_empty() || role.is_empty() {
                return Err(UserSpecError::Empty(i));
            }
            if users.iter().any(|u| u.username == username) {
                return Err(UserSpecError::Duplicate(username.to_string()));
            }

            users.push(Self::new(username, password, role));
        }

        Ok(users)
    }

    /// Accounts seeded in development when none are configured.
    pub fn demo_accounts() -> Vec<Self> {
        vec![
            Self::new("admin", "password", "Admin"),
            Self::new("user", "password", "User"),
        ]
    }
}

struct StoredUser {
    password_digest: [u8; 32],
    role: String,
}

/// Identity store held in memory, keyed by username.
///
/// Passwords are kept as SHA-256 digests and compared in constant time. An unknown
/// username is compared against a dummy digest so both failure paths do the same work.
pub struct InMemoryCredentialVerifier {
    users: HashMap<String, StoredUser>,
    dummy_digest: [u8; 32],
}

impl InMemoryCredentialVerifier {
    pub fn new(users: impl IntoIterator<Item = UserSpec>) -> Self {
        let users = users
            .into_iter()
            .map(|u| {
                (
                    u.username,
                    StoredUser {
                        password_digest: digest(&u.password),
                        role: u.role,
                    },
                )
            })
            .collect();

        Self {
            users,
            dummy_digest: digest("\u{0}unknown-user\u{0}"),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl CredentialVerifier for InMemoryCredentialVerifier {
    async fn verify(&self, username: &str, password: &str) -> Result<Identity, CredentialError> {
        let presented = digest(password);
        let user = self.users.get(username);
        let expected = user.map_or(&self.dummy_digest, |u| &u.password_digest);

        let matches: bool = presented.as_slice().ct_eq(expected.as_slice()).into();

        match user {
            Some(user) if matches => Ok(Identity {
                subject: username.to_string(),
                role: user.role.clone(),
            }),
            _ => Err(CredentialError::InvalidCredentials),
        }
    }
}

fn digest(password: &str) -> [u8; 32] {
    Sha256::digest(password.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> InMemoryCredentialVerifier {
        InMemoryCredentialVerifier::new(UserSpec::demo_accounts())
    }

    #[tokio::test]
    async fn accepts_known_pair() {
        let identity = verifier().verify("admin", "password").await.unwrap();

        assert_eq!(identity.subject, "admin");
        assert_eq!(identity.role, "Admin");
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_the_same() {
        let verifier = verifier();

        let wrong_password = verifier.verify("admin", "nope").await.unwrap_err();
        let unknown_user = verifier.verify("nobody", "password").await.unwrap_err();

        assert_eq!(wrong_password, CredentialError::InvalidCredentials);
        assert_eq!(unknown_user, wrong_password);
    }

    #[tokio::test]
    async fn empty_store_rejects_everything() {
        let verifier = InMemoryCredentialVerifier::new(Vec::new());

        assert!(verifier.is_empty());
        assert_eq!(
            verifier.verify("admin", "password").await,
            Err(CredentialError::InvalidCredentials)
        );
    }

    #[test]
    fn parses_user_list() {
        let users = UserSpec::parse_list(" admin:pa:ss:Admin , poc:secret:POC ,").unwrap();

        assert_eq!(
            users,
            vec![
                UserSpec::new("admin", "pa:ss", "Admin"),
                UserSpec::new("poc", "secret", "POC"),
            ]
        );
    }

    #[test]
    fn rejects_bad_user_entries() {
        assert_eq!(UserSpec::parse_list("admin"), Err(UserSpecError::Format(0)));
        assert_eq!(UserSpec::parse_list("a:b:c,d:e"), Err(UserSpecError::Format(1)));
        assert_eq!(UserSpec::parse_list("a::Admin"), Err(UserSpecError::Empty(0)));
        assert_eq!(
            UserSpec::parse_list("a:b:X,a:c:Y"),
            Err(UserSpecError::Duplicate("a".into()))
        );
    }

    #[test]
    fn debug_hides_passwords() {
        let rendered = format!("{:?}", UserSpec::new("admin", "hunter2", "Admin"));
        assert!(!rendered.contains("hunter2"));
    }
}
