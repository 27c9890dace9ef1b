//! Declarative access rule attached to a route registration.
use std::collections::BTreeSet;
use std::fmt;

use crate::services::auth::claims::ClaimsPrincipal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationRequirement {
    /// Any principal with a valid token.
    Authenticated,
    /// Principal's role must be one of these (never empty).
    AnyRole(BTreeSet<String>),
}

impl AuthorizationRequirement {
    pub fn authenticated() -> Self {
        Self::Authenticated
    }

    /// An empty role list degrades to `Authenticated`.
    pub fn roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles: BTreeSet<String> = roles
            .into_iter()
            .map(|r| {
                let r: String = r.into();
                r.trim().to_string()
            })
            .filter(|r| !r.is_empty())
            .collect();

        if roles.is_empty() {
            Self::Authenticated
        } else {
            Self::AnyRole(roles)
        }
    }

    /// Comma separated role list, e.g. `"Admin,POC"`.
    pub fn parse(raw: &str) -> Self {
        Self::roles(raw.split(','))
    }

    pub fn permits(&self, principal: &ClaimsPrincipal) -> bool {
        match self {
            Self::Authenticated => true,
            Self::AnyRole(roles) => roles.contains(principal.role()),
        }
    }
}

impl fmt::Display for AuthorizationRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticated => f.write_str("authenticated"),
            Self::AnyRole(roles) => {
                let roles: Vec<&str> = roles.iter().map(String::as_str).collect();
                write!(f, "role in [{}]", roles.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn principal(role: &str) -> ClaimsPrincipal {
        ClaimsPrincipal::new("someone".into(), role.into(), 0, 60, BTreeMap::new())
    }

    #[test]
    fn parse_trims_and_drops_blanks() {
        assert_eq!(
            AuthorizationRequirement::parse(" Admin , POC,,"),
            AuthorizationRequirement::AnyRole(["Admin".to_string(), "POC".to_string()].into())
        );
        assert_eq!(
            AuthorizationRequirement::parse(" , "),
            AuthorizationRequirement::Authenticated
        );
    }

    #[test]
    fn role_sets_admit_only_members() {
        let req = AuthorizationRequirement::roles(["Admin", "POC"]);

        assert!(req.permits(&principal("Admin")));
        assert!(req.permits(&principal("POC")));
        assert!(!req.permits(&principal("User")));
        assert!(AuthorizationRequirement::authenticated().permits(&principal("User")));
    }

    #[test]
    fn displays_for_logs() {
        assert_eq!(
            AuthorizationRequirement::parse("POC,Admin").to_string(),
            "role in [Admin,POC]"
        );
    }
}
