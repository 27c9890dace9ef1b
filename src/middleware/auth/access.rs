//! Bearer token check -> role check -> ClaimsPrincipal in request extensions.
//!
//! `evaluate` is the single enforcement point. `protect` attaches it to a route
//! registration together with that route's `AuthorizationRequirement`.
//!
//! Decode failures are kept apart internally (logged), but the caller only ever sees
//! 401 for "who are you?" and 403 for "not allowed".
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};
use thiserror::Error;

use crate::error::AppError;
use crate::middleware::auth::requirement::AuthorizationRequirement;
use crate::services::auth::claims::ClaimsPrincipal;
use crate::services::auth::token_codec::{TokenError, TokenVerifier};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnauthenticatedReason {
    #[error("missing authorization header")]
    MissingHeader,
    #[error("authorization header is not a bearer credential")]
    InvalidScheme,
    #[error(transparent)]
    Token(TokenError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("unauthenticated: {0}")]
    Unauthenticated(UnauthenticatedReason),
    #[error("forbidden")]
    Forbidden,
}

impl From<AccessDenied> for AppError {
    fn from(e: AccessDenied) -> Self {
        match e {
            AccessDenied::Unauthenticated(_) => AppError::Unauthorized,
            AccessDenied::Forbidden => AppError::Forbidden,
        }
    }
}

/// Extract the credential from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, UnauthenticatedReason> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(UnauthenticatedReason::MissingHeader)?
        .to_str()
        .map_err(|_| UnauthenticatedReason::InvalidScheme)?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or(UnauthenticatedReason::InvalidScheme)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(UnauthenticatedReason::InvalidScheme);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(UnauthenticatedReason::InvalidScheme);
    }
    Ok(token)
}

/// Presence check, then validity, then role.
///
/// The verifier is not consulted when no bearer credential is present.
pub fn evaluate(
    headers: &HeaderMap,
    verifier: &dyn TokenVerifier,
    requirement: &AuthorizationRequirement,
) -> Result<ClaimsPrincipal, AccessDenied> {
    let token = bearer_token(headers).map_err(AccessDenied::Unauthenticated)?;

    let principal = verifier
        .verify(token)
        .map_err(|e| AccessDenied::Unauthenticated(UnauthenticatedReason::Token(e)))?;

    if !requirement.permits(&principal) {
        return Err(AccessDenied::Forbidden);
    }

    Ok(principal)
}

#[derive(Clone)]
struct AccessGuard {
    verifier: Arc<dyn TokenVerifier>,
    requirement: Arc<AuthorizationRequirement>,
}

/// Guard a route with `requirement`.
///
/// Example:
/// ```ignore
/// .route("/employees", protect(post(create_employee), &state, AuthorizationRequirement::parse("Admin")))
/// ```
pub fn protect(
    route: MethodRouter<AppState>,
    state: &AppState,
    requirement: AuthorizationRequirement,
) -> MethodRouter<AppState> {
    let guard = AccessGuard {
        verifier: state.codec.clone(),
        requirement: Arc::new(requirement),
    };
    route.route_layer(middleware::from_fn_with_state(guard, access_middleware))
}

async fn access_middleware(
    State(guard): State<AccessGuard>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let principal = evaluate(req.headers(), guard.verifier.as_ref(), &guard.requirement)
        .map_err(|denied| {
            match &denied {
                AccessDenied::Unauthenticated(reason) => tracing::warn!(
                    reason = %reason,
                    path = %req.uri().path(),
                    "request rejected: unauthenticated"
                ),
                AccessDenied::Forbidden => tracing::warn!(
                    requirement = %guard.requirement,
                    path = %req.uri().path(),
                    "request rejected: forbidden"
                ),
            }
            AppError::from(denied)
        })?;

    tracing::debug!(subject = %principal.subject(), role = %principal.role(), "request authorized");

    // middleware -> extractor
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
