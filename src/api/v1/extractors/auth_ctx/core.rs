use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::claims::ClaimsPrincipal;

/// Extractor that gives a handler the principal of the current request.
///
/// The access middleware must have inserted the principal into request extensions.
/// If it is missing the route is not protected, and the request is answered with 401.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub ClaimsPrincipal);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ClaimsPrincipal>()
            .cloned()
            .map(CurrentPrincipal)
            .ok_or(AppError::Unauthorized)
    }
}
