/*
 * Responsibility
 * - POST /auth/login: credentials -> token (anonymous)
 * - POST /auth/refresh: current principal -> brand-new token
 * - GET  /auth/me: the principal attached by the access middleware
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::api::v1::dto::auth::{LoginRequest, TokenResponse, WhoAmIResponse};
use crate::api::v1::extractors::CurrentPrincipal;
use crate::error::AppError;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    // axum's rejection text names the missing field; keep it out of the response
    let Json(req) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "login body rejected");
        AppError::bad_request("INVALID_REQUEST", "invalid login request")
    })?;

    let issued = state.auth.login(&req.username, &req.password).await?;
    Ok(Json(issued.into()))
}

pub async fn refresh(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<TokenResponse>, AppError> {
    let issued = state.auth.refresh(&principal)?;
    Ok(Json(issued.into()))
}

pub async fn me(CurrentPrincipal(principal): CurrentPrincipal) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse::from(&principal))
}
