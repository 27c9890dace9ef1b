/*
 * Responsibility
 * - Application-wide AppError
 * - IntoResponse (HTTP status / JSON error body)
 * - Fault: an unrecovered failure that the exception interceptor logs and sanitizes
 */
use std::any::Any;
use std::borrow::Cow;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::services::auth::authentication::LoginError;

pub const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ErrorResponse {
    /// Body for a logged fault; carries only the correlation id and time.
    pub fn internal(error_id: Uuid, timestamp: DateTime<Utc>) -> Self {
        Self {
            error: ErrorBody {
                code: "INTERNAL",
                message: INTERNAL_MESSAGE.to_string(),
                error_id: Some(error_id),
                timestamp: Some(timestamp),
            },
        }
    }
}

/// Internal detail of an unrecovered failure. Never serialized to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    kind: Cow<'static, str>,
    message: String,
}

impl Fault {
    pub fn new(kind: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Fault typed after the error that caused it.
    pub fn from_error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        Self::new(std::any::type_name::<E>(), err.to_string())
    }

    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::new("panic", message)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("internal fault ({})", .0.kind())]
    Fault(Fault),
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn fault<E: std::error::Error + ?Sized>(err: &E) -> Self {
        Self::Fault(Fault::from_error(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, *code, message.clone())
            }
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                self.to_string(),
            ),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", self.to_string()),
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{resource} not found."),
            ),
            AppError::Fault(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                INTERNAL_MESSAGE.to_string(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message,
                error_id: None,
                timestamp: None,
            },
        };

        let mut res = (status, Json(body)).into_response();

        match self {
            AppError::Unauthorized => {
                res.headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            }
            // The exception interceptor picks this up, logs it and rewrites the body.
            AppError::Fault(fault) => {
                res.extensions_mut().insert(fault);
            }
            _ => {}
        }

        res
    }
}

impl From<LoginError> for AppError {
    fn from(e: LoginError) -> Self {
        match e {
            LoginError::InvalidCredentials => AppError::InvalidCredentials,
            LoginError::Unavailable(reason) => {
                AppError::Fault(Fault::new("credential_store", reason))
            }
            LoginError::Token(err) => AppError::fault(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::token_codec::TokenError;

    #[test]
    fn fault_response_is_opaque_and_carries_fault() {
        let res = AppError::Fault(Fault::new("db", "password=hunter2 leaked")).into_response();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let fault = res.extensions().get::<Fault>().unwrap();
        assert_eq!(fault.message(), "password=hunter2 leaked");
    }

    #[test]
    fn unauthorized_advertises_bearer() {
        let res = AppError::Unauthorized.into_response();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn login_errors_map_to_transport_errors() {
        assert!(matches!(
            AppError::from(LoginError::InvalidCredentials),
            AppError::InvalidCredentials
        ));
        assert!(matches!(
            AppError::from(LoginError::Token(TokenError::Signing("boom".into()))),
            AppError::Fault(f) if f.kind().ends_with("TokenError")
        ));
    }

    #[test]
    fn panic_payloads_become_messages() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(Fault::from_panic(payload.as_ref()).message(), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(Fault::from_panic(payload.as_ref()).message(), "bang");
    }
}
