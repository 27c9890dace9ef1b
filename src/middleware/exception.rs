//! Fault boundary around the whole application router.
//!
//! Faults reach this layer as an `AppError::Fault` response (the `Fault` rides in the
//! response extensions) or as a panic, which `CatchPanicLayer` turns into the same
//! thing. Each one is written to the fault log exactly once and the body is replaced
//! with an opaque `{code, message, error_id, timestamp}`.
//!
//! 401 / 403 / business errors pass through untouched.
use std::any::Any;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::{AppError, ErrorResponse, Fault};
use crate::middleware::http::REQUEST_ID_HEADER;
use crate::services::fault_log::{FaultContext, FaultLog};

pub fn apply(router: Router, fault_log: FaultLog) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(fault_log, intercept))
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    AppError::Fault(Fault::from_panic(payload.as_ref())).into_response()
}

async fn intercept(State(fault_log): State<FaultLog>, req: Request, next: Next) -> Response {
    let context = FaultContext {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        request_id: req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };

    let mut res = next.run(req).await;

    let Some(fault) = res.extensions_mut().remove::<Fault>() else {
        return res;
    };

    let entry = fault_log.record(&fault, context).await;

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::internal(entry.error_id, entry.timestamp)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{body::Body, http::Request as HttpRequest, routing::get};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::services::fault_log::MemoryFaultSink;

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset while reading row 7")]
    struct StoreError;

    async fn failing() -> Result<&'static str, AppError> {
        Err(AppError::fault(&StoreError))
    }

    async fn panicking() -> &'static str {
        panic!("index out of bounds: secret detail")
    }

    async fn missing() -> Result<&'static str, AppError> {
        Err(AppError::not_found("employee"))
    }

    fn router(sink: &MemoryFaultSink) -> Router {
        let router = Router::new()
            .route("/fail", get(failing))
            .route("/panic", get(panicking))
            .route("/missing", get(missing))
            .route("/ok", get(|| async { "ok" }));
        apply(router, FaultLog::new(Arc::new(sink.clone())))
    }

    async fn call(router: Router, uri: &str) -> (StatusCode, Value) {
        let res = router
            .oneshot(HttpRequest::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn handler_fault_is_logged_once_and_sanitized() {
        let sink = MemoryFaultSink::new();

        let (status, body) = call(router(&sink), "/fail").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "connection reset while reading row 7");
        assert!(entries[0].kind.ends_with("StoreError"));
        assert_eq!(entries[0].context.path, "/fail");

        assert_eq!(body["error"]["code"], "INTERNAL");
        assert_eq!(body["error"]["error_id"], entries[0].error_id.to_string());
        assert!(body["error"]["timestamp"].is_string());
        assert!(!body.to_string().contains("row 7"));
    }

    #[tokio::test]
    async fn panics_become_faults() {
        let sink = MemoryFaultSink::new();

        let (status, body) = call(router(&sink), "/panic").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, "panic");
        assert!(entries[0].message.contains("secret detail"));
        assert!(!body.to_string().contains("secret detail"));
    }

    #[tokio::test]
    async fn business_errors_and_successes_are_not_faults() {
        let sink = MemoryFaultSink::new();

        let (status, body) = call(router(&sink), "/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (status, _) = call(router(&sink), "/ok").await;
        assert_eq!(status, StatusCode::OK);

        assert!(sink.entries().is_empty());
    }
}
