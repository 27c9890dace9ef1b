/*
 * Responsibility
 * - Load Config -> build dependencies -> assemble the Router
 * - Apply middleware (fault boundary, request id / trace / limits)
 * - Start axum::serve()
 */
use std::sync::Arc;

use anyhow::Result;
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health::health;
use crate::config::Config;
use crate::middleware;
use crate::repos::employee_repo::EmployeeRepo;
use crate::services::auth::build_auth_services;
use crate::services::auth::credentials::UserSpec;
use crate::services::fault_log::{FaultLog, FileFaultSink};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,bearer_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );
    if config.users == UserSpec::demo_accounts() {
        tracing::warn!("demo accounts are enabled; set AUTH_USERS to replace them");
    }

    let state = build_state(&config);
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Process-level services, built once and shared through `AppState`.
pub fn build_state(config: &Config) -> AppState {
    let auth = build_auth_services(config);
    let fault_log = FaultLog::new(Arc::new(FileFaultSink::new(&config.fault_log_dir)));

    AppState::new(auth, fault_log, EmployeeRepo::seeded())
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes(&state))
        .with_state(state.clone());

    let router = middleware::exception::apply(router, state.fault_log);
    middleware::http::apply(router, &config.http)
}
