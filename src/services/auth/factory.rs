/// Factory: build the auth services from application `Config`.
use std::sync::Arc;

use chrono::Duration;

use crate::config::Config;
use crate::services::auth::credentials::InMemoryCredentialVerifier;
use crate::services::auth::{AuthenticationService, TokenCodec};

/// Process-level auth services shared through `AppState`.
#[derive(Clone, Debug)]
pub struct AuthServices {
    pub codec: Arc<TokenCodec>,
    pub authentication: Arc<AuthenticationService>,
}

pub fn build_auth_services(config: &Config) -> AuthServices {
    let codec = Arc::new(TokenCodec::new(config.signing_key.clone()));
    let verifier = Arc::new(InMemoryCredentialVerifier::new(config.users.iter().cloned()));

    tracing::info!(
        users = verifier.len(),
        ttl_seconds = config.access_token_ttl_seconds,
        "auth services ready"
    );

    // Bounded by MAX_ACCESS_TOKEN_TTL_SECONDS in Config
    let ttl = Duration::seconds(config.access_token_ttl_seconds as i64);
    let authentication = Arc::new(AuthenticationService::new(verifier, codec.clone(), ttl));

    AuthServices {
        codec,
        authentication,
    }
}
