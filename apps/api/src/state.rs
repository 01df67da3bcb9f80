use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{AccessGate, IdentityResolver, PasswordService, TokenService, UserStore};
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Account persistence used by the auth core. Postgres in production.
    pub users: Arc<dyn UserStore>,
    pub passwords: PasswordService,
    pub tokens: Arc<TokenService>,
    pub gate: Arc<AccessGate>,
}

impl AppState {
    pub fn new(
        db: PgPool,
        config: Config,
        users: Arc<dyn UserStore>,
        passwords: PasswordService,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(&config.auth));
        let gate = Arc::new(AccessGate::new(IdentityResolver::new(
            tokens.clone(),
            users.clone(),
        )));

        Self {
            db,
            config,
            users,
            passwords,
            tokens,
            gate,
        }
    }
}
