mod auth;
mod config;
mod db;
mod documents;
mod employers;
mod errors;
mod models;
mod profile;
mod routes;
mod state;
mod users;
mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::{PasswordService, PgUserStore};
use crate::config::{Config, RECOMMENDED_KEY_BYTES};
use crate::db::{create_pool, init_schema};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    let level = if config.debug { "debug" } else { config.rust_log.as_str() };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={level},tower_http={level}", env!("CARGO_CRATE_NAME")))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Tailor API v{}", env!("CARGO_PKG_VERSION"));
    info!("Auth config: {:?}", config.auth);
    if config.auth.has_short_key() {
        warn!(
            "SECRET_KEY is {} bytes; at least {RECOMMENDED_KEY_BYTES} bytes are recommended",
            config.auth.signing_key().len()
        );
    }
    if config.auto_verify_accounts {
        warn!("AUTO_VERIFY_ACCOUNTS is enabled: new accounts are created verified");
    }

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    init_schema(&db).await?;

    let users = Arc::new(PgUserStore::new(db.clone()));
    let cors = build_cors(&config.cors_origins)?;
    let port = config.port;

    // Build app state
    let state = AppState::new(db, config, users, PasswordService::default());

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Credentialed CORS for the configured front-end origins.
fn build_cors(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("CORS origin '{o}' is not a valid header value"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}
