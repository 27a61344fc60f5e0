mod config;
mod corpus;
mod errors;
mod matching;
mod models;
mod oauth;
mod routes;
mod skills_client;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::oauth::pool::TokenPool;
use crate::oauth::OAuthClient;
use crate::routes::build_router;
use crate::skills_client::{SkillExtractor, SkillsApiClient};
use crate::state::AppState;
use crate::store::MatchStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing provider credentials)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Job Match API v{}", env!("CARGO_PKG_VERSION"));

    ensure_data_dirs(&config).await?;

    // Initialize OAuth client and fill the token pool
    let auth = OAuthClient::new(
        config.token_url.clone(),
        config.client_id.clone(),
        config.client_secret.clone(),
        config.scope.clone(),
        config.skills_timeout(),
    );
    let tokens = Arc::new(TokenPool::new());
    tokens.populate(&auth, config.token_pool_size).await;
    if tokens.len().await == 0 {
        warn!("Token pool is empty; requests will mint a fresh token each time");
    }

    // Initialize skills client
    let extractor: Arc<dyn SkillExtractor> = Arc::new(SkillsApiClient::new(
        config.skills_url.clone(),
        config.skills_timeout(),
    ));
    info!("Skills client initialized ({})", config.skills_url);

    // Build app state
    let state = AppState {
        config: config.clone(),
        store: Arc::new(MatchStore::new()),
        tokens,
        auth,
        extractor,
    };

    let cors = build_cors(&config)?;

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Creates the jobs and résumé directories under the data dir if missing.
async fn ensure_data_dirs(config: &Config) -> Result<()> {
    let jobs_dir = config.jobs_dir();
    tokio::fs::create_dir_all(&jobs_dir)
        .await
        .with_context(|| format!("Failed to create {}", jobs_dir.display()))?;

    if let Some(cv_dir) = config.resume_path().parent() {
        tokio::fs::create_dir_all(cv_dir)
            .await
            .with_context(|| format!("Failed to create {}", cv_dir.display()))?;
    }
    Ok(())
}

/// CORS for the web client: one allowed origin, any method and header.
fn build_cors(config: &Config) -> Result<CorsLayer> {
    let origin: HeaderValue = config
        .cors_origin
        .parse()
        .with_context(|| format!("CORS_ORIGIN '{}' is not a valid origin", config.cors_origin))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any))
}
