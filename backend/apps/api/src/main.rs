//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors. Handlers render domain errors
//! as problem details through the `auth` and `vote` error types.

mod config;

use auth::{
    AuthMiddlewareState, HttpIdentityProvider, PgAuthRepository, RefreshTokenUseCase,
    auth_router, require_access_token,
};
use axum::{
    Router, http,
    http::{Method, header},
    middleware,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vote::{FsImageStorage, PgVoteRepository, vote_router};

use crate::config::ServerConfig;

/// Delete expired refresh-token revocations now and then every `period`.
///
/// Failures are logged and never stop the server.
fn spawn_blocklist_sweep(refresh: RefreshTokenUseCase<PgAuthRepository>, period: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            // First tick fires immediately
            ticker.tick().await;
            if let Err(e) = refresh.cleanup_expired_blocked_tokens().await {
                tracing::warn!(error = %e, "Blocked token sweep failed, continuing anyway");
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,vote=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let auth_config = Arc::new(config.auth);
    let vote_config = Arc::new(config.vote);
    let auth_repo = Arc::new(PgAuthRepository::new(pool.clone()));
    let vote_repo = Arc::new(PgVoteRepository::new(pool.clone()));
    let identity = Arc::new(HttpIdentityProvider::new(&auth_config)?);
    let storage = Arc::new(FsImageStorage::new(
        config.image_dir.clone(),
        config.image_base_url.clone(),
    ));

    spawn_blocklist_sweep(
        RefreshTokenUseCase::new(auth_repo.clone(), auth_config.clone()),
        config.blocklist_sweep_interval,
    );

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Every vote route needs a caller
    let votes = vote_router(vote_repo, storage, vote_config).route_layer(
        middleware::from_fn_with_state(
            AuthMiddlewareState {
                repo: auth_repo.clone(),
                config: auth_config.clone(),
            },
            require_access_token::<PgAuthRepository>,
        ),
    );

    // Build router
    let app = Router::new()
        .nest("/api/users", auth_router(auth_repo, identity, auth_config))
        .nest("/api/votes", votes)
        .nest_service("/images", ServeDir::new(&config.image_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
