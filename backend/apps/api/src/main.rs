//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors. Request errors are rendered
//! by the `auth` and `catalog` error types.

mod config;

use auth::middleware::{AccessTokenState, check_access_token};
use auth::{PgAuthRepository, auth_router, roles_router, users_router_with_cleanup};
use axum::{
    Router, http,
    http::{Method, header},
};
use catalog::{AccountContentCleanup, PgCatalogRepository, catalog_router};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,catalog=info,tower_http=info".into()
            }),
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
            Method::PUT,
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

    // Build router
    let auth_repo = PgAuthRepository::new(pool.clone());
    let catalog_repo = PgCatalogRepository::new(pool);
    // Account deletion clears the user's catalog content first
    let cleanup = AccountContentCleanup::new(Arc::new(catalog_repo.clone()));
    let api = Router::new()
        .nest("/auth", auth_router(auth_repo.clone(), config.auth.clone()))
        .nest("/roles", roles_router(auth_repo.clone(), config.auth.clone()))
        .nest(
            "/users",
            users_router_with_cleanup(auth_repo, config.auth.clone(), cleanup),
        )
        .merge(catalog_router(catalog_repo));

    let app = Router::new()
        .nest("/api", api)
        .layer(axum::middleware::from_fn_with_state(
            AccessTokenState::new(&config.auth),
            check_access_token,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
