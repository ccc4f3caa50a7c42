//! AgriSense Backend Server
//!
//! HTTP backend for smart-agriculture field deployments: sensor telemetry
//! ingest, account registration/login, and ML-backed crop and price
//! predictions logged for audit.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    AGRISENSE BACKEND                     │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌──────────┐  ┌───────────┐  ┌────────────────────────┐ │
//! │  │  API     │  │  Auth     │  │  Model Gateway         │ │
//! │  │  (Axum)  │  │  (Argon2) │  │  (ONNX artifacts)      │ │
//! │  └────┬─────┘  └─────┬─────┘  └───────────┬────────────┘ │
//! │       └──────────────┼────────────────────┘              │
//! │                      ▼                                   │
//! │               ┌─────────────┐                            │
//! │               │   SQLite    │                            │
//! │               └─────────────┘                            │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod error;
mod handlers;
mod inference;
mod models;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};
use inference::ModelGateway;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agrisense_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("AgriSense Backend starting...");
    tracing::info!("Database: {}", config.database_url);
    tracing::info!("Model directory: {}", config.model_dir);

    // Initialize database pool
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");

    // Apply schema
    tracing::info!("Applying database schema...");
    db::run_migrations(&pool)
        .await
        .expect("Failed to apply schema");

    // Build application state
    let state = AppState {
        pool,
        gateway: ModelGateway::new(&config.model_dir),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub gateway: ModelGateway,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Wide-open CORS is a development convenience; production sits behind a
    // proxy that sets its own policy
    let cors = if state.config.is_production() {
        CorsLayer::new()
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/sensor-data", post(handlers::sensor::ingest))
        .route("/latest-sensor", get(handlers::sensor::latest))
        .route("/predict-crop", post(handlers::predict::crop))
        .route("/predict-price", post(handlers::predict::price))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn router_builds_for_development_and_production() {
        let pool = db::test_pool().await;

        let dev = handlers::test_state(pool.clone(), "models");
        let _ = create_router(dev);

        let prod = AppState {
            pool,
            gateway: ModelGateway::new("models"),
            config: config::Config {
                database_url: "sqlite::memory:".to_string(),
                port: 0,
                model_dir: "models".to_string(),
                environment: "production".to_string(),
            },
        };
        assert!(prod.config.is_production());
        let _ = create_router(prod);
    }
}
