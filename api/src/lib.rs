//! HTTP surface of the medical Q&A service.

use std::{env, net::SocketAddr, sync::Arc};

pub mod app {
    pub mod app_state;
    pub mod qa_service;
}

pub mod error_handler;

mod middleware_layer {
    pub mod request_id;
}

mod routes {
    pub mod ask {
        pub mod query_request;
        pub mod query_route;
    }
    pub mod index {
        pub mod index_dto;
        pub mod initialize_route;
        pub mod reset_route;
    }
    pub mod system {
        pub mod health_route;
        pub mod root_route;
        pub mod status_route;
    }
}

use axum::{
    Router, middleware,
    http::HeaderValue,
    routing::{get, post},
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

pub use crate::app::{app_state::AppState, qa_service::QaService};
pub use crate::error_handler::AppError;

use crate::{
    middleware_layer::request_id::request_id,
    routes::{
        ask::query_route::query,
        index::{initialize_route::initialize, reset_route::reset},
        system::{health_route::health, root_route::root, status_route::status},
    },
};

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

/// Builds the router with CORS, request tracing and request ids.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/initialize", post(initialize))
        .route("/query", post(query))
        .route("/reset", post(reset))
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id))
}

/// Origins from `CORS_ALLOW_ORIGINS` (comma separated); any method and header.
fn cors_layer() -> CorsLayer {
    let raw = env::var("CORS_ALLOW_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string());
    let origins: Vec<HeaderValue> = raw
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        warn!("CORS_ALLOW_ORIGINS has no valid origin, allowing any");
        base.allow_origin(Any)
    } else {
        base.allow_origin(AllowOrigin::list(origins))
    }
}

/// Builds the service from environment, binds `HOST:PORT` and serves until Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST/PORT '{host}:{port}': {e}")))?;

    info!("Starting up AI Doctor API...");
    let state = Arc::new(AppState::from_env().await);
    let app = build_router(state);

    let listener = TcpListener::bind(addr).await.map_err(AppError::Bind)?;
    info!(%addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
