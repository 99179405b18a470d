//! Router setup with all API routes and middleware.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use pharmaq_core::config::PharmaqConfig;
use pharmaq_core::error::PharmaqError;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // The page is served by this process, so only its own origins are allowed.
    let port = state.config.general.port;
    let origins: Vec<HeaderValue> = [
        format!("http://127.0.0.1:{}", port),
        format!("http://localhost:{}", port),
    ]
    .iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/", get(handlers::ui))
        .route("/ui", get(handlers::ui))
        .route("/health", get(handlers::health))
        .route("/catalog", get(handlers::catalog))
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/{id}", get(handlers::get_session))
        .route("/sessions/{id}/chat", post(handlers::chat))
        .route("/sessions/{id}/report", post(handlers::report))
        .route("/sessions/{id}/report.xlsx", get(handlers::report_xlsx))
        .route("/sessions/{id}/email", post(handlers::email))
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB global limit
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind the configured address and serve until the process is stopped.
pub async fn start_server(config: &PharmaqConfig, state: AppState) -> Result<(), PharmaqError> {
    let addr = format!("{}:{}", config.general.bind_address, config.general.port);
    let router = create_router(state);

    tracing::info!(address = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PharmaqError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| PharmaqError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
