use super::handlers;
use super::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Recordings can be large; the service is the authority on size
const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024 * 1024;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session state
        .route("/session", get(handlers::get_session))
        .route("/session/upload", post(handlers::upload_recording))
        // Playback
        .route(
            "/session/segments/:index/play",
            post(handlers::play_segment),
        )
        .route("/session/playback", get(handlers::get_playback))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        // Presentation layer runs on another origin
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
