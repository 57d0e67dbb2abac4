//! HTTP API route definitions

use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{self, AppState};

/// Create the router with all routes
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::greeting))
        .route("/greetings", get(handlers::greeting))
        .route("/health", get(handlers::health))
        .route("/search", get(handlers::search))
        .route("/api/search", post(handlers::search_with_events))
        .route("/api/events", get(handlers::status_events))
        .with_state(app_state)
}
