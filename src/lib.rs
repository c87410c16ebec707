// Public API for integration tests and potential library usage

pub mod api;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod protocol;
pub mod state;
pub mod types;
pub mod ws;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Assemble the HTTP router: WebSocket, API and the static client
pub fn app(state: Arc<state::AppState>, static_dir: &str) -> Router {
    let api_routes = Router::new()
        .route("/api/health", get(api::health))
        .route("/api/lobbies/{id}", get(api::get_lobby));

    Router::new()
        .route("/ws", get(ws::ws_handler))
        .merge(api_routes)
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
