use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Public Router Module
///
/// Everything the guard itself decides on. `/navigate` must stay reachable
/// without a session, otherwise an anonymous caller could never be sent to
/// the login page.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check.
        .route("/health", get(|| async { "ok" }))
        // GET /routes
        // The route tree in effect.
        .route("/routes", get(handlers::get_routes))
        // GET /navigate?to=...
        // Runs one navigation through the guard and reports every redirect.
        .route("/navigate", get(handlers::navigate))
        // --- Tag views ---
        .route("/views", get(handlers::get_views).delete(handlers::clear_views))
        .route("/views/visited", delete(handlers::close_visited_view))
        .route("/views/cached/{name}", delete(handlers::drop_cached_view))
        // --- Session ---
        .route("/session", get(handlers::get_session))
        .route("/session/token", post(handlers::set_token))
        .route("/session/login", post(handlers::login))
        .route("/session/logout", post(handlers::logout))
}
