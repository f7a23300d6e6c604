use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, put},
};

/// Authenticated Router Module
///
/// Proxies to the listener backend. The router layer above rejects requests
/// while the console has no session; the handlers also take `ActiveSession`
/// so they cannot be mounted anywhere else by mistake.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET/POST /listeners
        .route(
            "/listeners",
            get(handlers::list_listeners).post(handlers::create_listener),
        )
        // DELETE /listeners/{uuid}
        .route("/listeners/{uuid}", delete(handlers::delete_listener))
        // PUT /listeners/{uuid}/status
        // Toggles the listener between enabled and disabled.
        .route(
            "/listeners/{uuid}/status",
            put(handlers::change_listener_status),
        )
}
