use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Navigation core: route table, flattener, matcher, guard and controller.
pub mod navigation;
pub mod session;
pub mod tags_view;
pub mod storage;
pub mod console;

// Shell around the core.
pub mod api_client;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;

// Public and session-protected route groups.
pub mod routes;
use auth::ActiveSession;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use api_client::{ApiState, ConsoleApi, HttpConsoleApi};
pub use config::AppConfig;
pub use console::{Console, ConsoleState};
pub use error::ConsoleError;
pub use storage::{FileStorage, MemoryStorage, StorageState};

/// ApiDoc
///
/// OpenAPI document for the console shell, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_routes, handlers::navigate, handlers::get_views,
        handlers::close_visited_view, handlers::drop_cached_view, handlers::clear_views,
        handlers::get_session, handlers::set_token, handlers::login, handlers::logout,
        handlers::list_listeners, handlers::create_listener, handlers::delete_listener,
        handlers::change_listener_status
    ),
    components(
        schemas(
            models::RouteNode, models::RouteMeta, models::VisitedView, models::ViewsSnapshot,
            models::SessionInfo, models::SetTokenRequest, models::LoginRequestData,
            models::ListenerData, models::CreateListenerRequest,
            navigation::NavigationReport, navigation::Decision, navigation::ResolvedRoute,
        )
    ),
    tags(
        (name = "listener-console", description = "Listener console navigation shell")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared by every request. The console owns all mutable navigation state;
/// the API client and configuration are read-only.
#[derive(Clone)]
pub struct AppState {
    pub console: ConsoleState,
    /// Backend client. Swapped for a stub in tests.
    pub api: ApiState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for ConsoleState {
    fn from_ref(app_state: &AppState) -> ConsoleState {
        app_state.console.clone()
    }
}

impl FromRef<AppState> for ApiState {
    fn from_ref(app_state: &AppState) -> ApiState {
        app_state.api.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Lets a request through only when the `ActiveSession` extractor succeeds;
/// its rejection (401) short-circuits the handler.
async fn auth_middleware(_session: ActiveSession, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the shell's routes, the session layer and the observability stack.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one shell request, tagged with its `x-request-id` so every log
/// line of a navigation can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
