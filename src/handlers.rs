use crate::{
    AppState,
    auth::ActiveSession,
    error::ConsoleError,
    models::{
        CreateListenerRequest, ListenerData, LoginRequestData, RouteNode, SessionInfo,
        SetTokenRequest, ViewsSnapshot,
    },
    navigation::NavigationReport,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

// --- Query Structs ---

/// NavigateQuery
///
/// `GET /navigate?to=/listener/https`
#[derive(Deserialize, utoipa::IntoParams)]
pub struct NavigateQuery {
    /// Raw location: path, optional query string and hash.
    pub to: String,
}

/// ViewPathQuery
///
/// `DELETE /views/visited?path=/listener/https`
#[derive(Deserialize, utoipa::IntoParams)]
pub struct ViewPathQuery {
    pub path: String,
}

// --- Navigation Handlers ---

/// get_routes
///
/// The route tree in effect, flattened when third-level caching is enabled.
#[utoipa::path(
    get,
    path = "/routes",
    responses((status = 200, description = "Route table", body = [RouteNode]))
)]
pub async fn get_routes(State(state): State<AppState>) -> Json<Vec<RouteNode>> {
    Json(state.console.routes().to_vec())
}

/// navigate
///
/// Runs a full navigation through the guard and commits the destination.
/// Redirects are part of the report, not HTTP redirects.
#[utoipa::path(
    get,
    path = "/navigate",
    params(NavigateQuery),
    responses(
        (status = 200, description = "Navigation committed", body = NavigationReport),
        (status = 409, description = "Superseded by a newer navigation"),
        (status = 508, description = "Redirect loop")
    )
)]
pub async fn navigate(
    State(state): State<AppState>,
    Query(query): Query<NavigateQuery>,
) -> Result<Json<NavigationReport>, ConsoleError> {
    let report = state.console.navigation.navigate(&query.to)?;
    Ok(Json(report))
}

// --- View Cache Handlers ---

#[utoipa::path(
    get,
    path = "/views",
    responses((status = 200, description = "Visited and cached views", body = ViewsSnapshot))
)]
pub async fn get_views(State(state): State<AppState>) -> Json<ViewsSnapshot> {
    Json(state.console.views.snapshot())
}

/// close_visited_view
///
/// Closes one tag and drops its view from the keep-alive set. Affix tags stay.
#[utoipa::path(
    delete,
    path = "/views/visited",
    params(ViewPathQuery),
    responses((status = 200, description = "Remaining views", body = ViewsSnapshot))
)]
pub async fn close_visited_view(
    State(state): State<AppState>,
    Query(query): Query<ViewPathQuery>,
) -> Json<ViewsSnapshot> {
    let views = &state.console.views;
    views.close_view(&query.path);
    Json(views.snapshot())
}

#[utoipa::path(
    delete,
    path = "/views/cached/{name}",
    params(("name" = String, Path, description = "Route name")),
    responses((status = 200, description = "Remaining views", body = ViewsSnapshot))
)]
pub async fn drop_cached_view(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<ViewsSnapshot> {
    let views = &state.console.views;
    views.del_cached(&name);
    Json(views.snapshot())
}

/// clear_views
///
/// Bulk-clears visited views (affix excluded) and cached views.
#[utoipa::path(
    delete,
    path = "/views",
    responses((status = 200, description = "Remaining views", body = ViewsSnapshot))
)]
pub async fn clear_views(State(state): State<AppState>) -> Json<ViewsSnapshot> {
    let views = &state.console.views;
    views.del_all_visited();
    views.del_all_cached();
    Json(views.snapshot())
}

// --- Session Handlers ---

#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Session state", body = SessionInfo))
)]
pub async fn get_session(State(state): State<AppState>) -> Json<SessionInfo> {
    Json(state.console.session_info())
}

/// set_token
///
/// Installs a token obtained elsewhere.
#[utoipa::path(
    post,
    path = "/session/token",
    request_body = SetTokenRequest,
    responses(
        (status = 200, description = "Session authenticated", body = SessionInfo),
        (status = 400, description = "Empty token"),
        (status = 503, description = "Token could not be persisted")
    )
)]
pub async fn set_token(
    State(state): State<AppState>,
    Json(payload): Json<SetTokenRequest>,
) -> Result<Json<SessionInfo>, ConsoleError> {
    state.console.session.set_token(&payload.token)?;
    Ok(Json(state.console.session_info()))
}

/// login
///
/// Exchanges credentials with the backend and installs the returned token.
#[utoipa::path(
    post,
    path = "/session/login",
    request_body = LoginRequestData,
    responses(
        (status = 200, description = "Logged in", body = SessionInfo),
        (status = 502, description = "Backend refused the credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<LoginRequestData>,
) -> Result<Json<SessionInfo>, ConsoleError> {
    let info = state.api.login(&credentials).await?;
    state.console.session.set_token(&info.token_value)?;
    Ok(Json(state.console.session_info()))
}

#[utoipa::path(
    post,
    path = "/session/logout",
    responses((status = 200, description = "Logged out", body = SessionInfo))
)]
pub async fn logout(State(state): State<AppState>) -> Json<SessionInfo> {
    state.console.session.logout();
    Json(state.console.session_info())
}

// --- Listener Handlers (session required) ---

#[utoipa::path(
    get,
    path = "/listeners",
    responses(
        (status = 200, description = "HTTPS listeners", body = [ListenerData]),
        (status = 401, description = "No session, or the backend rejected it")
    )
)]
pub async fn list_listeners(
    _session: ActiveSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<ListenerData>>, ConsoleError> {
    Ok(Json(state.api.list_https_listeners().await?))
}

#[utoipa::path(
    post,
    path = "/listeners",
    request_body = CreateListenerRequest,
    responses((status = 201, description = "Listener created", body = ListenerData))
)]
pub async fn create_listener(
    _session: ActiveSession,
    State(state): State<AppState>,
    Json(payload): Json<CreateListenerRequest>,
) -> Result<(StatusCode, Json<ListenerData>), ConsoleError> {
    let listener = state.api.create_https_listener(&payload).await?;
    Ok((StatusCode::CREATED, Json(listener)))
}

#[utoipa::path(
    delete,
    path = "/listeners/{uuid}",
    params(("uuid" = Uuid, Path, description = "Listener id")),
    responses((status = 204, description = "Listener deleted"))
)]
pub async fn delete_listener(
    _session: ActiveSession,
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> Result<StatusCode, ConsoleError> {
    state.api.delete_https_listener(uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/listeners/{uuid}/status",
    params(("uuid" = Uuid, Path, description = "Listener id")),
    responses((status = 200, description = "Listener toggled", body = ListenerData))
)]
pub async fn change_listener_status(
    _session: ActiveSession,
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> Result<Json<ListenerData>, ConsoleError> {
    Ok(Json(state.api.change_https_listener_status(uuid).await?))
}
